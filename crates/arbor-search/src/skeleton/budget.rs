// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! # Budget Skeleton
//!
//! Work is offloaded reactively: a task counts its backtracks, and once the
//! count reaches `backtrack_budget` it spawns every remaining sibling of
//! its shallowest open frame and resets the counter. A subtree that prunes
//! well never pays the spawning overhead; one that backtracks a lot sheds
//! its coarsest work. Unspent budget carries across prune-level events
//! since those are not backtracks.

use crate::context::{NodeAction, SearchContext};
use crate::skeleton::{offload_shallowest, run_task_body, OffloadFlow, SearchMode, SkeletonLaunch};
use crate::stack::GeneratorStack;
use arbor_core::enumerate::Enumerator;
use arbor_core::error::SearchError;
use arbor_core::objective::ObjectiveOrdering;
use arbor_core::space::{NodeGenerator, SearchSpace};
use arbor_runtime::cluster::LocalityId;
use arbor_runtime::latch::CompletionLatch;
use arbor_runtime::pool::{DepthPool, Workpool};
use arbor_runtime::signal::WorkSignal;
use arbor_runtime::task::WorkItem;
use std::sync::Arc;

struct Spawner<S, O, E>
where
    S: SearchSpace,
    O: ObjectiveOrdering,
    E: Enumerator<S::Node>,
{
    ctx: SearchContext<S, O, E>,
    pools: Vec<Arc<DepthPool>>,
}

pub(crate) fn launch<S, O, E>(
    ctx: &SearchContext<S, O, E>,
    signals: &[Arc<WorkSignal>],
) -> SkeletonLaunch
where
    S: SearchSpace,
    O: ObjectiveOrdering,
    E: Enumerator<S::Node>,
{
    let pools: Vec<Arc<DepthPool>> = signals
        .iter()
        .map(|signal| Arc::new(DepthPool::new(Arc::clone(signal))))
        .collect();
    let workpools = pools
        .iter()
        .map(|pool| Arc::clone(pool) as Arc<dyn Workpool>)
        .collect();

    let spawner = Arc::new(Spawner {
        ctx: ctx.clone(),
        pools,
    });
    let root = ctx.registry(LocalityId::new(0)).root().clone();

    SkeletonLaunch {
        pools: workpools,
        submit_root: Box::new(move |latch| {
            spawner.create_task(LocalityId::new(0), root, 0, latch);
        }),
    }
}

impl<S, O, E> Spawner<S, O, E>
where
    S: SearchSpace,
    O: ObjectiveOrdering,
    E: Enumerator<S::Node>,
{
    fn create_task(
        self: &Arc<Self>,
        locality: LocalityId,
        node: S::Node,
        task_depth: usize,
        parent: &Arc<CompletionLatch>,
    ) {
        let latch = parent.register_child();
        let spawner = Arc::clone(self);
        let item = WorkItem::new(task_depth, move |run_on| {
            let body_latch = Arc::clone(&latch);
            run_task_body(&spawner.ctx, &latch, || {
                spawner.expand(run_on, node, task_depth, &body_latch)
            });
        });

        self.ctx.registry(locality).stats().on_spawn();
        self.ctx.monitor.on_spawn(task_depth);
        self.pools[locality.get()].push(item);
    }

    fn expand(
        self: &Arc<Self>,
        locality: LocalityId,
        task_root: S::Node,
        task_depth: usize,
        latch: &Arc<CompletionLatch>,
    ) -> Result<(), SearchError> {
        let registry = self.ctx.registry(locality);
        let space = registry.space();
        let params = registry.params();
        let budget = params.backtrack_budget;
        let max_depth = params.max_depth;

        let mut acc = E::default();
        if self.ctx.mode == SearchMode::Enumeration {
            acc.accumulate(&task_root);
        }
        registry.stats().on_node_explored();

        if max_depth == Some(task_depth) {
            registry.accumulate(acc);
            return Ok(());
        }

        let mut stack = GeneratorStack::new(params.max_stack_depth);
        stack.push(space, task_root)?;
        let mut depth = task_depth;
        let mut backtracks_spent = 0u64;

        loop {
            if registry.is_stopped() {
                break;
            }

            let child = {
                let top = match stack.top_mut() {
                    Some(top) => top,
                    None => break,
                };
                if top.is_open() {
                    top.seen += 1;
                    Some(top.generator.next_child(space, &top.node))
                } else {
                    None
                }
            };

            let child = match child {
                Some(child) => child,
                None => {
                    stack.pop();
                    registry.stats().on_backtrack();
                    if stack.is_empty() {
                        break;
                    }
                    depth -= 1;

                    backtracks_spent += 1;
                    if backtracks_spent >= budget {
                        backtracks_spent = 0;
                        let spawner = Arc::clone(self);
                        let flow = offload_shallowest(
                            &self.ctx,
                            registry,
                            &mut stack,
                            task_depth,
                            false,
                            |node, child_depth| {
                                spawner.create_task(locality, node, child_depth, latch);
                            },
                        );
                        if flow == OffloadFlow::Exit {
                            break;
                        }
                    }
                    continue;
                }
            };

            let child_depth = depth + 1;
            match self.ctx.process_node(registry, &child) {
                NodeAction::Exit => break,
                NodeAction::Prune => {}
                NodeAction::PruneSiblings => {
                    if let Some(top) = stack.top_mut() {
                        top.close();
                    }
                }
                NodeAction::Descend => {
                    if self.ctx.mode == SearchMode::Enumeration {
                        acc.accumulate(&child);
                    }
                    registry.stats().on_node_explored();
                    if max_depth != Some(child_depth) {
                        stack.push(space, child)?;
                        depth = child_depth;
                    }
                }
            }
        }

        registry.accumulate(acc);
        Ok(())
    }
}
