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

//! # Ordered Skeleton
//!
//! Depth-bounded spawning into one cluster-global priority queue, so task
//! execution order approximates the heuristic order the client emits
//! children in. Priorities are sibling indexes, or with
//! `discrepancy_order` the accumulated count of non-greedy choices on the
//! task's path — limited-discrepancy search, where the pure greedy dive
//! (discrepancy 0) runs before anything that deviated once.

use crate::context::{NodeAction, SearchContext};
use crate::skeleton::{run_task_body, SearchMode, SkeletonLaunch};
use crate::stack::GeneratorStack;
use arbor_core::enumerate::Enumerator;
use arbor_core::error::SearchError;
use arbor_core::objective::ObjectiveOrdering;
use arbor_core::space::{NodeGenerator, SearchSpace};
use arbor_runtime::cluster::LocalityId;
use arbor_runtime::latch::CompletionLatch;
use arbor_runtime::pool::{PriorityWorkqueue, Workpool};
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
    queue: Arc<PriorityWorkqueue>,
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
    // One global queue; every locality's "pool" is the same handle.
    let queue = Arc::new(PriorityWorkqueue::new(signals.to_vec()));
    let workpools = signals
        .iter()
        .map(|_| Arc::clone(&queue) as Arc<dyn Workpool>)
        .collect();

    let spawner = Arc::new(Spawner {
        ctx: ctx.clone(),
        queue,
    });
    let root = ctx.registry(LocalityId::new(0)).root().clone();

    SkeletonLaunch {
        pools: workpools,
        submit_root: Box::new(move |latch| {
            spawner.create_task(LocalityId::new(0), root, 0, 0, latch);
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
        priority: i64,
        parent: &Arc<CompletionLatch>,
    ) {
        let latch = parent.register_child();
        let spawner = Arc::clone(self);
        let item = WorkItem::new(task_depth, move |run_on| {
            let body_latch = Arc::clone(&latch);
            run_task_body(&spawner.ctx, &latch, || {
                spawner.expand(run_on, node, task_depth, priority, &body_latch)
            });
        });

        self.ctx.registry(locality).stats().on_spawn();
        self.ctx.monitor.on_spawn(task_depth);
        self.queue.push(priority, item);
    }

    fn expand(
        self: &Arc<Self>,
        locality: LocalityId,
        task_root: S::Node,
        task_depth: usize,
        task_priority: i64,
        latch: &Arc<CompletionLatch>,
    ) -> Result<(), SearchError> {
        let registry = self.ctx.registry(locality);
        let space = registry.space();
        let params = registry.params();
        let spawn_depth = params.spawn_depth;
        let discrepancy_order = params.discrepancy_order;
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

        loop {
            if registry.is_stopped() {
                break;
            }

            let (child, child_index) = {
                let top = match stack.top_mut() {
                    Some(top) => top,
                    None => break,
                };
                if top.is_open() {
                    let index = top.seen;
                    top.seen += 1;
                    (Some(top.generator.next_child(space, &top.node)), index)
                } else {
                    (None, 0)
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
                    if depth < spawn_depth {
                        let priority = if discrepancy_order {
                            // A non-first child is one discrepancy against
                            // the heuristic order.
                            task_priority + i64::from(child_index > 0)
                        } else {
                            child_index as i64
                        };
                        self.create_task(locality, child, child_depth, priority, latch);
                    } else {
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
        }

        registry.accumulate(acc);
        Ok(())
    }
}
