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

//! # Indexed Skeleton
//!
//! Tasks carry a path of child indexes instead of a node. A thief claims an
//! index range from a victim's live [`PositionIndex`] through the locality's
//! position manager and reconstructs its starting node by replaying the path
//! with `nth_child`. Attractive when nodes are big and paths are not: the
//! only state that ever crosses localities is a handful of integers.
//!
//! Expansion is recursive, bracketing each descent with `pre_expand` /
//! `post_expand` so the manager always knows which indexes are taken.

use crate::context::{NodeAction, SearchContext};
use crate::skeleton::{panic_message, SearchMode, SkeletonLaunch};
use arbor_core::enumerate::Enumerator;
use arbor_core::error::SearchError;
use arbor_core::objective::ObjectiveOrdering;
use arbor_core::space::{NodeGenerator, SearchSpace};
use arbor_runtime::cluster::LocalityId;
use arbor_runtime::pool::position::{IndexPath, PositionIndex, PositionManager};
use arbor_runtime::pool::Workpool;
use arbor_runtime::registry::Registry;
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
    let spawner = Arc::new(Spawner { ctx: ctx.clone() });

    let managers: Vec<Arc<PositionManager>> = signals
        .iter()
        .map(|signal| {
            let spawner = Arc::clone(&spawner);
            PositionManager::new(
                Arc::clone(signal),
                Box::new(move |position, _latch| {
                    // The manager completes the latch once the task (and its
                    // bookkeeping) is done; the body only runs the search.
                    let spawner = Arc::clone(&spawner);
                    WorkItem::new(position.root_path().len(), move |run_on| {
                        spawner.position_task(run_on, &position);
                    })
                }),
            )
        })
        .collect();

    let workpools = managers
        .iter()
        .map(|manager| Arc::clone(manager) as Arc<dyn Workpool>)
        .collect();

    let root_manager = Arc::clone(&managers[0]);
    SkeletonLaunch {
        pools: workpools,
        submit_root: Box::new(move |latch| {
            root_manager.add_path(IndexPath::new(), latch.register_child());
        }),
    }
}

impl<S, O, E> Spawner<S, O, E>
where
    S: SearchSpace,
    O: ObjectiveOrdering,
    E: Enumerator<S::Node>,
{
    /// Task body: reconstruct the starting node, expand, report failures.
    /// Latch completion is owned by the position manager.
    fn position_task(&self, locality: LocalityId, position: &Arc<PositionIndex>) {
        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            self.run_position(locality, position)
        }));
        match outcome {
            Ok(Ok(())) => {}
            Ok(Err(error)) => self.ctx.record_failure(error),
            Err(payload) => self
                .ctx
                .record_failure(SearchError::Callback(panic_message(payload.as_ref()))),
        }
    }

    fn run_position(
        &self,
        locality: LocalityId,
        position: &Arc<PositionIndex>,
    ) -> Result<(), SearchError> {
        let registry = self.ctx.registry(locality);
        if registry.is_stopped() {
            return Ok(());
        }

        let path = position.root_path();
        let task_depth = path.len();
        let root = starting_node(registry, &path);

        let mut acc = E::default();
        let result = self.expand_node(locality, position, root, task_depth, 0, &mut acc);
        registry.accumulate(acc);
        result
    }

    fn expand_node(
        &self,
        locality: LocalityId,
        position: &Arc<PositionIndex>,
        node: S::Node,
        depth: usize,
        frames: usize,
        acc: &mut E,
    ) -> Result<(), SearchError> {
        let registry = self.ctx.registry(locality);
        let params = registry.params();

        if frames >= params.max_stack_depth {
            return Err(SearchError::StackOverflow {
                depth: frames + 1,
                limit: params.max_stack_depth,
            });
        }

        if self.ctx.mode == SearchMode::Enumeration {
            acc.accumulate(&node);
        }
        registry.stats().on_node_explored();

        // A node at the depth limit is counted, not expanded. The empty
        // level keeps enter/post_expand balanced for the caller.
        if params.max_depth == Some(depth) {
            position.enter(0);
            return Ok(());
        }

        let space = registry.space();
        let mut generator = space.generator(&node);
        position.enter(generator.num_children());

        let mut produced = 0usize;
        while let Some(next_index) = position.next_position() {
            if registry.is_stopped() {
                return Ok(());
            }

            // Advance the generator to the owned index, skipping anything
            // the manager handed to thieves.
            let mut child = None;
            while produced <= next_index {
                child = Some(generator.next_child(space, &node));
                produced += 1;
            }
            let child = match child {
                Some(child) => child,
                None => continue,
            };

            match self.ctx.process_node(registry, &child) {
                NodeAction::Exit => return Ok(()),
                NodeAction::Prune => continue,
                NodeAction::PruneSiblings => {
                    position.prune_level();
                    break;
                }
                NodeAction::Descend => {
                    position.pre_expand(next_index as u32);
                    let result =
                        self.expand_node(locality, position, child, depth + 1, frames + 1, acc);
                    position.post_expand();
                    result?;
                }
            }
        }

        Ok(())
    }
}

/// Replays `path` from the registry's root through `nth_child`.
fn starting_node<S, O, E>(registry: &Registry<S, O, E>, path: &IndexPath) -> S::Node
where
    S: SearchSpace,
    O: ObjectiveOrdering,
    E: Enumerator<S::Node>,
{
    let space = registry.space();
    let mut node = registry.root().clone();
    for &index in path.iter() {
        let mut generator = space.generator(&node);
        node = generator.nth_child(space, &node, index as usize);
    }
    node
}
