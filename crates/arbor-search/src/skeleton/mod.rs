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

//! # Search Skeletons
//!
//! The strategies themselves. Every skeleton shares the same outline —
//! broadcast registries, initialize its policy on every locality, start the
//! schedulers, submit the root task, await the root's completion — and they
//! differ only in *when* a child becomes a stealable task and *which*
//! workpool it lands in.
//!
//! | Skeleton      | Spawn rule                                        | Policy        |
//! |---------------|---------------------------------------------------|---------------|
//! | DepthBounded  | every child while shallower than `spawn_depth`    | depth or deque|
//! | StackStealing | never; victims answer steal requests              | stack-steal   |
//! | Budget        | shallowest open frame after `backtrack_budget`    | depth         |
//! | Ordered       | like DepthBounded, keyed by index or discrepancy  | priority      |
//! | Random        | shallowest open frame at probability `1/n`        | depth         |
//! | Indexed       | like DepthBounded via index paths                 | position      |

pub mod budget;
pub mod depth_bounded;
pub mod indexed;
pub mod ordered;
pub mod random;
pub mod stack_stealing;

use crate::context::{NodeAction, SearchContext};
use crate::stack::GeneratorStack;
use arbor_core::enumerate::Enumerator;
use arbor_core::error::SearchError;
use arbor_core::objective::{ObjectiveOrdering, ObjectiveValue};
use arbor_core::params::SearchParams;
use arbor_core::space::{NodeGenerator, SearchSpace};
use arbor_runtime::latch::CompletionLatch;
use arbor_runtime::pool::Workpool;
use arbor_runtime::registry::Registry;
use arbor_runtime::signal::WorkSignal;
use std::sync::Arc;

/// What kind of answer the search produces.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchMode {
    /// Fold every visited node into an enumerator.
    Enumeration,
    /// Return the best node under the objective ordering.
    Optimisation,
    /// Return the first node meeting the expected objective.
    Decision,
}

impl std::fmt::Display for SearchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchMode::Enumeration => write!(f, "Enumeration"),
            SearchMode::Optimisation => write!(f, "Optimisation"),
            SearchMode::Decision => write!(f, "Decision"),
        }
    }
}

/// Local pool flavour for the depth-bounded skeleton.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PoolKind {
    /// One bucket per tree depth, shallowest first.
    #[default]
    Depth,
    /// Plain LIFO deque, steals take the oldest end.
    Deque,
}

/// Strategy selector.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkeletonKind {
    DepthBounded { pool: PoolKind },
    StackStealing,
    Budget,
    Ordered,
    Random,
    Indexed,
}

impl Default for SkeletonKind {
    fn default() -> Self {
        SkeletonKind::DepthBounded {
            pool: PoolKind::default(),
        }
    }
}

impl SkeletonKind {
    /// The selector name, as also used on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            SkeletonKind::DepthBounded { .. } => "depthbounded",
            SkeletonKind::StackStealing => "stacksteal",
            SkeletonKind::Budget => "budget",
            SkeletonKind::Ordered => "ordered",
            SkeletonKind::Random => "basicrandom",
            SkeletonKind::Indexed => "indexed",
        }
    }
}

impl std::fmt::Display for SkeletonKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Checks the skeleton/parameter combination before anything is spawned.
pub(crate) fn validate<B>(
    kind: &SkeletonKind,
    params: &SearchParams<B>,
    mode: SearchMode,
) -> Result<(), SearchError>
where
    B: ObjectiveValue,
{
    params.validate()?;

    match kind {
        SkeletonKind::Budget if params.backtrack_budget == 0 => {
            return Err(SearchError::Config(
                "the budget skeleton requires backtrack_budget >= 1".to_string(),
            ));
        }
        SkeletonKind::Random if params.spawn_probability == 0 => {
            return Err(SearchError::Config(
                "the basicrandom skeleton requires spawn_probability >= 1".to_string(),
            ));
        }
        SkeletonKind::Random if params.spawn_probability > u32::MAX as u64 => {
            return Err(SearchError::Config(
                "spawn_probability does not fit a 32-bit denominator".to_string(),
            ));
        }
        _ => {}
    }

    if mode == SearchMode::Decision && params.expected_objective.is_none() {
        return Err(SearchError::Config(
            "decision mode requires expected_objective".to_string(),
        ));
    }

    Ok(())
}

/// A skeleton prepared for launch: its per-locality consumer pools and the
/// closure that submits the root task.
pub(crate) struct SkeletonLaunch {
    pub pools: Vec<Arc<dyn Workpool>>,
    pub submit_root: Box<dyn FnOnce(&Arc<CompletionLatch>) + Send>,
}

/// Instantiates the policy of `kind` on every locality and binds the root
/// submission.
pub(crate) fn launch<S, O, E>(
    kind: SkeletonKind,
    ctx: &SearchContext<S, O, E>,
    signals: &[Arc<WorkSignal>],
) -> SkeletonLaunch
where
    S: SearchSpace,
    O: ObjectiveOrdering,
    E: Enumerator<S::Node>,
{
    match kind {
        SkeletonKind::DepthBounded { pool } => depth_bounded::launch(ctx, signals, pool),
        SkeletonKind::StackStealing => stack_stealing::launch(ctx, signals),
        SkeletonKind::Budget => budget::launch(ctx, signals),
        SkeletonKind::Ordered => ordered::launch(ctx, signals),
        SkeletonKind::Random => random::launch(ctx, signals),
        SkeletonKind::Indexed => indexed::launch(ctx, signals),
    }
}

/// Runs a task body, routing failures into the context, and releases the
/// task's latch no matter what. Every skeleton task goes through here.
pub(crate) fn run_task_body<S, O, E, F>(
    ctx: &SearchContext<S, O, E>,
    latch: &Arc<CompletionLatch>,
    body: F,
) where
    S: SearchSpace,
    O: ObjectiveOrdering,
    E: Enumerator<S::Node>,
    F: FnOnce() -> Result<(), SearchError>,
{
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(body));
    match result {
        Ok(Ok(())) => {}
        Ok(Err(error)) => ctx.record_failure(error),
        Err(payload) => ctx.record_failure(SearchError::Callback(panic_message(payload.as_ref()))),
    }
    latch.complete();
}

pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "task panicked".to_string()
    }
}

/// Continue or abandon the current task after an offload pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum OffloadFlow {
    Continue,
    Exit,
}

/// Turns the remaining siblings of the shallowest open frame into tasks.
///
/// This is the common offloading move of the budget, random and
/// stack-stealing skeletons: the shallowest frame roots the largest
/// remaining subtrees, so that is where work is split off. `single` spawns
/// only the first surviving sibling (a plain frame steal); otherwise the
/// whole remainder of the frame goes (chunked stealing).
///
/// Each sibling passes the usual node processing before it is handed to
/// `spawn`, so bound pruning applies before enqueuing.
pub(crate) fn offload_shallowest<S, O, E, F>(
    ctx: &SearchContext<S, O, E>,
    registry: &Registry<S, O, E>,
    stack: &mut GeneratorStack<S>,
    task_depth: usize,
    single: bool,
    mut spawn: F,
) -> OffloadFlow
where
    S: SearchSpace,
    O: ObjectiveOrdering,
    E: Enumerator<S::Node>,
    F: FnMut(S::Node, usize),
{
    let Some(index) = stack.shallowest_open() else {
        return OffloadFlow::Continue;
    };
    let space = registry.space();
    let frame_depth = task_depth + index;
    let frame = stack.frame_mut(index);

    while frame.is_open() {
        frame.seen += 1;
        let child = frame.generator.next_child(space, &frame.node);
        match ctx.process_node(registry, &child) {
            NodeAction::Exit => return OffloadFlow::Exit,
            NodeAction::Prune => continue,
            NodeAction::PruneSiblings => {
                frame.close();
                break;
            }
            NodeAction::Descend => {
                spawn(child, frame_depth + 1);
                if single {
                    break;
                }
            }
        }
    }
    OffloadFlow::Continue
}
