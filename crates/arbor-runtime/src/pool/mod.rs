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

//! # Workpool Policies
//!
//! Each search skeleton plugs in its own stealing discipline. The trait
//! below is the *consumer* side shared by every policy: it is all a
//! scheduler worker needs. The producer side is deliberately not part of
//! the trait — every policy takes different arguments when work is pushed
//! (a depth, a priority, an index path), so skeletons talk to the concrete
//! pool types they instantiated.
//!
//! Tie-break rule across all policies: when several items are equally
//! preferred (same bucket, same priority), the newest-arrived wins.
//!
//! ## Submodules
//!
//! - `deque`: LIFO local queue, steals pop the opposite end.
//! - `depth`: one LIFO bucket per tree depth, shallowest first.
//! - `priority`: a single cluster-global priority queue.
//! - `stack_steal`: steal requests served from a victim's live stack.
//! - `position`: index paths instead of nodes; the indexed subsystem.

pub mod deque;
pub mod depth;
pub mod position;
pub mod priority;
pub mod stack_steal;

pub use deque::DequePool;
pub use depth::DepthPool;
pub use position::{PositionIndex, PositionManager};
pub use priority::PriorityWorkqueue;
pub use stack_steal::{StackStealPool, StealHandle};

use crate::task::WorkItem;

/// The consumer interface of a workpool, shared by all policies.
pub trait Workpool: Send + Sync + 'static {
    /// Policy name for logs.
    fn name(&self) -> &'static str;

    /// Pops work for a local worker, in the policy's local discipline.
    fn get_work(&self) -> Option<WorkItem>;

    /// Pops work for a remote stealer, in the policy's steal discipline.
    /// Returning `None` is not an error; the stealer retries elsewhere.
    fn steal(&self) -> Option<WorkItem>;

    /// Whether any queued work remains. A hint; popping may still fail.
    fn work_remaining(&self) -> bool;
}
