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

//! Arbor-Search: parallel tree-search skeletons
//!
//! The user-facing crate of the arbor workspace. A skeleton is a reusable
//! parallel search strategy: it decides *when* a subtree becomes a stealable
//! task and *which* workpool discipline distributes those tasks, while the
//! client only supplies a [`arbor_core::SearchSpace`].
//!
//! Core flow
//! - Build a [`api::TreeSearch`] around your space.
//! - Pick a [`skeleton::SkeletonKind`] and a [`arbor_core::SearchParams`].
//! - Run `optimise`, `decide` or `enumerate` on a root node.
//!
//! Strategies
//! - `DepthBounded`: spawn everything above a depth threshold.
//! - `StackStealing`: spawn nothing; victims answer steal requests from
//!   their live stacks.
//! - `Budget`: offload the shallowest open frame after a backtrack budget.
//! - `Ordered`: global priority order by sibling index or discrepancy.
//! - `Random`: coin-flip offloading per expansion step.
//! - `Indexed`: tasks carry index paths instead of nodes.

pub mod api;
pub mod context;
pub mod driver;
pub mod monitor;
pub mod result;
pub mod skeleton;
pub mod stack;

pub use api::TreeSearch;
pub use monitor::{NoOpMonitor, SearchMonitor, TracingMonitor};
pub use result::{DecisionOutcome, EnumerationOutcome, SearchOutcome};
pub use skeleton::{PoolKind, SearchMode, SkeletonKind};
