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

//! Arbor-Runtime: the distributed work-stealing runtime
//!
//! Everything below the skeletons and above the user contracts: localities
//! and their worker schedulers, the per-locality registry with its monotone
//! shared bound, the global incumbent, the pluggable workpool policies, and
//! the promise/latch machinery that makes `search` return only once every
//! descendant task has finished.
//!
//! Localities are simulated in-process: each one owns a workpool, a registry
//! and a set of worker threads. A "broadcast" iterates all localities and a
//! "steal RPC" is a call through a shared pool handle, which keeps the full
//! runtime shape of a distributed deployment observable in a single process.
//!
//! Design highlights
//! - Bounds are raw `i64` words updated by compare-and-swap under the
//!   objective ordering, so they are linearizable and never regress.
//! - Policies expose only their consumer side through [`pool::Workpool`];
//!   producers push through the concrete pool types because every policy
//!   takes different producer-side arguments.
//! - Termination detection is a tree of [`latch::CompletionLatch`]es: no
//!   worker thread ever blocks waiting for a child task.

pub mod cluster;
pub mod incumbent;
pub mod latch;
pub mod pool;
pub mod promise;
pub mod registry;
pub mod scheduler;
pub mod signal;
pub mod stats;
pub mod task;

pub use cluster::{ClusterSpec, LocalityId};
pub use incumbent::GlobalIncumbent;
pub use latch::CompletionLatch;
pub use promise::{promise, Promise, SearchFuture};
pub use registry::Registry;
pub use scheduler::Scheduler;
pub use signal::WorkSignal;
pub use stats::{LocalityStatistics, StatisticsSnapshot};
pub use task::WorkItem;
