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

//! # Stack-Stealing Pool
//!
//! The stack-stealing skeleton never spawns proactively. Instead, every
//! running task registers a [`StealHandle`] here; an idle worker's poll
//! posts a steal request against one of the live handles, and the victim —
//! which checks its handle at every expansion step — answers by packaging
//! the remaining siblings of its shallowest open frame as real tasks and
//! publishing them to this pool. Generators stay owned by exactly one task;
//! only materialized nodes ever cross threads.
//!
//! A request that finds no live stacks, or a victim whose stack is already
//! exhausted, simply produces nothing; the stealer retries elsewhere.

use crate::pool::Workpool;
use crate::signal::WorkSignal;
use crate::task::WorkItem;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// The steal-request slot of one running task.
#[derive(Debug, Default)]
pub struct StealHandle {
    requested: AtomicBool,
}

impl StealHandle {
    /// Marks this stack as a steal target.
    #[inline]
    pub fn request(&self) {
        self.requested.store(true, Ordering::Release);
    }

    /// Consumes a pending request, if any. Called by the owning task at
    /// every expansion step.
    #[inline]
    pub fn take_request(&self) -> bool {
        self.requested.swap(false, Ordering::AcqRel)
    }
}

/// Per-locality pool backing the stack-stealing skeleton.
pub struct StackStealPool {
    queue: Mutex<VecDeque<WorkItem>>,
    handles: Mutex<Vec<Arc<StealHandle>>>,
    cursor: AtomicUsize,
    signal: Arc<WorkSignal>,
}

impl StackStealPool {
    /// Creates an empty pool signalling `signal` on every publish.
    pub fn new(signal: Arc<WorkSignal>) -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            handles: Mutex::new(Vec::new()),
            cursor: AtomicUsize::new(0),
            signal,
        }
    }

    /// Publishes work split off a victim's stack.
    pub fn push(&self, item: WorkItem) {
        self.queue.lock().push_back(item);
        self.signal.notify_one();
    }

    /// Registers a task's live stack as a steal target.
    pub fn register(&self) -> Arc<StealHandle> {
        let handle = Arc::new(StealHandle::default());
        self.handles.lock().push(Arc::clone(&handle));
        handle
    }

    /// Removes a finished task's handle. Pending requests on it are simply
    /// lost, which stealers treat as an empty victim.
    pub fn deregister(&self, handle: &Arc<StealHandle>) {
        self.handles.lock().retain(|h| !Arc::ptr_eq(h, handle));
    }

    /// Posts a steal request against one live stack, round-robin.
    fn request_from_live_stack(&self) {
        let handles = self.handles.lock();
        if handles.is_empty() {
            return;
        }
        let index = self.cursor.fetch_add(1, Ordering::Relaxed) % handles.len();
        handles[index].request();
    }

    /// Number of currently registered live stacks.
    pub fn live_stacks(&self) -> usize {
        self.handles.lock().len()
    }
}

impl Workpool for StackStealPool {
    fn name(&self) -> &'static str {
        "stack-steal"
    }

    fn get_work(&self) -> Option<WorkItem> {
        if let Some(item) = self.queue.lock().pop_back() {
            return Some(item);
        }
        self.request_from_live_stack();
        None
    }

    fn steal(&self) -> Option<WorkItem> {
        if let Some(item) = self.queue.lock().pop_front() {
            return Some(item);
        }
        self.request_from_live_stack();
        None
    }

    fn work_remaining(&self) -> bool {
        !self.queue.lock().is_empty() || !self.handles.lock().is_empty()
    }
}

impl std::fmt::Debug for StackStealPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "StackStealPool(queued: {}, live_stacks: {})",
            self.queue.lock().len(),
            self.live_stacks()
        )
    }
}
