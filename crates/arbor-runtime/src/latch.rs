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

//! # Termination Detection
//!
//! Every spawned subtree task holds a [`CompletionLatch`]. A task's latch
//! fires only after the task body has finished *and* every child latch it
//! registered has fired, so the root latch firing means the whole task tree
//! is quiescent. The propagation is a non-blocking counter decrement chain:
//! no worker thread ever parks waiting for a child.
//!
//! This replaces the original combination of per-task futures collected by
//! the parent and a scheduler-keepalive semaphore; the count-down tree gives
//! the same "completion promise fires only after all child futures resolve"
//! guarantee without a blocked continuation per task.

use crate::promise::Promise;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// A count-down cell tying a task's completion to its spawned children.
///
/// The pending count is one for the task body plus one per registered
/// child. `complete` decrements; at zero the latch fires its promise (if
/// any) and decrements its parent.
pub struct CompletionLatch {
    parent: Option<Arc<CompletionLatch>>,
    pending: AtomicUsize,
    promise: Mutex<Option<Promise<()>>>,
}

impl CompletionLatch {
    /// Creates a root latch firing `promise` once the whole tree below it
    /// is done. The caller owns one pending slot and must `complete` it
    /// after submitting the root task.
    pub fn root(promise: Promise<()>) -> Arc<Self> {
        Arc::new(Self {
            parent: None,
            pending: AtomicUsize::new(1),
            promise: Mutex::new(Some(promise)),
        })
    }

    /// Registers a child task: bumps this latch's pending count and returns
    /// the child's latch.
    ///
    /// Must be called before the child can possibly complete, i.e. before
    /// the child task is pushed to any workpool.
    pub fn register_child(self: &Arc<Self>) -> Arc<CompletionLatch> {
        self.pending.fetch_add(1, Ordering::Relaxed);
        Arc::new(CompletionLatch {
            parent: Some(Arc::clone(self)),
            pending: AtomicUsize::new(1),
            promise: Mutex::new(None),
        })
    }

    /// Releases one pending slot. Fires upward iteratively so deep task
    /// chains cannot overflow the thread stack.
    pub fn complete(self: &Arc<Self>) {
        let mut current = Arc::clone(self);
        loop {
            if current.pending.fetch_sub(1, Ordering::AcqRel) != 1 {
                return;
            }
            if let Some(promise) = current
                .promise
                .lock()
                .expect("completion latch promise lock poisoned")
                .take()
            {
                promise.set(());
            }
            let parent = match &current.parent {
                Some(parent) => Arc::clone(parent),
                None => return,
            };
            current = parent;
        }
    }

    /// Current pending count. Only meaningful for diagnostics.
    #[inline]
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::Relaxed)
    }
}

impl std::fmt::Debug for CompletionLatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "CompletionLatch(pending: {}, root: {})",
            self.pending(),
            self.parent.is_none()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::promise::promise;
    use std::thread;

    #[test]
    fn test_root_without_children_fires_on_complete() {
        let (p, f) = promise();
        let latch = CompletionLatch::root(p);
        assert!(!f.is_ready());
        latch.complete();
        assert!(f.is_ready());
        f.wait();
    }

    #[test]
    fn test_child_holds_root_open() {
        let (p, f) = promise();
        let root = CompletionLatch::root(p);
        let child = root.register_child();

        root.complete();
        assert!(!f.is_ready(), "root must wait for its child");

        child.complete();
        assert!(f.is_ready());
        f.wait();
    }

    #[test]
    fn test_deep_chain_completes_iteratively() {
        let (p, f) = promise();
        let root = CompletionLatch::root(p);

        let mut latches = vec![Arc::clone(&root)];
        for _ in 0..10_000 {
            let next = latches.last().unwrap().register_child();
            latches.push(next);
        }

        // Finish bodies from the root downward, then the leaf completes the
        // whole chain in one upward sweep.
        for latch in &latches[..latches.len() - 1] {
            latch.complete();
        }
        assert!(!f.is_ready());
        latches.last().unwrap().complete();
        f.wait();
    }

    #[test]
    fn test_concurrent_children() {
        let (p, f) = promise();
        let root = CompletionLatch::root(p);

        let children = (0..32).map(|_| root.register_child()).collect::<Vec<_>>();
        let handles = children
            .into_iter()
            .map(|child| thread::spawn(move || child.complete()))
            .collect::<Vec<_>>();

        root.complete();
        for handle in handles {
            handle.join().unwrap();
        }
        f.wait();
    }

    #[test]
    fn test_grandchildren_propagate() {
        let (p, f) = promise();
        let root = CompletionLatch::root(p);
        let child = root.register_child();
        let grandchild = child.register_child();

        root.complete();
        child.complete();
        assert!(!f.is_ready(), "grandchild still pending");
        grandchild.complete();
        f.wait();
    }
}
