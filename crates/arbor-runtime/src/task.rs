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

use crate::cluster::LocalityId;

/// A queued unit of work: a subtree task bound to whatever locality pops
/// it. Once popped from a pool it executes at most once.
pub struct WorkItem {
    depth: usize,
    run: Box<dyn FnOnce(LocalityId) + Send + 'static>,
}

impl WorkItem {
    /// Wraps a task body. `depth` is the tree depth of the task's root and
    /// is what depth-indexed pools bucket by.
    #[inline]
    pub fn new<F>(depth: usize, run: F) -> Self
    where
        F: FnOnce(LocalityId) + Send + 'static,
    {
        Self {
            depth,
            run: Box::new(run),
        }
    }

    /// Tree depth of the task's root node.
    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Executes the task on the given locality. Consumes the item.
    #[inline]
    pub fn run(self, locality: LocalityId) {
        (self.run)(locality)
    }
}

impl std::fmt::Debug for WorkItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "WorkItem(depth: {})", self.depth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_run_executes_once_with_locality() {
        let hits = Arc::new(AtomicUsize::new(0));
        let hits_in_task = Arc::clone(&hits);
        let item = WorkItem::new(3, move |locality| {
            assert_eq!(locality.get(), 1);
            hits_in_task.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(item.depth(), 3);
        item.run(LocalityId::new(1));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
