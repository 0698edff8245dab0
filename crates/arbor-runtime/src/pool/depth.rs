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

//! # Depth-Indexed Workpool
//!
//! One LIFO stack per tree depth. Both local pops and steals serve the
//! shallowest non-empty bucket: shallow tasks root the largest subtrees,
//! so remote stealers get coarse work and local workers also prefer large
//! remaining work, which balances load better than plain LIFO.

use crate::pool::Workpool;
use crate::signal::WorkSignal;
use crate::task::WorkItem;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

/// A workpool bucketed by tree depth, shallowest-first.
pub struct DepthPool {
    buckets: Mutex<Vec<VecDeque<WorkItem>>>,
    signal: Arc<WorkSignal>,
}

impl DepthPool {
    /// Creates an empty pool signalling `signal` on every push.
    pub fn new(signal: Arc<WorkSignal>) -> Self {
        Self {
            buckets: Mutex::new(Vec::new()),
            signal,
        }
    }

    /// Pushes a task into the bucket of its depth.
    pub fn push(&self, item: WorkItem) {
        let depth = item.depth();
        let mut buckets = self.buckets.lock();
        if buckets.len() <= depth {
            buckets.resize_with(depth + 1, VecDeque::new);
        }
        buckets[depth].push_back(item);
        drop(buckets);
        self.signal.notify_one();
    }

    fn pop_shallowest(&self) -> Option<WorkItem> {
        let mut buckets = self.buckets.lock();
        for bucket in buckets.iter_mut() {
            // LIFO within the bucket: newest-arrived wins ties.
            if let Some(item) = bucket.pop_back() {
                return Some(item);
            }
        }
        None
    }
}

impl Workpool for DepthPool {
    fn name(&self) -> &'static str {
        "depth-pool"
    }

    fn get_work(&self) -> Option<WorkItem> {
        self.pop_shallowest()
    }

    fn steal(&self) -> Option<WorkItem> {
        self.pop_shallowest()
    }

    fn work_remaining(&self) -> bool {
        self.buckets.lock().iter().any(|b| !b.is_empty())
    }
}

impl std::fmt::Debug for DepthPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let buckets = self.buckets.lock();
        let total: usize = buckets.iter().map(|b| b.len()).sum();
        write!(
            f,
            "DepthPool(depths: {}, queued: {})",
            buckets.len(),
            total
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::LocalityId;

    fn tagged(depth: usize, tag: usize, log: &Arc<Mutex<Vec<usize>>>) -> WorkItem {
        let log = Arc::clone(log);
        WorkItem::new(depth, move |_| log.lock().push(tag))
    }

    #[test]
    fn test_shallowest_bucket_first() {
        let pool = DepthPool::new(Arc::new(WorkSignal::new()));
        let log = Arc::new(Mutex::new(Vec::new()));

        pool.push(tagged(3, 30, &log));
        pool.push(tagged(1, 10, &log));
        pool.push(tagged(2, 20, &log));

        while let Some(item) = pool.get_work() {
            item.run(LocalityId::new(0));
        }
        assert_eq!(*log.lock(), vec![10, 20, 30]);
    }

    #[test]
    fn test_lifo_within_a_bucket() {
        let pool = DepthPool::new(Arc::new(WorkSignal::new()));
        let log = Arc::new(Mutex::new(Vec::new()));

        pool.push(tagged(1, 1, &log));
        pool.push(tagged(1, 2, &log));
        pool.push(tagged(1, 3, &log));

        while let Some(item) = pool.steal() {
            item.run(LocalityId::new(0));
        }
        assert_eq!(*log.lock(), vec![3, 2, 1]);
    }

    #[test]
    fn test_work_remaining() {
        let pool = DepthPool::new(Arc::new(WorkSignal::new()));
        assert!(!pool.work_remaining());
        pool.push(WorkItem::new(5, |_| {}));
        assert!(pool.work_remaining());
        pool.get_work().unwrap();
        assert!(!pool.work_remaining());
    }
}
