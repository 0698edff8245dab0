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

use crate::pool::Workpool;
use crate::signal::WorkSignal;
use crate::task::WorkItem;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

/// The plain deque workpool: local workers pop LIFO for cache locality,
/// remote stealers pop the opposite (oldest) end, which tends to hand them
/// the largest remaining subtrees.
pub struct DequePool {
    queue: Mutex<VecDeque<WorkItem>>,
    signal: Arc<WorkSignal>,
}

impl DequePool {
    /// Creates an empty pool signalling `signal` on every push.
    pub fn new(signal: Arc<WorkSignal>) -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            signal,
        }
    }

    /// Pushes a task. Newest tasks are popped first locally.
    pub fn push(&self, item: WorkItem) {
        self.queue.lock().push_back(item);
        self.signal.notify_one();
    }
}

impl Workpool for DequePool {
    fn name(&self) -> &'static str {
        "deque"
    }

    fn get_work(&self) -> Option<WorkItem> {
        self.queue.lock().pop_back()
    }

    fn steal(&self) -> Option<WorkItem> {
        self.queue.lock().pop_front()
    }

    fn work_remaining(&self) -> bool {
        !self.queue.lock().is_empty()
    }
}

impl std::fmt::Debug for DequePool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DequePool(len: {})", self.queue.lock().len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::LocalityId;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn tagged(tag: usize, order: &Arc<AtomicUsize>, log: &Arc<Mutex<Vec<usize>>>) -> WorkItem {
        let order = Arc::clone(order);
        let log = Arc::clone(log);
        WorkItem::new(tag, move |_| {
            order.fetch_add(1, Ordering::SeqCst);
            log.lock().push(tag);
        })
    }

    #[test]
    fn test_local_pops_are_lifo() {
        let pool = DequePool::new(Arc::new(WorkSignal::new()));
        let order = Arc::new(AtomicUsize::new(0));
        let log = Arc::new(Mutex::new(Vec::new()));

        for tag in 0..3 {
            pool.push(tagged(tag, &order, &log));
        }

        while let Some(item) = pool.get_work() {
            item.run(LocalityId::new(0));
        }
        assert_eq!(*log.lock(), vec![2, 1, 0]);
    }

    #[test]
    fn test_steals_pop_the_oldest() {
        let pool = DequePool::new(Arc::new(WorkSignal::new()));
        let order = Arc::new(AtomicUsize::new(0));
        let log = Arc::new(Mutex::new(Vec::new()));

        for tag in 0..3 {
            pool.push(tagged(tag, &order, &log));
        }

        pool.steal().unwrap().run(LocalityId::new(1));
        assert_eq!(*log.lock(), vec![0]);
        assert!(pool.work_remaining());
    }

    #[test]
    fn test_push_signals_workers() {
        let signal = Arc::new(WorkSignal::new());
        let pool = DequePool::new(Arc::clone(&signal));
        pool.push(WorkItem::new(0, |_| {}));
        assert!(signal.wait_timeout(std::time::Duration::from_millis(1)));
    }
}
