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

//! # Priority-Ordered Workqueue
//!
//! The one cluster-global policy: a single priority queue every locality
//! produces into and consumes from. The ordered skeleton keys it by sibling
//! index or accumulated discrepancy, so the smallest key — the greediest
//! prefix — runs first. Ties go to the newest arrival.

use crate::pool::Workpool;
use crate::signal::WorkSignal;
use crate::task::WorkItem;
use parking_lot::Mutex;
use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

struct PrioritisedEntry {
    priority: i64,
    seq: u64,
    item: WorkItem,
}

impl PartialEq for PrioritisedEntry {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.seq == other.seq
    }
}

impl Eq for PrioritisedEntry {}

impl PartialOrd for PrioritisedEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PrioritisedEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Max-heap: "greater" means preferred. Smaller priority first,
        // newer sequence number on ties.
        other
            .priority
            .cmp(&self.priority)
            .then(self.seq.cmp(&other.seq))
    }
}

/// A cluster-global priority workqueue.
///
/// All localities share one instance; a steal and a local pop are the same
/// operation, which is exactly the original policy's behavior of forwarding
/// every request to the global queue.
pub struct PriorityWorkqueue {
    heap: Mutex<BinaryHeap<PrioritisedEntry>>,
    seq: AtomicU64,
    signals: Vec<Arc<WorkSignal>>,
}

impl PriorityWorkqueue {
    /// Creates the queue. `signals` are the per-locality work signals, all
    /// of which are notified on every push since any locality may consume.
    pub fn new(signals: Vec<Arc<WorkSignal>>) -> Self {
        Self {
            heap: Mutex::new(BinaryHeap::new()),
            seq: AtomicU64::new(0),
            signals,
        }
    }

    /// Pushes a task with the given priority (smaller runs earlier).
    pub fn push(&self, priority: i64, item: WorkItem) {
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        self.heap.lock().push(PrioritisedEntry {
            priority,
            seq,
            item,
        });
        for signal in &self.signals {
            signal.notify_one();
        }
    }

    fn pop(&self) -> Option<WorkItem> {
        self.heap.lock().pop().map(|entry| entry.item)
    }
}

impl Workpool for PriorityWorkqueue {
    fn name(&self) -> &'static str {
        "priority-ordered"
    }

    fn get_work(&self) -> Option<WorkItem> {
        self.pop()
    }

    fn steal(&self) -> Option<WorkItem> {
        self.pop()
    }

    fn work_remaining(&self) -> bool {
        !self.heap.lock().is_empty()
    }
}

impl std::fmt::Debug for PriorityWorkqueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PriorityWorkqueue(len: {})", self.heap.lock().len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::LocalityId;

    fn tagged(tag: usize, log: &Arc<Mutex<Vec<usize>>>) -> WorkItem {
        let log = Arc::clone(log);
        WorkItem::new(0, move |_| log.lock().push(tag))
    }

    #[test]
    fn test_smallest_priority_first() {
        let queue = PriorityWorkqueue::new(vec![Arc::new(WorkSignal::new())]);
        let log = Arc::new(Mutex::new(Vec::new()));

        queue.push(5, tagged(50, &log));
        queue.push(1, tagged(10, &log));
        queue.push(3, tagged(30, &log));

        while let Some(item) = queue.get_work() {
            item.run(LocalityId::new(0));
        }
        assert_eq!(*log.lock(), vec![10, 30, 50]);
    }

    #[test]
    fn test_ties_serve_newest_first() {
        let queue = PriorityWorkqueue::new(Vec::new());
        let log = Arc::new(Mutex::new(Vec::new()));

        queue.push(2, tagged(1, &log));
        queue.push(2, tagged(2, &log));
        queue.push(2, tagged(3, &log));

        while let Some(item) = queue.steal() {
            item.run(LocalityId::new(0));
        }
        assert_eq!(*log.lock(), vec![3, 2, 1]);
    }

    #[test]
    fn test_push_notifies_every_locality() {
        let signals = vec![Arc::new(WorkSignal::new()), Arc::new(WorkSignal::new())];
        let queue = PriorityWorkqueue::new(signals.clone());
        queue.push(0, WorkItem::new(0, |_| {}));
        for signal in &signals {
            assert!(signal.wait_timeout(std::time::Duration::from_millis(1)));
        }
    }
}
