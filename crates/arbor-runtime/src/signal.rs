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

//! A counting semaphore hinting workers at available tasks.
//!
//! Producers signal once per pushed work item; idle workers consume a
//! permit or sleep briefly. Permits are hints, not ownership of an item:
//! the pools remain the source of truth, so a spurious wakeup only costs
//! one extra poll.

use parking_lot::{Condvar, Mutex};
use std::time::Duration;

/// Per-locality work-availability semaphore.
pub struct WorkSignal {
    permits: Mutex<usize>,
    available: Condvar,
}

impl Default for WorkSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkSignal {
    /// Creates a signal with no permits.
    #[inline]
    pub fn new() -> Self {
        Self {
            permits: Mutex::new(0),
            available: Condvar::new(),
        }
    }

    /// Adds one permit and wakes one sleeping worker.
    #[inline]
    pub fn notify_one(&self) {
        let mut permits = self.permits.lock();
        *permits = permits.saturating_add(1);
        drop(permits);
        self.available.notify_one();
    }

    /// Wakes every sleeping worker without adding permits. Used on
    /// scheduler shutdown.
    #[inline]
    pub fn wake_all(&self) {
        self.available.notify_all();
    }

    /// Consumes a permit, waiting up to `timeout` for one to appear.
    /// Returns `true` if a permit was consumed.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let mut permits = self.permits.lock();
        if *permits > 0 {
            *permits -= 1;
            return true;
        }
        let _ = self.available.wait_for(&mut permits, timeout);
        if *permits > 0 {
            *permits -= 1;
            true
        } else {
            false
        }
    }
}

impl std::fmt::Debug for WorkSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "WorkSignal(permits: {})", *self.permits.lock())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_permit_consumed_without_waiting() {
        let signal = WorkSignal::new();
        signal.notify_one();
        assert!(signal.wait_timeout(Duration::from_millis(1)));
        assert!(!signal.wait_timeout(Duration::from_millis(1)));
    }

    #[test]
    fn test_wait_wakes_on_notify() {
        let signal = Arc::new(WorkSignal::new());
        let waiter = {
            let signal = Arc::clone(&signal);
            thread::spawn(move || signal.wait_timeout(Duration::from_secs(5)))
        };
        thread::sleep(Duration::from_millis(10));
        signal.notify_one();
        assert!(waiter.join().unwrap());
    }

    #[test]
    fn test_wake_all_does_not_grant_permits() {
        let signal = WorkSignal::new();
        signal.wake_all();
        assert!(!signal.wait_timeout(Duration::from_millis(1)));
    }
}
