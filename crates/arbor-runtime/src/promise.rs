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

//! # Promise / Future
//!
//! The single-assignment completion cell the runtime uses where a
//! distributed substrate would offer remote promises: a [`Promise`] is
//! written exactly once, a [`SearchFuture`] blocks until that write. Only
//! the coordinating thread ever blocks on one; worker threads are wired up
//! through [`crate::latch::CompletionLatch`] instead.

use parking_lot::{Condvar, Mutex};
use std::sync::Arc;

struct Shared<T> {
    value: Mutex<Option<T>>,
    ready: Condvar,
}

/// The write end of a completion cell. Set at most once.
pub struct Promise<T> {
    shared: Arc<Shared<T>>,
}

/// The read end of a completion cell.
pub struct SearchFuture<T> {
    shared: Arc<Shared<T>>,
}

/// Creates a connected promise/future pair.
pub fn promise<T>() -> (Promise<T>, SearchFuture<T>) {
    let shared = Arc::new(Shared {
        value: Mutex::new(None),
        ready: Condvar::new(),
    });
    (
        Promise {
            shared: Arc::clone(&shared),
        },
        SearchFuture { shared },
    )
}

impl<T> Promise<T> {
    /// Completes the cell. Consumes the promise; a second completion is
    /// impossible by construction.
    pub fn set(self, value: T) {
        let mut guard = self.shared.value.lock();
        debug_assert!(guard.is_none(), "promise completed twice");
        *guard = Some(value);
        self.shared.ready.notify_all();
    }
}

impl<T> SearchFuture<T> {
    /// Blocks until the promise is completed and returns the value.
    ///
    /// # Note
    ///
    /// Dropping the promise without completing it would block forever; the
    /// runtime guarantees every promise is completed, including on failure
    /// paths.
    pub fn wait(self) -> T {
        let mut guard = self.shared.value.lock();
        loop {
            if let Some(value) = guard.take() {
                return value;
            }
            self.shared.ready.wait(&mut guard);
        }
    }

    /// Returns `true` if the promise has been completed.
    #[inline]
    pub fn is_ready(&self) -> bool {
        self.shared.value.lock().is_some()
    }
}

impl<T> std::fmt::Debug for Promise<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Promise(set: {})", self.shared.value.lock().is_some())
    }
}

impl<T> std::fmt::Debug for SearchFuture<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SearchFuture(ready: {})", self.is_ready())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_set_before_wait() {
        let (p, f) = promise();
        p.set(7);
        assert!(f.is_ready());
        assert_eq!(f.wait(), 7);
    }

    #[test]
    fn test_wait_blocks_until_set() {
        let (p, f) = promise();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            p.set("done");
        });
        assert_eq!(f.wait(), "done");
        handle.join().unwrap();
    }

    #[test]
    fn test_many_waiters_one_value() {
        // Several threads racing on is_ready while one waits for the value.
        let (p, f) = promise();
        let watcher = thread::spawn(move || f.wait());
        thread::sleep(Duration::from_millis(5));
        p.set(42u64);
        assert_eq!(watcher.join().unwrap(), 42);
    }
}
