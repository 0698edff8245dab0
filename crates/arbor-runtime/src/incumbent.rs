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

//! # Global Incumbent (Best Solution Holder)
//!
//! A single concurrent container for the best node discovered anywhere in
//! the cluster. It exposes a fast, lock-free objective via an atomic and
//! stores the actual node behind a `Mutex` as the source of truth.
//!
//! ## Motivation
//!
//! - Fast heuristic checks: a cheap atomic objective short-circuits
//!   attempts to install obviously worse candidates without locking.
//! - Correctness by locking: the authoritative incumbent is protected by a
//!   `Mutex`, ensuring consistent updates even under contention.
//! - Monotonicity: a candidate replaces the current incumbent only when it
//!   is strictly better under the objective ordering; on ties the earlier
//!   arrival wins.
//!
//! One incumbent exists per search call. In a networked deployment it lives
//! on one locality and is reached by RPC; here every locality shares the
//! same handle, which preserves the single-writer discipline.

use arbor_core::objective::ObjectiveOrdering;
use parking_lot::Mutex;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicI64, Ordering};

/// A concurrent holder for the best (incumbent) node found during search.
///
/// Concurrency and memory ordering:
/// - The objective is loaded/stored with `Ordering::Relaxed`. This is
///   sufficient because it serves as a heuristic to short-circuit work;
///   all correctness-sensitive state (the node and its objective) is
///   synchronized via the `Mutex`.
///
/// Sentinel initialization:
/// - The objective starts at `O::worst_raw()`, representing "no incumbent
///   installed yet". Every real objective is strictly better.
#[derive(Debug)]
pub struct GlobalIncumbent<N, O> {
    /// Objective of the incumbent stored as `i64` for atomic access.
    objective: AtomicI64,

    /// The incumbent node plus its objective, the source of truth.
    best: Mutex<Option<(N, i64)>>,

    _ordering: PhantomData<O>,
}

impl<N, O> Default for GlobalIncumbent<N, O>
where
    O: ObjectiveOrdering,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<N, O> GlobalIncumbent<N, O>
where
    O: ObjectiveOrdering,
{
    /// Creates an incumbent with no node installed.
    #[inline]
    pub fn new() -> Self {
        Self {
            objective: AtomicI64::new(O::worst_raw()),
            best: Mutex::new(None),
            _ordering: PhantomData,
        }
    }

    /// The current best objective (raw), or the sentinel when nothing has
    /// been installed yet.
    #[inline]
    pub fn objective_raw(&self) -> i64 {
        self.objective.load(Ordering::Relaxed)
    }

    /// Attempts to install `candidate` as the new incumbent. Returns `true`
    /// if it was installed.
    pub fn try_install(&self, candidate: &N, objective: i64) -> bool
    where
        N: Clone,
    {
        // Cheap pre-check against the atomic hint.
        if !O::better_raw(objective, self.objective_raw()) {
            return false;
        }

        let mut guard = self.best.lock();
        // Another thread may have installed a better node while we were
        // waiting for the lock; compare against the authoritative value.
        if let Some((_, current)) = guard.as_ref() {
            if !O::better_raw(objective, *current) {
                return false;
            }
        }

        *guard = Some((candidate.clone(), objective));
        self.objective.store(objective, Ordering::Relaxed);
        true
    }

    /// Returns a clone of the current incumbent node, if any.
    #[inline]
    pub fn snapshot(&self) -> Option<N>
    where
        N: Clone,
    {
        self.best.lock().as_ref().map(|(node, _)| node.clone())
    }

    /// Returns the current incumbent node with its raw objective.
    #[inline]
    pub fn snapshot_with_objective(&self) -> Option<(N, i64)>
    where
        N: Clone,
    {
        self.best.lock().clone()
    }
}

impl<N, O> std::fmt::Display for GlobalIncumbent<N, O>
where
    O: ObjectiveOrdering,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "GlobalIncumbent({}: {})",
            O::NAME,
            self.objective_raw()
        )
    }
}
