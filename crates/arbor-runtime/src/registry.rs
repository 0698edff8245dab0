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

//! # Per-Locality Registry
//!
//! Shared state of one locality for the duration of one search: the space
//! reference, root, parameters, the monotone local bound, the incumbent
//! handle, the stop flag, the locality's enumeration accumulator and its
//! telemetry counters.
//!
//! A registry is a fresh instance per `search` call, created for every
//! locality by the driver's initialization broadcast; nothing is a process
//! global, and tasks reach their registry through the context they capture.
//!
//! Invariant: the local bound never regresses under the objective ordering.
//! Concurrent updates race through a compare-and-swap loop that only ever
//! installs strictly better values, so observations at increasing times are
//! monotone regardless of broadcast reordering.

use crate::cluster::LocalityId;
use crate::incumbent::GlobalIncumbent;
use crate::stats::LocalityStatistics;
use arbor_core::enumerate::Enumerator;
use arbor_core::objective::ObjectiveOrdering;
use arbor_core::params::SearchParams;
use arbor_core::space::SearchSpace;
use parking_lot::Mutex;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Arc;

/// Per-locality shared search state.
pub struct Registry<S, O, E>
where
    S: SearchSpace,
    O: ObjectiveOrdering,
    E: Enumerator<S::Node>,
{
    locality: LocalityId,
    space: Arc<S>,
    root: S::Node,
    params: SearchParams<S::Objective>,
    local_bound: AtomicI64,
    stop_search: AtomicBool,
    incumbent: Option<Arc<GlobalIncumbent<S::Node, O>>>,
    enumerator: Mutex<E>,
    stats: Arc<LocalityStatistics>,
    _ordering: PhantomData<O>,
}

impl<S, O, E> Registry<S, O, E>
where
    S: SearchSpace,
    O: ObjectiveOrdering,
    E: Enumerator<S::Node>,
{
    /// Initializes the registry of one locality. Called for every locality
    /// at `search` entry, before any task is spawned.
    pub fn new(
        locality: LocalityId,
        space: Arc<S>,
        root: S::Node,
        params: SearchParams<S::Objective>,
        incumbent: Option<Arc<GlobalIncumbent<S::Node, O>>>,
    ) -> Self {
        let initial = params
            .initial_bound
            .map(Into::into)
            .unwrap_or_else(O::worst_raw);
        Self {
            locality,
            space,
            root,
            params,
            local_bound: AtomicI64::new(initial),
            stop_search: AtomicBool::new(false),
            incumbent,
            enumerator: Mutex::new(E::default()),
            stats: Arc::new(LocalityStatistics::new()),
            _ordering: PhantomData,
        }
    }

    #[inline]
    pub fn locality(&self) -> LocalityId {
        self.locality
    }

    #[inline]
    pub fn space(&self) -> &S {
        &self.space
    }

    #[inline]
    pub fn root(&self) -> &S::Node {
        &self.root
    }

    #[inline]
    pub fn params(&self) -> &SearchParams<S::Objective> {
        &self.params
    }

    #[inline]
    pub fn incumbent(&self) -> Option<&Arc<GlobalIncumbent<S::Node, O>>> {
        self.incumbent.as_ref()
    }

    #[inline]
    pub fn stats(&self) -> &LocalityStatistics {
        &self.stats
    }

    #[inline]
    pub fn stats_handle(&self) -> Arc<LocalityStatistics> {
        Arc::clone(&self.stats)
    }

    /// The current local bound in raw representation.
    #[inline]
    pub fn bound_raw(&self) -> i64 {
        self.local_bound.load(Ordering::Relaxed)
    }

    /// Installs `candidate` only if it strictly improves the local bound
    /// under the ordering. Returns `true` on improvement.
    ///
    /// Linearizable: a compare-and-swap loop, so two racing improvements
    /// resolve to the better of the two and the bound never regresses.
    pub fn update_bound(&self, candidate: i64) -> bool {
        let updated = self
            .local_bound
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |current| {
                if O::better_raw(candidate, current) {
                    Some(candidate)
                } else {
                    None
                }
            })
            .is_ok();
        if updated {
            self.stats.on_bound_update();
        }
        updated
    }

    /// Requests search termination on this locality. One-way.
    #[inline]
    pub fn stop(&self) {
        self.stop_search.store(true, Ordering::Relaxed);
    }

    #[inline]
    pub fn is_stopped(&self) -> bool {
        self.stop_search.load(Ordering::Relaxed)
    }

    /// Merges a task's accumulator into this locality's aggregate.
    pub fn accumulate(&self, partial: E) {
        self.enumerator.lock().combine(partial);
    }

    /// Takes the locality aggregate, leaving the identity behind. Called by
    /// the driver once the schedulers are stopped.
    pub fn take_enumerator(&self) -> E {
        std::mem::take(&mut *self.enumerator.lock())
    }
}

impl<S, O, E> std::fmt::Debug for Registry<S, O, E>
where
    S: SearchSpace,
    O: ObjectiveOrdering,
    E: Enumerator<S::Node>,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("locality", &self.locality)
            .field("bound_raw", &self.bound_raw())
            .field("stopped", &self.is_stopped())
            .finish()
    }
}
