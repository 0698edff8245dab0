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

//! # Search Context and Node Processing
//!
//! The context every task captures: all registries (the broadcast set), the
//! incumbent, the mode and the failure slot. [`SearchContext::process_node`]
//! is the one place the bounding, prune-level, incumbent-update and
//! decision-target rules live; every skeleton calls it for each generated
//! child, before descending or enqueuing.

use crate::monitor::SearchMonitor;
use crate::skeleton::SearchMode;
use arbor_core::enumerate::Enumerator;
use arbor_core::error::SearchError;
use arbor_core::objective::ObjectiveOrdering;
use arbor_core::space::SearchSpace;
use arbor_runtime::cluster::LocalityId;
use arbor_runtime::incumbent::GlobalIncumbent;
use arbor_runtime::registry::Registry;
use parking_lot::Mutex;
use std::sync::Arc;

/// What to do with a freshly generated child.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum NodeAction {
    /// Expand (or enqueue) the child.
    Descend,
    /// Drop the child, keep its siblings.
    Prune,
    /// Drop the child and all its remaining siblings.
    PruneSiblings,
    /// Stop this task immediately (decision target met or stop requested).
    Exit,
}

/// Shared state of one search run, cloned into every task closure.
pub(crate) struct SearchContext<S, O, E>
where
    S: SearchSpace,
    O: ObjectiveOrdering,
    E: Enumerator<S::Node>,
{
    pub registries: Arc<Vec<Arc<Registry<S, O, E>>>>,
    pub incumbent: Option<Arc<GlobalIncumbent<S::Node, O>>>,
    pub mode: SearchMode,
    pub monitor: Arc<dyn SearchMonitor<S::Node>>,
    pub failure: Arc<Mutex<Option<SearchError>>>,
}

impl<S, O, E> Clone for SearchContext<S, O, E>
where
    S: SearchSpace,
    O: ObjectiveOrdering,
    E: Enumerator<S::Node>,
{
    fn clone(&self) -> Self {
        Self {
            registries: Arc::clone(&self.registries),
            incumbent: self.incumbent.clone(),
            mode: self.mode,
            monitor: Arc::clone(&self.monitor),
            failure: Arc::clone(&self.failure),
        }
    }
}

impl<S, O, E> SearchContext<S, O, E>
where
    S: SearchSpace,
    O: ObjectiveOrdering,
    E: Enumerator<S::Node>,
{
    /// The registry of `locality`.
    #[inline]
    pub fn registry(&self, locality: LocalityId) -> &Arc<Registry<S, O, E>> {
        &self.registries[locality.get()]
    }

    /// Sets the stop flag on every locality.
    pub fn stop_all(&self) {
        for registry in self.registries.iter() {
            registry.stop();
        }
    }

    /// Records the first failure and stops the search cluster-wide. Later
    /// failures are dropped; the root's waiter surfaces the first one.
    pub fn record_failure(&self, error: SearchError) {
        let mut slot = self.failure.lock();
        if slot.is_none() {
            tracing::debug!(%error, "task failed, stopping search");
            *slot = Some(error);
        }
        drop(slot);
        self.stop_all();
    }

    /// Applies an improved bound to every registry. Receivers apply the
    /// same monotone rule, so reordered broadcasts are harmless.
    fn broadcast_bound(&self, objective: i64) {
        for registry in self.registries.iter() {
            registry.update_bound(objective);
        }
    }

    /// Applies the bounding, incumbent and decision rules to a freshly
    /// generated child. Called before descent and before enqueuing.
    pub fn process_node(&self, registry: &Registry<S, O, E>, node: &S::Node) -> NodeAction {
        if self.mode == SearchMode::Enumeration {
            return NodeAction::Descend;
        }

        let space = registry.space();
        let params = registry.params();

        // Prune when the optimistic bound cannot beat what we already have.
        if let Some(bound) = space.upper_bound(node) {
            let bound_raw: i64 = bound.into();
            if !O::better_raw(bound_raw, registry.bound_raw()) {
                registry.stats().on_prune_bound();
                if params.prune_level {
                    registry.stats().on_prune_level();
                    return NodeAction::PruneSiblings;
                }
                return NodeAction::Prune;
            }
        }

        // Improvement: tighten the local bound, broadcast it, offer the
        // node to the global incumbent.
        let objective_raw: i64 = space.objective(node).into();
        if O::better_raw(objective_raw, registry.bound_raw()) && registry.update_bound(objective_raw)
        {
            self.broadcast_bound(objective_raw);
            self.monitor.on_bound_update(objective_raw);
            if let Some(incumbent) = &self.incumbent {
                if incumbent.try_install(node, objective_raw) {
                    registry.stats().on_solution_found();
                    self.monitor.on_solution(node, objective_raw);
                }
            }
        }

        // Decision mode: reaching the target ends the whole search.
        if self.mode == SearchMode::Decision {
            if let Some(expected) = params.expected_objective {
                if O::meets(objective_raw, expected.into()) {
                    tracing::debug!(objective = objective_raw, "decision target met");
                    self.stop_all();
                    return NodeAction::Exit;
                }
            }
        }

        NodeAction::Descend
    }
}
