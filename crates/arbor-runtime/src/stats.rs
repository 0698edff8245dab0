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

//! Per-locality search telemetry.
//!
//! Counters are relaxed atomics bumped from the hot expansion loop; the
//! aggregated [`StatisticsSnapshot`] is what results and monitors see.

use std::sync::atomic::{AtomicU64, Ordering};

/// Live counters of one locality.
#[derive(Debug, Default)]
pub struct LocalityStatistics {
    nodes_explored: AtomicU64,
    spawns: AtomicU64,
    steals: AtomicU64,
    prunes_bound: AtomicU64,
    prunes_level: AtomicU64,
    backtracks: AtomicU64,
    bound_updates: AtomicU64,
    solutions_found: AtomicU64,
}

impl LocalityStatistics {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn on_node_explored(&self) {
        self.nodes_explored.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn on_spawn(&self) {
        self.spawns.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn on_steal(&self) {
        self.steals.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn on_prune_bound(&self) {
        self.prunes_bound.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn on_prune_level(&self) {
        self.prunes_level.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn on_backtrack(&self) {
        self.backtracks.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn on_bound_update(&self) {
        self.bound_updates.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn on_solution_found(&self) {
        self.solutions_found.fetch_add(1, Ordering::Relaxed);
    }

    /// Copies the counters into a plain snapshot.
    pub fn snapshot(&self) -> StatisticsSnapshot {
        StatisticsSnapshot {
            nodes_explored: self.nodes_explored.load(Ordering::Relaxed),
            spawns: self.spawns.load(Ordering::Relaxed),
            steals: self.steals.load(Ordering::Relaxed),
            prunes_bound: self.prunes_bound.load(Ordering::Relaxed),
            prunes_level: self.prunes_level.load(Ordering::Relaxed),
            backtracks: self.backtracks.load(Ordering::Relaxed),
            bound_updates: self.bound_updates.load(Ordering::Relaxed),
            solutions_found: self.solutions_found.load(Ordering::Relaxed),
        }
    }
}

/// A plain copy of the counters, combinable across localities.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StatisticsSnapshot {
    pub nodes_explored: u64,
    pub spawns: u64,
    pub steals: u64,
    pub prunes_bound: u64,
    pub prunes_level: u64,
    pub backtracks: u64,
    pub bound_updates: u64,
    pub solutions_found: u64,
}

impl StatisticsSnapshot {
    /// Adds another locality's counters into this snapshot.
    pub fn merge(&mut self, other: &StatisticsSnapshot) {
        self.nodes_explored += other.nodes_explored;
        self.spawns += other.spawns;
        self.steals += other.steals;
        self.prunes_bound += other.prunes_bound;
        self.prunes_level += other.prunes_level;
        self.backtracks += other.backtracks;
        self.bound_updates += other.bound_updates;
        self.solutions_found += other.solutions_found;
    }
}

impl std::fmt::Display for StatisticsSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Statistics(nodes: {}, spawns: {}, steals: {}, prunes_bound: {}, prunes_level: {}, backtracks: {}, bound_updates: {}, solutions: {})",
            self.nodes_explored,
            self.spawns,
            self.steals,
            self.prunes_bound,
            self.prunes_level,
            self.backtracks,
            self.bound_updates,
            self.solutions_found,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_accumulate() {
        let stats = LocalityStatistics::new();
        stats.on_node_explored();
        stats.on_node_explored();
        stats.on_spawn();
        stats.on_backtrack();
        stats.on_prune_bound();
        stats.on_bound_update();
        stats.on_solution_found();
        stats.on_steal();
        stats.on_prune_level();

        let snap = stats.snapshot();
        assert_eq!(snap.nodes_explored, 2);
        assert_eq!(snap.spawns, 1);
        assert_eq!(snap.steals, 1);
        assert_eq!(snap.prunes_bound, 1);
        assert_eq!(snap.prunes_level, 1);
        assert_eq!(snap.backtracks, 1);
        assert_eq!(snap.bound_updates, 1);
        assert_eq!(snap.solutions_found, 1);
    }

    #[test]
    fn test_merge_sums_fields() {
        let a = LocalityStatistics::new();
        let b = LocalityStatistics::new();
        a.on_node_explored();
        b.on_node_explored();
        b.on_spawn();

        let mut combined = a.snapshot();
        combined.merge(&b.snapshot());
        assert_eq!(combined.nodes_explored, 2);
        assert_eq!(combined.spawns, 1);
    }
}
