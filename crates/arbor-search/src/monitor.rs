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

//! # Search Monitors
//!
//! Pluggable observers for search lifecycle events. Monitors collect
//! telemetry, stream progress, or bridge into a logging backend without
//! entangling those concerns in the expansion loops. Hooks fire on cold
//! paths only (improvements, spawns, search entry/exit), never per node.
//!
//! Monitors are shared by every worker thread of every locality, so hooks
//! take `&self` and implementations synchronize internally if they keep
//! state.

use crate::skeleton::SearchMode;
use arbor_runtime::stats::StatisticsSnapshot;

/// Observer of one search run. All hooks default to no-ops.
pub trait SearchMonitor<N>: Send + Sync + 'static {
    /// Monitor name for diagnostics.
    fn name(&self) -> &str;

    /// The search is about to start.
    fn on_search_enter(&self, skeleton: &'static str, mode: SearchMode) {
        let _ = (skeleton, mode);
    }

    /// A new incumbent was installed.
    fn on_solution(&self, node: &N, objective: i64) {
        let _ = (node, objective);
    }

    /// A locality improved its bound (and broadcast it).
    fn on_bound_update(&self, objective: i64) {
        let _ = objective;
    }

    /// A subtree became a stealable task rooted at `depth`.
    fn on_spawn(&self, depth: usize) {
        let _ = depth;
    }

    /// The search finished; `stats` is the cluster-wide aggregate.
    fn on_search_exit(&self, stats: &StatisticsSnapshot) {
        let _ = stats;
    }
}

impl<N: 'static> std::fmt::Debug for dyn SearchMonitor<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SearchMonitor({})", self.name())
    }
}

/// The default monitor: observes nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpMonitor;

impl<N> SearchMonitor<N> for NoOpMonitor {
    fn name(&self) -> &str {
        "NoOpMonitor"
    }
}

/// Bridges monitor events onto the `tracing` backbone. Attach it for the
/// verbose skeleton banner and per-improvement logging.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingMonitor;

impl<N> SearchMonitor<N> for TracingMonitor {
    fn name(&self) -> &str {
        "TracingMonitor"
    }

    fn on_search_enter(&self, skeleton: &'static str, mode: SearchMode) {
        tracing::info!(skeleton, %mode, "starting tree search");
    }

    fn on_solution(&self, _node: &N, objective: i64) {
        tracing::debug!(objective, "new incumbent installed");
    }

    fn on_bound_update(&self, objective: i64) {
        tracing::trace!(objective, "bound improved");
    }

    fn on_spawn(&self, depth: usize) {
        tracing::trace!(depth, "subtree spawned as task");
    }

    fn on_search_exit(&self, stats: &StatisticsSnapshot) {
        tracing::info!(%stats, "tree search finished");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;

    struct Counting {
        solutions: Arc<AtomicU64>,
    }

    impl SearchMonitor<u32> for Counting {
        fn name(&self) -> &str {
            "Counting"
        }

        fn on_solution(&self, _node: &u32, _objective: i64) {
            self.solutions.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[test]
    fn test_custom_monitor_receives_events() {
        let solutions = Arc::new(AtomicU64::new(0));
        let monitor = Counting {
            solutions: Arc::clone(&solutions),
        };

        monitor.on_solution(&1, 10);
        monitor.on_solution(&2, 20);
        // Unimplemented hooks fall back to the defaults.
        monitor.on_spawn(3);
        SearchMonitor::<u32>::on_bound_update(&monitor, 20);

        assert_eq!(solutions.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn test_noop_monitor_name() {
        assert_eq!(SearchMonitor::<u32>::name(&NoOpMonitor), "NoOpMonitor");
    }
}
