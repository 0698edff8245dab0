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

//! # Search Driver
//!
//! The orchestration every skeleton shares:
//!
//! 1. Validate the configuration; nothing is acquired on failure.
//! 2. Create the incumbent and broadcast registry initialization.
//! 3. Initialize the chosen policy on every locality.
//! 4. Start the schedulers.
//! 5. Submit the root task and block on the root's completion promise.
//! 6. Broadcast scheduler shutdown.
//! 7. Surface the first failure, or combine enumerators / read the
//!    incumbent.

use crate::context::SearchContext;
use crate::monitor::SearchMonitor;
use crate::skeleton::{self, SearchMode, SkeletonKind};
use arbor_core::enumerate::Enumerator;
use arbor_core::error::SearchError;
use arbor_core::objective::ObjectiveOrdering;
use arbor_core::params::SearchParams;
use arbor_core::space::SearchSpace;
use arbor_runtime::cluster::ClusterSpec;
use arbor_runtime::incumbent::GlobalIncumbent;
use arbor_runtime::latch::CompletionLatch;
use arbor_runtime::promise::promise;
use arbor_runtime::registry::Registry;
use arbor_runtime::scheduler::Scheduler;
use arbor_runtime::signal::WorkSignal;
use arbor_runtime::stats::StatisticsSnapshot;
use parking_lot::Mutex;
use std::sync::Arc;

/// The mode-independent product of one search run.
pub(crate) struct RawSearch<S: SearchSpace, E> {
    /// The incumbent with its raw objective; `None` in enumeration mode.
    pub best: Option<(S::Node, i64)>,
    pub enumerator: E,
    pub statistics: StatisticsSnapshot,
    pub locality_statistics: Vec<StatisticsSnapshot>,
}

impl<S: SearchSpace, E> std::fmt::Debug for RawSearch<S, E>
where
    S::Node: std::fmt::Debug,
    E: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawSearch")
            .field("best", &self.best)
            .field("enumerator", &self.enumerator)
            .field("statistics", &self.statistics)
            .field("locality_statistics", &self.locality_statistics)
            .finish()
    }
}

pub(crate) fn run<S, O, E>(
    space: Arc<S>,
    root: S::Node,
    params: SearchParams<S::Objective>,
    kind: SkeletonKind,
    mode: SearchMode,
    cluster: ClusterSpec,
    monitor: Arc<dyn SearchMonitor<S::Node>>,
) -> Result<RawSearch<S, E>, SearchError>
where
    S: SearchSpace,
    O: ObjectiveOrdering,
    E: Enumerator<S::Node>,
{
    skeleton::validate(&kind, &params, mode)?;
    cluster.validate()?;

    monitor.on_search_enter(kind.name(), mode);
    tracing::info!(
        skeleton = kind.name(),
        %mode,
        localities = cluster.localities,
        workers = cluster.worker_threads(),
        ordering = O::NAME,
        "initialising tree search"
    );

    let incumbent = match mode {
        SearchMode::Optimisation | SearchMode::Decision => {
            Some(Arc::new(GlobalIncumbent::<S::Node, O>::new()))
        }
        SearchMode::Enumeration => None,
    };

    let signals: Vec<Arc<WorkSignal>> = cluster
        .locality_ids()
        .map(|_| Arc::new(WorkSignal::new()))
        .collect();

    // Broadcast registry initialization to every locality.
    let registries: Vec<Arc<Registry<S, O, E>>> = cluster
        .locality_ids()
        .map(|locality| {
            Arc::new(Registry::new(
                locality,
                Arc::clone(&space),
                root.clone(),
                params.clone(),
                incumbent.clone(),
            ))
        })
        .collect();

    // The root is the first incumbent, so a childless root is returned
    // as-is and the bound never sits below an achieved objective.
    let root_objective: i64 = space.objective(&root).into();
    if let Some(incumbent) = &incumbent {
        incumbent.try_install(&root, root_objective);
        for registry in &registries {
            registry.update_bound(root_objective);
        }
    }

    // A root that already satisfies the decision target needs no tasks.
    if mode == SearchMode::Decision {
        if let Some(expected) = params.expected_objective {
            if O::meets(root_objective, expected.into()) {
                registries[0].stats().on_node_explored();
                let locality_statistics: Vec<_> =
                    registries.iter().map(|r| r.stats().snapshot()).collect();
                let mut statistics = StatisticsSnapshot::default();
                for snapshot in &locality_statistics {
                    statistics.merge(snapshot);
                }
                monitor.on_search_exit(&statistics);
                return Ok(RawSearch {
                    best: Some((root, root_objective)),
                    enumerator: E::default(),
                    statistics,
                    locality_statistics,
                });
            }
        }
    }

    let ctx = SearchContext {
        registries: Arc::new(registries),
        incumbent: incumbent.clone(),
        mode,
        monitor: Arc::clone(&monitor),
        failure: Arc::new(Mutex::new(None)),
    };

    // Initialize the policy on every locality and bind the root task.
    let skeleton::SkeletonLaunch { pools, submit_root } = skeleton::launch(kind, &ctx, &signals);

    let worker_count = cluster.worker_threads();
    let schedulers: Vec<Scheduler> = cluster
        .locality_ids()
        .map(|locality| {
            Scheduler::start(
                locality,
                pools.clone(),
                Arc::clone(&signals[locality.get()]),
                ctx.registry(locality).stats_handle(),
                worker_count,
            )
        })
        .collect();

    // Submit the root task and wait for the whole task tree to finish.
    let (root_promise, root_future) = promise();
    let root_latch = CompletionLatch::root(root_promise);
    submit_root(&root_latch);
    root_latch.complete();
    root_future.wait();

    // Broadcast scheduler shutdown.
    for scheduler in schedulers {
        scheduler.stop();
    }

    if let Some(error) = ctx.failure.lock().take() {
        return Err(error);
    }

    // Combine the per-locality enumerators and statistics.
    let mut enumerator = E::default();
    for registry in ctx.registries.iter() {
        enumerator.combine(registry.take_enumerator());
    }

    let locality_statistics: Vec<_> = ctx
        .registries
        .iter()
        .map(|registry| registry.stats().snapshot())
        .collect();
    let mut statistics = StatisticsSnapshot::default();
    for snapshot in &locality_statistics {
        statistics.merge(snapshot);
    }

    monitor.on_search_exit(&statistics);
    tracing::debug!(%statistics, "tree search finished");

    let best = incumbent
        .as_ref()
        .and_then(|incumbent| incumbent.snapshot_with_objective());

    Ok(RawSearch {
        best,
        enumerator,
        statistics,
        locality_statistics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::NoOpMonitor;
    use arbor_core::enumerate::CountNodes;
    use arbor_core::objective::Maximising;
    use arbor_core::space::NodeGenerator;

    /// A complete binary tree of fixed height; objective is the number of
    /// ones on the path.
    struct Binary {
        height: usize,
    }

    #[derive(Clone, Debug)]
    struct Path {
        depth: usize,
        ones: u32,
    }

    struct TwoChildren {
        count: usize,
        next: u32,
    }

    impl NodeGenerator<Binary> for TwoChildren {
        fn num_children(&self) -> usize {
            self.count
        }

        fn next_child(&mut self, _space: &Binary, parent: &Path) -> Path {
            let bit = self.next;
            self.next += 1;
            Path {
                depth: parent.depth + 1,
                ones: parent.ones + bit,
            }
        }
    }

    impl SearchSpace for Binary {
        type Node = Path;
        type Objective = i64;
        type Generator = TwoChildren;

        fn generator(&self, node: &Path) -> TwoChildren {
            let count = if node.depth < self.height { 2 } else { 0 };
            TwoChildren { count, next: 0 }
        }

        fn objective(&self, node: &Path) -> i64 {
            node.ones as i64
        }
    }

    fn single_worker() -> ClusterSpec {
        ClusterSpec::new(1).with_workers(1)
    }

    #[test]
    fn test_sequential_optimisation_finds_the_all_ones_leaf() {
        let raw = run::<Binary, Maximising, CountNodes>(
            Arc::new(Binary { height: 5 }),
            Path { depth: 0, ones: 0 },
            SearchParams::default(),
            SkeletonKind::default(),
            SearchMode::Optimisation,
            single_worker(),
            Arc::new(NoOpMonitor),
        )
        .unwrap();

        let (best, objective) = raw.best.unwrap();
        assert_eq!(objective, 5);
        assert_eq!(best.ones, 5);
        assert_eq!(raw.statistics.nodes_explored, 63, "2^6 - 1 nodes");
    }

    #[test]
    fn test_childless_root_returns_root() {
        let raw = run::<Binary, Maximising, CountNodes>(
            Arc::new(Binary { height: 0 }),
            Path { depth: 0, ones: 0 },
            SearchParams::default(),
            SkeletonKind::default(),
            SearchMode::Optimisation,
            single_worker(),
            Arc::new(NoOpMonitor),
        )
        .unwrap();

        let (best, objective) = raw.best.unwrap();
        assert_eq!(objective, 0);
        assert_eq!(best.depth, 0);
    }

    #[test]
    fn test_decision_satisfied_by_root_spawns_nothing() {
        let params = SearchParams::<i64>::builder().expected_objective(0).build();
        let raw = run::<Binary, Maximising, CountNodes>(
            Arc::new(Binary { height: 5 }),
            Path { depth: 0, ones: 0 },
            params,
            SkeletonKind::default(),
            SearchMode::Decision,
            single_worker(),
            Arc::new(NoOpMonitor),
        )
        .unwrap();

        assert_eq!(raw.statistics.nodes_explored, 1);
        assert_eq!(raw.statistics.spawns, 0);
        assert_eq!(raw.best.unwrap().1, 0);
    }

    #[test]
    fn test_configuration_error_before_any_task() {
        let err = run::<Binary, Maximising, CountNodes>(
            Arc::new(Binary { height: 3 }),
            Path { depth: 0, ones: 0 },
            SearchParams::default(),
            SkeletonKind::Budget,
            SearchMode::Optimisation,
            single_worker(),
            Arc::new(NoOpMonitor),
        )
        .unwrap_err();
        assert!(matches!(err, SearchError::Config(_)));
    }

    #[test]
    fn test_decision_without_target_is_a_configuration_error() {
        let err = run::<Binary, Maximising, CountNodes>(
            Arc::new(Binary { height: 3 }),
            Path { depth: 0, ones: 0 },
            SearchParams::default(),
            SkeletonKind::default(),
            SearchMode::Decision,
            single_worker(),
            Arc::new(NoOpMonitor),
        )
        .unwrap_err();
        assert!(matches!(err, SearchError::Config(_)));
    }

    #[test]
    fn test_enumeration_counts_all_nodes() {
        let raw = run::<Binary, Maximising, CountNodes>(
            Arc::new(Binary { height: 6 }),
            Path { depth: 0, ones: 0 },
            SearchParams::default(),
            SkeletonKind::default(),
            SearchMode::Enumeration,
            single_worker(),
            Arc::new(NoOpMonitor),
        )
        .unwrap();

        assert_eq!(<CountNodes as Enumerator<Path>>::finish(raw.enumerator), 127);
        assert!(raw.best.is_none());
    }
}
