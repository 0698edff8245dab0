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

mod common;

use arbor_core::enumerate::CountNodes;
use arbor_core::error::SearchError;
use arbor_core::objective::{Maximising, Minimising};
use arbor_core::params::SearchParams;
use arbor_runtime::cluster::ClusterSpec;
use arbor_search::{PoolKind, SearchMonitor, SkeletonKind, TreeSearch};
use common::{all_skeletons, BitNode, BitTree, DeepChain, PanicTree};
use std::sync::Arc;

/// Parameters that satisfy every skeleton's requirements at once.
fn shared_params() -> SearchParams<i64> {
    SearchParams::builder()
        .spawn_depth(3)
        .backtrack_budget(3)
        .spawn_probability(4)
        .build()
}

fn two_localities() -> ClusterSpec {
    ClusterSpec::new(2).with_workers(2)
}

fn sequential() -> ClusterSpec {
    ClusterSpec::new(1).with_workers(1)
}

#[test]
fn test_all_skeletons_agree_on_the_optimum() {
    let space = Arc::new(BitTree {
        height: 8,
        bounded: false,
        reward_ones: true,
    });

    for skeleton in all_skeletons() {
        let outcome = TreeSearch::<_, Maximising>::new(Arc::clone(&space))
            .skeleton(skeleton)
            .params(shared_params())
            .cluster(two_localities())
            .optimise(BitTree::root())
            .unwrap();

        assert_eq!(
            outcome.objective(),
            8,
            "skeleton {} missed the optimum",
            skeleton
        );
        assert_eq!(outcome.best().value.count_ones(), 8);
    }
}

#[test]
fn test_bounded_search_reaches_the_same_optimum() {
    let space = Arc::new(BitTree {
        height: 8,
        bounded: true,
        reward_ones: true,
    });

    for skeleton in all_skeletons() {
        let outcome = TreeSearch::<_, Maximising>::new(Arc::clone(&space))
            .skeleton(skeleton)
            .params(shared_params())
            .cluster(two_localities())
            .optimise(BitTree::root())
            .unwrap();

        assert_eq!(
            outcome.objective(),
            8,
            "bounded run of {} changed the result",
            skeleton
        );
    }
}

#[test]
fn test_prune_level_is_sound_under_a_monotone_child_order() {
    // Children arrive ordered 0 then 1; with reward_ones off, the bound
    // objective + headroom is non-increasing across that order.
    let space = Arc::new(BitTree {
        height: 8,
        bounded: true,
        reward_ones: false,
    });
    let mut params = shared_params();
    params.prune_level = true;

    let pruned = TreeSearch::<_, Maximising>::new(Arc::clone(&space))
        .params(params)
        .cluster(two_localities())
        .optimise(BitTree::root())
        .unwrap();

    let unpruned = TreeSearch::<_, Maximising>::new(space)
        .params(shared_params())
        .cluster(two_localities())
        .optimise(BitTree::root())
        .unwrap();

    assert_eq!(pruned.objective(), unpruned.objective());
    assert_eq!(pruned.objective(), 8);
}

#[test]
fn test_exhaustiveness_every_node_visited_exactly_once() {
    let space = Arc::new(BitTree {
        height: 8,
        bounded: false,
        reward_ones: true,
    });
    let expected = BitTree::total_nodes(8);

    for skeleton in all_skeletons() {
        // Enumeration counts through the accumulator ...
        let enumerated = TreeSearch::<_, Maximising>::new(Arc::clone(&space))
            .skeleton(skeleton)
            .params(shared_params())
            .cluster(two_localities())
            .enumerate::<CountNodes>(BitTree::root())
            .unwrap();
        assert_eq!(
            *enumerated.value(),
            expected,
            "skeleton {} enumerated the wrong count",
            skeleton
        );
        assert_eq!(enumerated.statistics().nodes_explored, expected);

        // ... and an optimisation with the null bound walks the same tree.
        let optimised = TreeSearch::<_, Maximising>::new(Arc::clone(&space))
            .skeleton(skeleton)
            .params(shared_params())
            .cluster(two_localities())
            .optimise(BitTree::root())
            .unwrap();
        assert_eq!(
            optimised.statistics().nodes_explored,
            expected,
            "skeleton {} with the null bound skipped nodes",
            skeleton
        );
    }
}

#[test]
fn test_depth_limit_counts_but_does_not_expand() {
    let space = Arc::new(BitTree {
        height: 10,
        bounded: false,
        reward_ones: true,
    });
    let mut params = shared_params();
    params.max_depth = Some(4);

    for skeleton in all_skeletons() {
        let outcome = TreeSearch::<_, Maximising>::new(Arc::clone(&space))
            .skeleton(skeleton)
            .params(params.clone())
            .cluster(two_localities())
            .enumerate::<CountNodes>(BitTree::root())
            .unwrap();
        assert_eq!(
            *outcome.value(),
            BitTree::total_nodes(4),
            "skeleton {} ignored the depth limit",
            skeleton
        );
    }
}

#[test]
fn test_decision_reachable_target_is_satisfied() {
    let space = Arc::new(BitTree {
        height: 10,
        bounded: false,
        reward_ones: true,
    });

    for skeleton in all_skeletons() {
        let outcome = TreeSearch::<_, Maximising>::new(Arc::clone(&space))
            .skeleton(skeleton)
            .params(shared_params())
            .cluster(two_localities())
            .decide(BitTree::root(), 10)
            .unwrap();
        assert!(outcome.satisfied(), "skeleton {} missed the target", skeleton);
        assert_eq!(outcome.objective(), 10);
    }
}

#[test]
fn test_decision_unreachable_target_degrades_to_exhaustive_search() {
    let space = Arc::new(BitTree {
        height: 8,
        bounded: false,
        reward_ones: true,
    });

    let outcome = TreeSearch::<_, Maximising>::new(space)
        .params(shared_params())
        .cluster(two_localities())
        .decide(BitTree::root(), 9)
        .unwrap();

    assert!(!outcome.satisfied());
    assert_eq!(outcome.objective(), 8, "still returns the global optimum");
    assert_eq!(
        outcome.statistics().nodes_explored,
        BitTree::total_nodes(8),
        "stop was never requested, so the walk is exhaustive"
    );
}

#[test]
fn test_spawn_depth_zero_keeps_all_work_on_the_root_locality() {
    let space = Arc::new(BitTree {
        height: 7,
        bounded: false,
        reward_ones: true,
    });
    let params = SearchParams::builder().spawn_depth(0).build();

    let outcome = TreeSearch::<_, Maximising>::new(space)
        .skeleton(SkeletonKind::DepthBounded {
            pool: PoolKind::Depth,
        })
        .params(params)
        .cluster(two_localities())
        .optimise(BitTree::root())
        .unwrap();

    assert_eq!(outcome.objective(), 7);
    // Only the root submission exists. Whichever locality ends up running
    // it does the entire walk alone; there is no parallelism above root.
    assert_eq!(outcome.statistics().spawns, 1);
    let per_locality = outcome.locality_statistics();
    let busy = per_locality
        .iter()
        .filter(|stats| stats.nodes_explored > 0)
        .count();
    assert_eq!(busy, 1, "all work must run on a single locality");
    assert_eq!(
        outcome.statistics().nodes_explored,
        BitTree::total_nodes(7)
    );
}

#[test]
fn test_budget_skeleton_offloads_on_exhausted_budget() {
    let space = Arc::new(BitTree {
        height: 3,
        bounded: false,
        reward_ones: true,
    });
    let params = SearchParams::builder().backtrack_budget(1).build();

    let outcome = TreeSearch::<_, Maximising>::new(space)
        .skeleton(SkeletonKind::Budget)
        .params(params)
        .cluster(sequential())
        .enumerate::<CountNodes>(BitTree::root())
        .unwrap();

    assert_eq!(*outcome.value(), 15);
    // Every exhausted budget window sheds the shallowest open frame, so a
    // budget of one forces offloading beyond the root submission.
    assert!(
        outcome.statistics().spawns > 1,
        "expected offloaded siblings, got {}",
        outcome.statistics()
    );
    assert!(outcome.statistics().backtracks > outcome.statistics().spawns);
}

/// Records the order in which incumbents are installed.
struct SolutionLog {
    sender: crossbeam_channel::Sender<i64>,
}

impl SearchMonitor<BitNode> for SolutionLog {
    fn name(&self) -> &str {
        "SolutionLog"
    }

    fn on_solution(&self, _node: &BitNode, objective: i64) {
        let _ = self.sender.send(objective);
    }
}

#[test]
fn test_ordered_discrepancy_search_dives_greedily_first() {
    // Left children (emitted first) are the rewarding ones, so the pure
    // greedy dive is the unique optimum and every improvement on the way
    // down is one more left step.
    let height = 6;
    let space = Arc::new(BitTree {
        height,
        bounded: false,
        reward_ones: false,
    });
    let params = SearchParams::builder()
        .spawn_depth(height)
        .discrepancy_order(true)
        .build();

    let (sender, receiver) = crossbeam_channel::unbounded();
    let outcome = TreeSearch::<_, Maximising>::new(space)
        .skeleton(SkeletonKind::Ordered)
        .params(params)
        .cluster(sequential())
        .monitor(Arc::new(SolutionLog { sender }))
        .optimise(BitTree::root())
        .unwrap();

    assert_eq!(outcome.objective(), height as i64);

    let improvements: Vec<i64> = receiver.try_iter().collect();
    let expected: Vec<i64> = (1..=height as i64).collect();
    assert_eq!(
        improvements, expected,
        "discrepancy 0 must produce the greedy dive before any deviation"
    );
}

#[test]
fn test_stack_stealing_chunked_and_single_steals_cover_the_tree() {
    for steal_all in [false, true] {
        let space = Arc::new(BitTree {
            height: 9,
            bounded: false,
            reward_ones: true,
        });
        let params = SearchParams::builder().steal_all(steal_all).build();

        let outcome = TreeSearch::<_, Maximising>::new(space)
            .skeleton(SkeletonKind::StackStealing)
            .params(params)
            .cluster(two_localities())
            .enumerate::<CountNodes>(BitTree::root())
            .unwrap();

        assert_eq!(
            *outcome.value(),
            BitTree::total_nodes(9),
            "steal_all={} lost or duplicated nodes",
            steal_all
        );
    }
}

#[test]
fn test_minimising_ordering_keeps_the_root_as_optimum() {
    let space = Arc::new(BitTree {
        height: 6,
        bounded: false,
        reward_ones: true,
    });

    let outcome = TreeSearch::<BitTree, Minimising>::new(space)
        .params(shared_params())
        .cluster(sequential())
        .optimise(BitTree::root())
        .unwrap();

    // No node has fewer ones than the root.
    assert_eq!(outcome.objective(), 0);
    assert_eq!(outcome.best().depth, 0);
}

#[test]
fn test_stack_overflow_fails_fast() {
    let space = Arc::new(DeepChain { length: 10 });
    let params = SearchParams::<i64>::builder()
        .spawn_depth(0)
        .max_stack_depth(4)
        .build();

    let err = TreeSearch::<_, Maximising>::new(Arc::clone(&space))
        .params(params.clone())
        .cluster(sequential())
        .optimise(0)
        .unwrap_err();
    assert!(matches!(err, SearchError::StackOverflow { limit: 4, .. }));

    // The indexed skeleton guards its recursion the same way.
    let err = TreeSearch::<_, Maximising>::new(space)
        .skeleton(SkeletonKind::Indexed)
        .params(params)
        .cluster(sequential())
        .optimise(0)
        .unwrap_err();
    assert!(matches!(err, SearchError::StackOverflow { limit: 4, .. }));
}

#[test]
fn test_chain_exactly_at_stack_limit_succeeds() {
    let space = Arc::new(DeepChain { length: 7 });
    let params = SearchParams::<i64>::builder()
        .spawn_depth(0)
        .max_stack_depth(8)
        .build();

    let outcome = TreeSearch::<_, Maximising>::new(space)
        .params(params)
        .cluster(sequential())
        .optimise(0)
        .unwrap();
    assert_eq!(outcome.objective(), 7);
}

#[test]
fn test_generator_panic_surfaces_as_callback_failure() {
    let space = Arc::new(PanicTree);

    let err = TreeSearch::<_, Maximising>::new(space)
        .params(shared_params())
        .cluster(two_localities())
        .optimise(BitNode { depth: 0, value: 0 })
        .unwrap_err();

    match err {
        SearchError::Callback(message) => {
            assert!(message.contains("child generator exploded"));
        }
        other => panic!("expected a callback failure, got {other}"),
    }
}
