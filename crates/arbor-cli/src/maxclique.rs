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

//! # Maximum Clique
//!
//! The classic branch-and-bound benchmark. Vertices are reordered by
//! non-increasing degree; a node carries the clique built so far and the
//! candidate set, and children are emitted in reverse greedy-colouring
//! order so the colour-class bound (`clique size + colours left`) is
//! monotone non-increasing across siblings — which is what makes
//! prune-level sound here.

use crate::dimacs::DimacsGraph;
use arbor_core::space::{NodeGenerator, SearchSpace};
use fixedbitset::FixedBitSet;

/// A degree-ordered graph as the search space.
pub struct CliqueSpace {
    adjacency: Vec<FixedBitSet>,
    /// Maps ordered vertex ids back to the input numbering (0-based).
    labels: Vec<usize>,
}

/// A partial clique plus its remaining candidates.
#[derive(Clone, Debug)]
pub struct CliqueNode {
    /// Chosen vertices, in ordered ids.
    pub members: Vec<u32>,
    /// Colour classes remaining in the candidate set of the parent at the
    /// time this node was generated; part of the bound.
    pub colours: i32,
    /// Vertices that extend the clique.
    pub candidates: FixedBitSet,
}

impl CliqueSpace {
    /// Builds the space from a parsed DIMACS graph, reordering vertices by
    /// non-increasing degree (ties to the smaller input id).
    pub fn new(graph: &DimacsGraph) -> Self {
        let n = graph.vertices;
        let mut degree = vec![0usize; n];
        for &(u, v) in &graph.edges {
            if u != v {
                degree[u] += 1;
                degree[v] += 1;
            }
        }

        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&a, &b| degree[b].cmp(&degree[a]).then(a.cmp(&b)));

        let mut position = vec![0usize; n];
        for (slot, &vertex) in order.iter().enumerate() {
            position[vertex] = slot;
        }

        let mut adjacency = vec![FixedBitSet::with_capacity(n); n];
        for &(u, v) in &graph.edges {
            if u == v {
                continue;
            }
            let (a, b) = (position[u], position[v]);
            adjacency[a].insert(b);
            adjacency[b].insert(a);
        }

        Self {
            adjacency,
            labels: order,
        }
    }

    /// Number of vertices.
    pub fn vertices(&self) -> usize {
        self.labels.len()
    }

    /// The root node: empty clique, every vertex a candidate.
    pub fn root(&self) -> CliqueNode {
        let mut candidates = FixedBitSet::with_capacity(self.vertices());
        candidates.insert_range(..);
        CliqueNode {
            members: Vec::new(),
            colours: 0,
            candidates,
        }
    }

    /// Maps a solution back to the input vertex numbering.
    pub fn input_labels(&self, node: &CliqueNode) -> Vec<usize> {
        node.members
            .iter()
            .map(|&vertex| self.labels[vertex as usize])
            .collect()
    }

    /// Greedy colouring of `candidates`: returns the vertices in colouring
    /// order and the running colour count at each position.
    fn colour_class_order(&self, candidates: &FixedBitSet) -> (Vec<u32>, Vec<u32>) {
        let mut left = candidates.clone();
        let mut order = Vec::with_capacity(candidates.count_ones(..));
        let mut bounds = Vec::with_capacity(order.capacity());
        let mut colour = 0u32;

        while left.count_ones(..) != 0 {
            colour += 1;
            let mut class = left.clone();
            while let Some(vertex) = class.ones().next() {
                left.set(vertex, false);
                class.set(vertex, false);
                // Neighbours cannot share this colour.
                class.difference_with(&self.adjacency[vertex]);
                order.push(vertex as u32);
                bounds.push(colour);
            }
        }

        (order, bounds)
    }

    fn children_of(&self, node: &CliqueNode) -> Vec<CliqueNode> {
        let (order, bounds) = self.colour_class_order(&node.candidates);
        let mut remaining = node.candidates.clone();
        let mut children = Vec::with_capacity(order.len());

        // Reverse colouring order: the bound decreases across siblings.
        for slot in (0..order.len()).rev() {
            let vertex = order[slot] as usize;

            let mut members = node.members.clone();
            members.push(order[slot]);

            let mut candidates = remaining.clone();
            candidates.intersect_with(&self.adjacency[vertex]);

            children.push(CliqueNode {
                members,
                // One colour class is consumed by taking this vertex.
                colours: bounds[slot] as i32 - 1,
                candidates,
            });

            remaining.set(vertex, false);
        }

        children
    }
}

/// Children are materialized eagerly; the colouring dominates the cost and
/// is needed for the bound anyway.
pub struct CliqueChildren {
    children: Vec<CliqueNode>,
    next: usize,
}

impl NodeGenerator<CliqueSpace> for CliqueChildren {
    fn num_children(&self) -> usize {
        self.children.len()
    }

    fn next_child(&mut self, _space: &CliqueSpace, _parent: &CliqueNode) -> CliqueNode {
        let child = self.children[self.next].clone();
        self.next += 1;
        child
    }

    fn nth_child(&mut self, _space: &CliqueSpace, _parent: &CliqueNode, index: usize) -> CliqueNode {
        self.children[index].clone()
    }
}

impl SearchSpace for CliqueSpace {
    type Node = CliqueNode;
    type Objective = i64;
    type Generator = CliqueChildren;

    fn generator(&self, node: &CliqueNode) -> CliqueChildren {
        CliqueChildren {
            children: self.children_of(node),
            next: 0,
        }
    }

    fn objective(&self, node: &CliqueNode) -> i64 {
        node.members.len() as i64
    }

    fn upper_bound(&self, node: &CliqueNode) -> Option<i64> {
        Some(node.members.len() as i64 + node.colours as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dimacs;
    use arbor_core::params::SearchParams;
    use arbor_runtime::cluster::ClusterSpec;
    use arbor_search::{SkeletonKind, TreeSearch};
    use std::sync::Arc;

    fn complete_graph(n: usize) -> DimacsGraph {
        let mut edges = Vec::new();
        for u in 0..n {
            for v in (u + 1)..n {
                edges.push((u, v));
            }
        }
        DimacsGraph { vertices: n, edges }
    }

    fn cycle_graph(n: usize) -> DimacsGraph {
        let edges = (0..n).map(|u| (u, (u + 1) % n)).collect();
        DimacsGraph { vertices: n, edges }
    }

    fn solve(graph: &DimacsGraph, skeleton: SkeletonKind) -> i64 {
        let space = Arc::new(CliqueSpace::new(graph));
        let root = space.root();
        let params = SearchParams::builder()
            .spawn_depth(2)
            .backtrack_budget(4)
            .spawn_probability(4)
            .prune_level(true)
            .build();

        TreeSearch::<_, arbor_core::Maximising>::new(space)
            .skeleton(skeleton)
            .params(params)
            .cluster(ClusterSpec::new(2).with_workers(2))
            .optimise(root)
            .unwrap()
            .objective()
    }

    fn skeletons() -> Vec<SkeletonKind> {
        vec![
            SkeletonKind::default(),
            SkeletonKind::StackStealing,
            SkeletonKind::Budget,
            SkeletonKind::Ordered,
            SkeletonKind::Random,
            SkeletonKind::Indexed,
        ]
    }

    #[test]
    fn test_complete_graph_k5_has_clique_size_5() {
        let graph = complete_graph(5);
        for skeleton in skeletons() {
            assert_eq!(solve(&graph, skeleton), 5, "skeleton {}", skeleton);
        }
    }

    #[test]
    fn test_cycle_c6_has_clique_size_2() {
        let graph = cycle_graph(6);
        for skeleton in skeletons() {
            assert_eq!(solve(&graph, skeleton), 2, "skeleton {}", skeleton);
        }
    }

    #[test]
    fn test_prune_level_matches_plain_bounding() {
        let graph = dimacs::parse(
            "p edge 7 9\ne 1 2\ne 1 3\ne 2 3\ne 3 4\ne 4 5\ne 5 6\ne 4 6\ne 6 7\ne 2 7\n",
        )
        .unwrap();
        let space = Arc::new(CliqueSpace::new(&graph));

        let with_prune = TreeSearch::<_, arbor_core::Maximising>::new(Arc::clone(&space))
            .params(SearchParams::builder().prune_level(true).build())
            .optimise(space.root())
            .unwrap();
        let without_prune = TreeSearch::<_, arbor_core::Maximising>::new(Arc::clone(&space))
            .params(SearchParams::default())
            .optimise(space.root())
            .unwrap();

        assert_eq!(with_prune.objective(), without_prune.objective());
        assert_eq!(with_prune.objective(), 3, "largest cliques are triangles");
    }

    #[test]
    fn test_solution_maps_back_to_input_ids() {
        let graph = complete_graph(4);
        let space = Arc::new(CliqueSpace::new(&graph));
        let outcome = TreeSearch::<_, arbor_core::Maximising>::new(Arc::clone(&space))
            .optimise(space.root())
            .unwrap();

        let mut labels = space.input_labels(outcome.best());
        labels.sort_unstable();
        assert_eq!(labels, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_decision_mode_finds_target_clique() {
        let graph = complete_graph(6);
        let space = Arc::new(CliqueSpace::new(&graph));
        let outcome = TreeSearch::<_, arbor_core::Maximising>::new(Arc::clone(&space))
            .decide(space.root(), 4)
            .unwrap();
        assert!(outcome.satisfied());
        assert!(outcome.objective() >= 4);
    }
}
