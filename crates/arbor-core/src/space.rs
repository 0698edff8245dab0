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

//! # Search Space and Node Generators
//!
//! The two contracts a client implements to drive a search. A
//! [`SearchSpace`] is the immutable problem description shared by every
//! locality; its nodes are snapshots of partial solutions. A
//! [`NodeGenerator`] is the lazy child sequence of one node, owned by
//! exactly one task and never shared between threads.
//!
//! ## Usage
//!
//! ```rust
//! use arbor_core::space::{NodeGenerator, SearchSpace};
//!
//! /// Counts all bit strings of a fixed width.
//! struct BitStrings {
//!     width: usize,
//! }
//!
//! #[derive(Clone)]
//! struct BitNode {
//!     bits: u64,
//!     depth: usize,
//! }
//!
//! struct BitChildren {
//!     next: usize,
//!     count: usize,
//! }
//!
//! impl NodeGenerator<BitStrings> for BitChildren {
//!     fn num_children(&self) -> usize {
//!         self.count
//!     }
//!
//!     fn next_child(&mut self, _space: &BitStrings, parent: &BitNode) -> BitNode {
//!         let bit = self.next as u64;
//!         self.next += 1;
//!         BitNode {
//!             bits: (parent.bits << 1) | bit,
//!             depth: parent.depth + 1,
//!         }
//!     }
//! }
//!
//! impl SearchSpace for BitStrings {
//!     type Node = BitNode;
//!     type Objective = i64;
//!     type Generator = BitChildren;
//!
//!     fn generator(&self, node: &BitNode) -> BitChildren {
//!         let count = if node.depth < self.width { 2 } else { 0 };
//!         BitChildren { next: 0, count }
//!     }
//!
//!     fn objective(&self, node: &BitNode) -> i64 {
//!         node.bits.count_ones() as i64
//!     }
//! }
//! ```

use crate::objective::ObjectiveValue;

/// A user-defined combinatorial state space.
///
/// The space itself is shared read-only across every worker thread and
/// locality; all search state lives in the nodes.
pub trait SearchSpace: Send + Sync + Sized + 'static {
    /// A point in the search tree: solution-so-far plus remaining candidates.
    type Node: Clone + Send + Sync + 'static;

    /// The objective (and bound) value type.
    type Objective: ObjectiveValue;

    /// The lazy child sequence of a node.
    type Generator: NodeGenerator<Self>;

    /// Creates a fresh generator for the children of `node`.
    fn generator(&self, node: &Self::Node) -> Self::Generator;

    /// The objective value of `node` as a standalone (partial) solution.
    fn objective(&self, node: &Self::Node) -> Self::Objective;

    /// An optimistic bound on the best objective reachable in the subtree
    /// below `node`, or `None` when the space has no bounding function.
    ///
    /// For a maximising search this is an upper bound, for a minimising
    /// search a lower bound. Returning `None` disables bound pruning.
    #[inline]
    fn upper_bound(&self, node: &Self::Node) -> Option<Self::Objective> {
        let _ = node;
        None
    }
}

/// The lazy child sequence of one node.
///
/// Generators are created per node, owned by a single task, and are not
/// thread-safe. `next_child` may be called at most `num_children` times.
pub trait NodeGenerator<S: SearchSpace>: Send + 'static {
    /// Number of children this generator will produce.
    fn num_children(&self) -> usize;

    /// Returns the next unseen child.
    ///
    /// # Panics
    ///
    /// Implementations may panic when called more than `num_children` times.
    fn next_child(&mut self, space: &S, parent: &S::Node) -> S::Node;

    /// Returns the `index`-th child of a *fresh* generator.
    ///
    /// Required by the indexed strategies, which reconstruct nodes from
    /// paths of child indexes. The default advances the sequential iterator,
    /// so it is only valid on a generator whose `next_child` has not been
    /// called yet; spaces with cheap random access should override it.
    fn nth_child(&mut self, space: &S, parent: &S::Node, index: usize) -> S::Node {
        debug_assert!(
            index < self.num_children(),
            "called `NodeGenerator::nth_child` with index out of bounds: the child count is {} but the index is {}",
            self.num_children(),
            index
        );

        for _ in 0..index {
            let _ = self.next_child(space, parent);
        }
        self.next_child(space, parent)
    }
}
