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

//! Synthetic spaces shared by the skeleton integration tests.

use arbor_core::space::{NodeGenerator, SearchSpace};
use arbor_search::{PoolKind, SkeletonKind};

/// A complete binary tree of fixed height with a known optimum.
///
/// Branch 1 appends a one-bit, branch 0 a zero-bit. With `reward_ones` the
/// unique optimum is the all-ones leaf (objective = height); without it the
/// all-zeros leaf — the pure greedy dive, since child 0 comes first.
pub struct BitTree {
    pub height: usize,
    pub bounded: bool,
    pub reward_ones: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BitNode {
    pub depth: usize,
    pub value: u64,
}

pub struct BitChildren {
    count: usize,
    next: u64,
}

impl NodeGenerator<BitTree> for BitChildren {
    fn num_children(&self) -> usize {
        self.count
    }

    fn next_child(&mut self, _space: &BitTree, parent: &BitNode) -> BitNode {
        let bit = self.next;
        self.next += 1;
        BitNode {
            depth: parent.depth + 1,
            value: (parent.value << 1) | bit,
        }
    }
}

impl SearchSpace for BitTree {
    type Node = BitNode;
    type Objective = i64;
    type Generator = BitChildren;

    fn generator(&self, node: &BitNode) -> BitChildren {
        let count = if node.depth < self.height { 2 } else { 0 };
        BitChildren { count, next: 0 }
    }

    fn objective(&self, node: &BitNode) -> i64 {
        let ones = node.value.count_ones() as i64;
        if self.reward_ones {
            ones
        } else {
            node.depth as i64 - ones
        }
    }

    fn upper_bound(&self, node: &BitNode) -> Option<i64> {
        self.bounded
            .then(|| self.objective(node) + (self.height - node.depth) as i64)
    }
}

impl BitTree {
    pub fn root() -> BitNode {
        BitNode { depth: 0, value: 0 }
    }

    /// Node count of the complete tree.
    pub fn total_nodes(height: usize) -> u64 {
        (1u64 << (height + 1)) - 1
    }
}

/// A single chain of the given length; every node has exactly one child.
#[derive(Debug)]
pub struct DeepChain {
    pub length: usize,
}

pub struct ChainChildren {
    count: usize,
}

impl NodeGenerator<DeepChain> for ChainChildren {
    fn num_children(&self) -> usize {
        self.count
    }

    fn next_child(&mut self, _space: &DeepChain, parent: &u32) -> u32 {
        parent + 1
    }
}

impl SearchSpace for DeepChain {
    type Node = u32;
    type Objective = i64;
    type Generator = ChainChildren;

    fn generator(&self, node: &u32) -> ChainChildren {
        let count = if (*node as usize) < self.length { 1 } else { 0 };
        ChainChildren { count }
    }

    fn objective(&self, node: &u32) -> i64 {
        *node as i64
    }
}

/// A tree whose generator panics below depth 2, standing in for a buggy
/// client callback.
#[derive(Debug)]
pub struct PanicTree;

pub struct PanicChildren {
    depth: usize,
    next: u64,
}

impl NodeGenerator<PanicTree> for PanicChildren {
    fn num_children(&self) -> usize {
        2
    }

    fn next_child(&mut self, _space: &PanicTree, parent: &BitNode) -> BitNode {
        if self.depth >= 2 {
            panic!("child generator exploded");
        }
        let bit = self.next;
        self.next += 1;
        BitNode {
            depth: parent.depth + 1,
            value: (parent.value << 1) | bit,
        }
    }
}

impl SearchSpace for PanicTree {
    type Node = BitNode;
    type Objective = i64;
    type Generator = PanicChildren;

    fn generator(&self, node: &BitNode) -> PanicChildren {
        PanicChildren {
            depth: node.depth,
            next: 0,
        }
    }

    fn objective(&self, node: &BitNode) -> i64 {
        node.depth as i64
    }
}

/// Every strategy, including both depth-bounded pool flavours.
pub fn all_skeletons() -> Vec<SkeletonKind> {
    vec![
        SkeletonKind::DepthBounded {
            pool: PoolKind::Depth,
        },
        SkeletonKind::DepthBounded {
            pool: PoolKind::Deque,
        },
        SkeletonKind::StackStealing,
        SkeletonKind::Budget,
        SkeletonKind::Ordered,
        SkeletonKind::Random,
        SkeletonKind::Indexed,
    ]
}
