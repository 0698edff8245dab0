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

//! # Generator Stack
//!
//! The per-task stack driving iterative depth-first expansion. Each frame
//! pairs a node with its live generator and the count of children already
//! seen. The capacity is a hard limit declared by the client
//! (`max_stack_depth`): exceeding it fails fast instead of silently
//! growing, because a runaway depth is a modelling error.

use arbor_core::error::SearchError;
use arbor_core::space::{NodeGenerator, SearchSpace};

/// One open node of the depth-first expansion.
pub struct Frame<S: SearchSpace> {
    /// The node being expanded.
    pub node: S::Node,
    /// Its live child generator.
    pub generator: S::Generator,
    /// Children already pulled from the generator.
    pub seen: usize,
}

impl<S: SearchSpace> Frame<S> {
    /// Whether this frame still has unseen children.
    #[inline]
    pub fn is_open(&self) -> bool {
        self.seen < self.generator.num_children()
    }

    /// Marks every remaining child as seen. Used by prune-level.
    #[inline]
    pub fn close(&mut self) {
        self.seen = self.generator.num_children();
    }
}

/// A bounded stack of [`Frame`]s, task-local.
pub struct GeneratorStack<S: SearchSpace> {
    frames: Vec<Frame<S>>,
    limit: usize,
}

impl<S: SearchSpace> GeneratorStack<S> {
    /// Creates an empty stack with the given hard frame limit.
    #[inline]
    pub fn new(limit: usize) -> Self {
        Self {
            frames: Vec::new(),
            limit,
        }
    }

    /// Opens a frame for `node`. Fails fast when the stack is already at
    /// its limit; a stack of exactly `limit` frames is fine.
    pub fn push(&mut self, space: &S, node: S::Node) -> Result<(), SearchError> {
        if self.frames.len() >= self.limit {
            return Err(SearchError::StackOverflow {
                depth: self.frames.len() + 1,
                limit: self.limit,
            });
        }
        let generator = space.generator(&node);
        self.frames.push(Frame {
            node,
            generator,
            seen: 0,
        });
        Ok(())
    }

    /// Closes the deepest frame.
    #[inline]
    pub fn pop(&mut self) -> Option<Frame<S>> {
        self.frames.pop()
    }

    /// The deepest frame.
    #[inline]
    pub fn top_mut(&mut self) -> Option<&mut Frame<S>> {
        self.frames.last_mut()
    }

    /// The frame at position `index` (0 is the task root).
    #[inline]
    pub fn frame_mut(&mut self, index: usize) -> &mut Frame<S> {
        &mut self.frames[index]
    }

    /// Index of the shallowest frame that still has unseen children.
    #[inline]
    pub fn shallowest_open(&self) -> Option<usize> {
        self.frames.iter().position(Frame::is_open)
    }

    /// Number of open frames.
    #[inline]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl<S: SearchSpace> std::fmt::Debug for GeneratorStack<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "GeneratorStack(depth: {}, limit: {})",
            self.frames.len(),
            self.limit
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// An endless chain: every node has exactly one child.
    struct Chain;

    struct One {
        used: bool,
    }

    impl NodeGenerator<Chain> for One {
        fn num_children(&self) -> usize {
            1
        }

        fn next_child(&mut self, _space: &Chain, parent: &u32) -> u32 {
            assert!(!self.used);
            self.used = true;
            parent + 1
        }
    }

    impl SearchSpace for Chain {
        type Node = u32;
        type Objective = i64;
        type Generator = One;

        fn generator(&self, _node: &u32) -> One {
            One { used: false }
        }

        fn objective(&self, node: &u32) -> i64 {
            *node as i64
        }
    }

    #[test]
    fn test_exactly_at_limit_succeeds() {
        let space = Chain;
        let mut stack = GeneratorStack::new(3);
        for node in 0..3 {
            stack.push(&space, node).unwrap();
        }
        assert_eq!(stack.depth(), 3);
    }

    #[test]
    fn test_one_past_limit_fails_fast() {
        let space = Chain;
        let mut stack = GeneratorStack::new(3);
        for node in 0..3 {
            stack.push(&space, node).unwrap();
        }
        let err = stack.push(&space, 3).unwrap_err();
        assert_eq!(err, SearchError::StackOverflow { depth: 4, limit: 3 });
    }

    #[test]
    fn test_frame_open_and_close() {
        let space = Chain;
        let mut stack = GeneratorStack::new(8);
        stack.push(&space, 0).unwrap();

        assert_eq!(stack.shallowest_open(), Some(0));
        let top = stack.top_mut().unwrap();
        assert!(top.is_open());
        top.close();
        assert!(!top.is_open());
        assert_eq!(stack.shallowest_open(), None);

        assert!(stack.pop().is_some());
        assert!(stack.is_empty());
    }
}
