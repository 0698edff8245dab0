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

//! # Enumeration Accumulators
//!
//! In enumeration mode every task folds the nodes it visits into a local
//! accumulator; accumulators are merged per locality and finally combined
//! across the cluster. The contract mirrors a commutative monoid: the order
//! in which tasks contribute must not change the final value.

/// A per-task accumulator over visited nodes.
///
/// `Default` is the identity element; `combine` merges two partial
/// accumulations; `finish` extracts the final value.
pub trait Enumerator<N>: Default + Send + 'static {
    /// The combined result type returned to the caller.
    type Output;

    /// Folds a single visited node into this accumulator.
    fn accumulate(&mut self, node: &N);

    /// Merges another partial accumulation into this one.
    fn combine(&mut self, other: Self);

    /// Extracts the final value.
    fn finish(self) -> Self::Output;
}

/// The identity enumerator: counts visited nodes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CountNodes {
    count: u64,
}

impl CountNodes {
    /// Current count of this partial accumulation.
    #[inline]
    pub fn count(&self) -> u64 {
        self.count
    }
}

impl<N> Enumerator<N> for CountNodes {
    type Output = u64;

    #[inline]
    fn accumulate(&mut self, _node: &N) {
        self.count += 1;
    }

    #[inline]
    fn combine(&mut self, other: Self) {
        self.count += other.count;
    }

    #[inline]
    fn finish(self) -> u64 {
        self.count
    }
}

impl std::fmt::Display for CountNodes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CountNodes({})", self.count)
    }
}

/// Gathers every visited node. Mostly a test aid; the combined order is
/// unspecified.
#[derive(Clone, Debug)]
pub struct CollectNodes<N> {
    nodes: Vec<N>,
}

impl<N> Default for CollectNodes<N> {
    fn default() -> Self {
        Self { nodes: Vec::new() }
    }
}

impl<N> Enumerator<N> for CollectNodes<N>
where
    N: Clone + Send + 'static,
{
    type Output = Vec<N>;

    #[inline]
    fn accumulate(&mut self, node: &N) {
        self.nodes.push(node.clone());
    }

    #[inline]
    fn combine(&mut self, mut other: Self) {
        self.nodes.append(&mut other.nodes);
    }

    #[inline]
    fn finish(self) -> Vec<N> {
        self.nodes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_nodes_accumulate_and_combine() {
        let mut a = CountNodes::default();
        let mut b = CountNodes::default();

        for i in 0..5 {
            Enumerator::<i32>::accumulate(&mut a, &i);
        }
        for i in 0..3 {
            Enumerator::<i32>::accumulate(&mut b, &i);
        }

        Enumerator::<i32>::combine(&mut a, b);
        assert_eq!(a.count(), 8);
        assert_eq!(<CountNodes as Enumerator<i32>>::finish(a), 8);
    }

    #[test]
    fn test_collect_nodes_keeps_everything() {
        let mut a = CollectNodes::<u32>::default();
        let mut b = CollectNodes::<u32>::default();

        a.accumulate(&1);
        a.accumulate(&2);
        b.accumulate(&3);

        a.combine(b);
        let mut got = a.finish();
        got.sort_unstable();
        assert_eq!(got, vec![1, 2, 3]);
    }

    #[test]
    fn test_default_is_identity() {
        let mut a = CountNodes::default();
        Enumerator::<i32>::accumulate(&mut a, &0);
        let before = a.count();
        Enumerator::<i32>::combine(&mut a, CountNodes::default());
        assert_eq!(a.count(), before);
    }
}
