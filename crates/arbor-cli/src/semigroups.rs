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

//! # Numerical Semigroup Enumeration
//!
//! The semigroup tree: the root is the full monoid of the naturals, and a
//! node's children remove one minimal generator larger than the Frobenius
//! number each. Every numerical semigroup of genus g appears exactly once
//! at depth g, so enumerating with a depth limit counts semigroups by
//! genus.
//!
//! A semigroup is represented by a 64-bit membership mask, which covers
//! every element that matters up to well beyond the genus this tool is
//! asked for in practice.

use arbor_core::enumerate::Enumerator;
use arbor_core::space::{NodeGenerator, SearchSpace};

/// The semigroup tree.
pub struct SemigroupSpace;

/// One numerical semigroup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Semigroup {
    /// Bit `i` set means `i` is an element.
    pub elements: u64,
    /// Largest gap; -1 for the full monoid.
    pub frobenius: i32,
    /// Number of gaps.
    pub genus: u32,
}

impl Semigroup {
    /// The full monoid of the naturals: genus 0.
    pub fn naturals() -> Self {
        Self {
            elements: u64::MAX,
            frobenius: -1,
            genus: 0,
        }
    }

    #[inline]
    fn contains(&self, value: i64) -> bool {
        if value < 0 {
            return false;
        }
        debug_assert!((value as u64) < 64, "element beyond the mask width");
        self.elements & (1u64 << value) != 0
    }

    /// Smallest non-zero element.
    #[inline]
    fn multiplicity(&self) -> i64 {
        (self.elements & !1).trailing_zeros() as i64
    }

    /// `candidate` is a minimal generator iff it is not the sum of two
    /// non-zero elements.
    fn is_minimal_generator(&self, candidate: i64) -> bool {
        let mut summand = self.multiplicity();
        while summand * 2 <= candidate {
            if self.contains(summand) && self.contains(candidate - summand) {
                return false;
            }
            summand += 1;
        }
        true
    }

    /// Minimal generators larger than the Frobenius number, ascending.
    /// These are exactly the removals that stay a numerical semigroup and
    /// increase the genus by one.
    fn effective_generators(&self) -> Vec<i64> {
        let multiplicity = self.multiplicity();
        let low = (self.frobenius as i64 + 1).max(1);
        // Anything past frobenius + multiplicity splits as m + (rest in S);
        // the multiplicity itself is only reachable for the full monoid.
        let high = (self.frobenius as i64 + multiplicity).max(multiplicity);

        (low..=high)
            .filter(|&candidate| self.is_minimal_generator(candidate))
            .collect()
    }

    fn remove(&self, generator: i64) -> Semigroup {
        Semigroup {
            elements: self.elements & !(1u64 << generator),
            // The removed generator exceeds every existing gap.
            frobenius: generator as i32,
            genus: self.genus + 1,
        }
    }
}

/// Children are the removals of each effective generator, ascending.
pub struct SemigroupChildren {
    generators: Vec<i64>,
    next: usize,
}

impl NodeGenerator<SemigroupSpace> for SemigroupChildren {
    fn num_children(&self) -> usize {
        self.generators.len()
    }

    fn next_child(&mut self, _space: &SemigroupSpace, parent: &Semigroup) -> Semigroup {
        let generator = self.generators[self.next];
        self.next += 1;
        parent.remove(generator)
    }

    fn nth_child(&mut self, _space: &SemigroupSpace, parent: &Semigroup, index: usize) -> Semigroup {
        parent.remove(self.generators[index])
    }
}

impl SearchSpace for SemigroupSpace {
    type Node = Semigroup;
    type Objective = i64;
    type Generator = SemigroupChildren;

    fn generator(&self, node: &Semigroup) -> SemigroupChildren {
        SemigroupChildren {
            generators: node.effective_generators(),
            next: 0,
        }
    }

    fn objective(&self, node: &Semigroup) -> i64 {
        node.genus as i64
    }
}

/// Counts semigroups per genus, indexed by genus.
#[derive(Clone, Debug, Default)]
pub struct GenusCounts {
    counts: Vec<u64>,
}

impl Enumerator<Semigroup> for GenusCounts {
    type Output = Vec<u64>;

    fn accumulate(&mut self, node: &Semigroup) {
        let genus = node.genus as usize;
        if self.counts.len() <= genus {
            self.counts.resize(genus + 1, 0);
        }
        self.counts[genus] += 1;
    }

    fn combine(&mut self, other: Self) {
        if self.counts.len() < other.counts.len() {
            self.counts.resize(other.counts.len(), 0);
        }
        for (slot, count) in other.counts.into_iter().enumerate() {
            self.counts[slot] += count;
        }
    }

    fn finish(self) -> Vec<u64> {
        self.counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbor_core::params::SearchParams;
    use arbor_runtime::cluster::ClusterSpec;
    use arbor_search::{SkeletonKind, TreeSearch};
    use std::sync::Arc;

    /// Reference counts of numerical semigroups by genus 0..=10.
    const GENUS_COUNTS: [u64; 11] = [1, 1, 2, 4, 7, 12, 23, 39, 67, 118, 204];

    #[test]
    fn test_root_children_are_the_two_smallest_semigroups() {
        let space = SemigroupSpace;
        let root = Semigroup::naturals();
        let mut generator = space.generator(&root);

        // The full monoid has the single minimal generator 1.
        assert_eq!(generator.num_children(), 1);
        let genus_one = generator.next_child(&space, &root);
        assert_eq!(genus_one.genus, 1);
        assert_eq!(genus_one.frobenius, 1);
        assert!(!genus_one.contains(1));

        // Genus 1 has two children: remove 2 or remove 3.
        let mut generator = space.generator(&genus_one);
        assert_eq!(generator.num_children(), 2);
        let first = generator.next_child(&space, &genus_one);
        let second = generator.next_child(&space, &genus_one);
        assert_eq!(first.frobenius, 2);
        assert_eq!(second.frobenius, 3);
    }

    #[test]
    fn test_genus_counts_to_ten() {
        let params = SearchParams::builder().max_depth(10).spawn_depth(3).build();
        let outcome = TreeSearch::<_, arbor_core::Maximising>::new(Arc::new(SemigroupSpace))
            .params(params)
            .cluster(ClusterSpec::new(2).with_workers(2))
            .enumerate::<GenusCounts>(Semigroup::naturals())
            .unwrap();

        assert_eq!(outcome.value().as_slice(), &GENUS_COUNTS[..]);
    }

    #[test]
    fn test_genus_counts_agree_across_skeletons() {
        let params = SearchParams::builder()
            .max_depth(7)
            .spawn_depth(2)
            .backtrack_budget(4)
            .spawn_probability(4)
            .build();

        for skeleton in [
            SkeletonKind::default(),
            SkeletonKind::StackStealing,
            SkeletonKind::Budget,
            SkeletonKind::Ordered,
            SkeletonKind::Random,
            SkeletonKind::Indexed,
        ] {
            let outcome = TreeSearch::<_, arbor_core::Maximising>::new(Arc::new(SemigroupSpace))
                .skeleton(skeleton)
                .params(params.clone())
                .enumerate::<GenusCounts>(Semigroup::naturals())
                .unwrap();
            assert_eq!(
                outcome.value().as_slice(),
                &GENUS_COUNTS[..8],
                "skeleton {} disagrees",
                skeleton
            );
        }
    }
}
