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

//! Search outcomes: the best node, the decision verdict, or the combined
//! enumeration, always together with cluster-wide statistics.

use arbor_core::space::SearchSpace;
use arbor_runtime::stats::StatisticsSnapshot;

/// Result of an optimisation search.
#[derive(Clone, Debug)]
pub struct SearchOutcome<S: SearchSpace> {
    best: S::Node,
    objective: S::Objective,
    statistics: StatisticsSnapshot,
    locality_statistics: Vec<StatisticsSnapshot>,
}

impl<S: SearchSpace> SearchOutcome<S> {
    pub(crate) fn new(
        best: S::Node,
        objective: S::Objective,
        statistics: StatisticsSnapshot,
        locality_statistics: Vec<StatisticsSnapshot>,
    ) -> Self {
        Self {
            best,
            objective,
            statistics,
            locality_statistics,
        }
    }

    /// The best node found; the root when nothing beat it.
    #[inline]
    pub fn best(&self) -> &S::Node {
        &self.best
    }

    /// Objective of the best node.
    #[inline]
    pub fn objective(&self) -> S::Objective {
        self.objective
    }

    /// Cluster-wide aggregated statistics.
    #[inline]
    pub fn statistics(&self) -> &StatisticsSnapshot {
        &self.statistics
    }

    /// Per-locality statistics, indexed by locality id.
    #[inline]
    pub fn locality_statistics(&self) -> &[StatisticsSnapshot] {
        &self.locality_statistics
    }

    /// Consumes the outcome, returning the best node.
    #[inline]
    pub fn into_best(self) -> S::Node {
        self.best
    }
}

impl<S: SearchSpace> std::fmt::Display for SearchOutcome<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "SearchOutcome(objective: {}, {})",
            self.objective, self.statistics
        )
    }
}

/// Result of a decision search.
#[derive(Clone, Debug)]
pub struct DecisionOutcome<S: SearchSpace> {
    best: S::Node,
    objective: S::Objective,
    satisfied: bool,
    statistics: StatisticsSnapshot,
    locality_statistics: Vec<StatisticsSnapshot>,
}

impl<S: SearchSpace> DecisionOutcome<S> {
    pub(crate) fn new(
        best: S::Node,
        objective: S::Objective,
        satisfied: bool,
        statistics: StatisticsSnapshot,
        locality_statistics: Vec<StatisticsSnapshot>,
    ) -> Self {
        Self {
            best,
            objective,
            satisfied,
            statistics,
            locality_statistics,
        }
    }

    /// The satisfying node if the target was met, otherwise the best found
    /// by the (then exhaustive) search.
    #[inline]
    pub fn best(&self) -> &S::Node {
        &self.best
    }

    #[inline]
    pub fn objective(&self) -> S::Objective {
        self.objective
    }

    /// Whether the expected objective was reached.
    #[inline]
    pub fn satisfied(&self) -> bool {
        self.satisfied
    }

    #[inline]
    pub fn statistics(&self) -> &StatisticsSnapshot {
        &self.statistics
    }

    #[inline]
    pub fn locality_statistics(&self) -> &[StatisticsSnapshot] {
        &self.locality_statistics
    }

    #[inline]
    pub fn into_best(self) -> S::Node {
        self.best
    }
}

impl<S: SearchSpace> std::fmt::Display for DecisionOutcome<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "DecisionOutcome(satisfied: {}, objective: {}, {})",
            self.satisfied, self.objective, self.statistics
        )
    }
}

/// Result of an enumeration search.
#[derive(Clone, Debug)]
pub struct EnumerationOutcome<T> {
    value: T,
    statistics: StatisticsSnapshot,
    locality_statistics: Vec<StatisticsSnapshot>,
}

impl<T> EnumerationOutcome<T> {
    pub(crate) fn new(
        value: T,
        statistics: StatisticsSnapshot,
        locality_statistics: Vec<StatisticsSnapshot>,
    ) -> Self {
        Self {
            value,
            statistics,
            locality_statistics,
        }
    }

    /// The combined enumeration value.
    #[inline]
    pub fn value(&self) -> &T {
        &self.value
    }

    #[inline]
    pub fn statistics(&self) -> &StatisticsSnapshot {
        &self.statistics
    }

    #[inline]
    pub fn locality_statistics(&self) -> &[StatisticsSnapshot] {
        &self.locality_statistics
    }

    #[inline]
    pub fn into_value(self) -> T {
        self.value
    }
}

impl<T: std::fmt::Display> std::fmt::Display for EnumerationOutcome<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "EnumerationOutcome(value: {}, {})",
            self.value, self.statistics
        )
    }
}
