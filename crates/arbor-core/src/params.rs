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

//! # Search Parameters
//!
//! The immutable per-search configuration, replicated into every locality's
//! registry at `search` entry. Most fields only matter to one skeleton;
//! skeleton-specific validation happens at the search entry point before any
//! task is spawned.

use crate::error::SearchError;
use crate::objective::ObjectiveValue;

/// Default hard limit on the per-task generator stack depth.
pub const DEFAULT_MAX_STACK_DEPTH: usize = 5000;

/// Immutable search configuration, replicated on every locality.
///
/// Construct via [`SearchParams::builder`]. Fields are public for read
/// access; they must not change after a search has started.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchParams<B> {
    /// Depth at which subtrees are counted but not expanded. `None`
    /// disables the depth limit. The root sits at depth 0.
    pub max_depth: Option<usize>,
    /// Depth-bounded and ordered skeletons spawn every child generated
    /// while the parent is shallower than this depth.
    pub spawn_depth: usize,
    /// Budget skeleton: number of backtracks before work is offloaded.
    pub backtrack_budget: u64,
    /// Random skeleton: spawn with probability `1/spawn_probability` per
    /// iteration; `0` disables random spawning.
    pub spawn_probability: u64,
    /// Stack-stealing: a steal takes every remaining sibling of the chosen
    /// frame instead of a single one.
    pub steal_all: bool,
    /// Decision mode target. Reaching an objective at least this good stops
    /// the search cluster-wide.
    pub expected_objective: Option<B>,
    /// Bound installed into every registry before the search starts.
    pub initial_bound: Option<B>,
    /// Hard limit on the per-task generator stack depth. Exceeding it is a
    /// fail-fast error, not a silent reallocation.
    pub max_stack_depth: usize,
    /// When one child of a frame is pruned by the bound, prune all its
    /// remaining siblings. Only sound when the client emits children in
    /// monotone bound order.
    pub prune_level: bool,
    /// Ordered skeleton: use accumulated discrepancies as priorities
    /// instead of raw sibling indexes.
    pub discrepancy_order: bool,
}

impl<B> Default for SearchParams<B> {
    fn default() -> Self {
        Self {
            max_depth: None,
            spawn_depth: 1,
            backtrack_budget: 0,
            spawn_probability: 0,
            steal_all: false,
            expected_objective: None,
            initial_bound: None,
            max_stack_depth: DEFAULT_MAX_STACK_DEPTH,
            prune_level: false,
            discrepancy_order: false,
        }
    }
}

impl<B> SearchParams<B>
where
    B: ObjectiveValue,
{
    /// Creates a builder with the default configuration.
    #[inline]
    pub fn builder() -> SearchParamsBuilder<B> {
        SearchParamsBuilder::new()
    }

    /// Checks the skeleton-independent invariants.
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.max_stack_depth == 0 {
            return Err(SearchError::Config(
                "max_stack_depth must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl<B> std::fmt::Display for SearchParams<B>
where
    B: std::fmt::Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let fmt_opt = |o: &Option<B>| match o {
            Some(v) => v.to_string(),
            None => "unset".to_string(),
        };
        write!(
            f,
            "SearchParams(max_depth: {}, spawn_depth: {}, backtrack_budget: {}, spawn_probability: {}, steal_all: {}, expected_objective: {}, initial_bound: {}, max_stack_depth: {}, prune_level: {}, discrepancy_order: {})",
            self.max_depth
                .map(|d| d.to_string())
                .unwrap_or_else(|| "unset".to_string()),
            self.spawn_depth,
            self.backtrack_budget,
            self.spawn_probability,
            self.steal_all,
            fmt_opt(&self.expected_objective),
            fmt_opt(&self.initial_bound),
            self.max_stack_depth,
            self.prune_level,
            self.discrepancy_order,
        )
    }
}

/// Builder for [`SearchParams`].
#[derive(Clone, Debug)]
pub struct SearchParamsBuilder<B> {
    params: SearchParams<B>,
}

impl<B> Default for SearchParamsBuilder<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B> SearchParamsBuilder<B> {
    #[inline]
    pub fn new() -> Self {
        Self {
            params: SearchParams::default(),
        }
    }

    #[inline]
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.params.max_depth = Some(depth);
        self
    }

    #[inline]
    pub fn spawn_depth(mut self, depth: usize) -> Self {
        self.params.spawn_depth = depth;
        self
    }

    #[inline]
    pub fn backtrack_budget(mut self, budget: u64) -> Self {
        self.params.backtrack_budget = budget;
        self
    }

    #[inline]
    pub fn spawn_probability(mut self, denominator: u64) -> Self {
        self.params.spawn_probability = denominator;
        self
    }

    #[inline]
    pub fn steal_all(mut self, steal_all: bool) -> Self {
        self.params.steal_all = steal_all;
        self
    }

    #[inline]
    pub fn expected_objective(mut self, objective: B) -> Self {
        self.params.expected_objective = Some(objective);
        self
    }

    #[inline]
    pub fn initial_bound(mut self, bound: B) -> Self {
        self.params.initial_bound = Some(bound);
        self
    }

    #[inline]
    pub fn max_stack_depth(mut self, depth: usize) -> Self {
        self.params.max_stack_depth = depth;
        self
    }

    #[inline]
    pub fn prune_level(mut self, prune_level: bool) -> Self {
        self.params.prune_level = prune_level;
        self
    }

    #[inline]
    pub fn discrepancy_order(mut self, discrepancy_order: bool) -> Self {
        self.params.discrepancy_order = discrepancy_order;
        self
    }

    #[inline]
    pub fn build(self) -> SearchParams<B> {
        self.params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params: SearchParams<i64> = SearchParams::default();
        assert_eq!(params.max_depth, None);
        assert_eq!(params.spawn_depth, 1);
        assert_eq!(params.backtrack_budget, 0);
        assert_eq!(params.spawn_probability, 0);
        assert!(!params.steal_all);
        assert_eq!(params.max_stack_depth, DEFAULT_MAX_STACK_DEPTH);
        assert!(!params.prune_level);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_builder_sets_all_fields() {
        let params = SearchParams::<i32>::builder()
            .max_depth(7)
            .spawn_depth(3)
            .backtrack_budget(50)
            .spawn_probability(8)
            .steal_all(true)
            .expected_objective(12)
            .initial_bound(4)
            .max_stack_depth(64)
            .prune_level(true)
            .discrepancy_order(true)
            .build();

        assert_eq!(params.max_depth, Some(7));
        assert_eq!(params.spawn_depth, 3);
        assert_eq!(params.backtrack_budget, 50);
        assert_eq!(params.spawn_probability, 8);
        assert!(params.steal_all);
        assert_eq!(params.expected_objective, Some(12));
        assert_eq!(params.initial_bound, Some(4));
        assert_eq!(params.max_stack_depth, 64);
        assert!(params.prune_level);
        assert!(params.discrepancy_order);
    }

    #[test]
    fn test_zero_stack_depth_is_rejected() {
        let params = SearchParams::<i64>::builder().max_stack_depth(0).build();
        assert!(matches!(params.validate(), Err(SearchError::Config(_))));
    }
}
