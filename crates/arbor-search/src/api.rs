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

//! # TreeSearch: the programmer API
//!
//! One builder configures a search — space, skeleton, parameters, cluster
//! shape, monitor — and its three terminal operations select what comes
//! back: the optimum, a decision verdict, or a combined enumeration.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use arbor_core::{CountNodes, SearchParams};
//! use arbor_search::{SkeletonKind, TreeSearch};
//! use std::sync::Arc;
//!
//! let search = TreeSearch::<MySpace>::new(Arc::new(space))
//!     .skeleton(SkeletonKind::StackStealing)
//!     .params(SearchParams::builder().steal_all(true).build());
//!
//! let outcome = search.optimise(root)?;
//! println!("best objective: {}", outcome.objective());
//! ```

use crate::driver;
use crate::monitor::{NoOpMonitor, SearchMonitor};
use crate::result::{DecisionOutcome, EnumerationOutcome, SearchOutcome};
use crate::skeleton::{SearchMode, SkeletonKind};
use arbor_core::enumerate::{CountNodes, Enumerator};
use arbor_core::error::SearchError;
use arbor_core::objective::{objective_from_raw, Maximising, ObjectiveOrdering};
use arbor_core::params::SearchParams;
use arbor_core::space::SearchSpace;
use arbor_runtime::cluster::ClusterSpec;
use std::marker::PhantomData;
use std::sync::Arc;

/// A configured tree search over space `S` with objective ordering `O`.
///
/// The ordering defaults to [`Maximising`]; minimisation problems pick
/// [`arbor_core::Minimising`] as the second type parameter.
pub struct TreeSearch<S, O = Maximising>
where
    S: SearchSpace,
    O: ObjectiveOrdering,
{
    space: Arc<S>,
    skeleton: SkeletonKind,
    params: SearchParams<S::Objective>,
    cluster: ClusterSpec,
    monitor: Arc<dyn SearchMonitor<S::Node>>,
    _ordering: PhantomData<O>,
}

impl<S, O> TreeSearch<S, O>
where
    S: SearchSpace,
    O: ObjectiveOrdering,
{
    /// Creates a search with the default skeleton (depth-bounded on a
    /// depth pool), default parameters and a single-locality cluster.
    pub fn new(space: Arc<S>) -> Self {
        Self {
            space,
            skeleton: SkeletonKind::default(),
            params: SearchParams::default(),
            cluster: ClusterSpec::default(),
            monitor: Arc::new(NoOpMonitor),
            _ordering: PhantomData,
        }
    }

    /// Selects the search strategy.
    pub fn skeleton(mut self, skeleton: SkeletonKind) -> Self {
        self.skeleton = skeleton;
        self
    }

    /// Sets the search parameters.
    pub fn params(mut self, params: SearchParams<S::Objective>) -> Self {
        self.params = params;
        self
    }

    /// Sets the simulated cluster shape.
    pub fn cluster(mut self, cluster: ClusterSpec) -> Self {
        self.cluster = cluster;
        self
    }

    /// Attaches a monitor observing the run.
    pub fn monitor(mut self, monitor: Arc<dyn SearchMonitor<S::Node>>) -> Self {
        self.monitor = monitor;
        self
    }

    /// Finds the best node under the ordering. For a childless root the
    /// root itself is the answer.
    pub fn optimise(&self, root: S::Node) -> Result<SearchOutcome<S>, SearchError> {
        let fallback = root.clone();
        let raw = driver::run::<S, O, CountNodes>(
            Arc::clone(&self.space),
            root,
            self.params.clone(),
            self.skeleton,
            SearchMode::Optimisation,
            self.cluster,
            Arc::clone(&self.monitor),
        )?;

        let (best, objective_raw) = raw
            .best
            .unwrap_or_else(|| {
                let objective = self.space.objective(&fallback).into();
                (fallback, objective)
            });
        let objective = objective_from_raw::<S::Objective>(objective_raw)
            .unwrap_or_else(|| self.space.objective(&best));

        Ok(SearchOutcome::new(
            best,
            objective,
            raw.statistics,
            raw.locality_statistics,
        ))
    }

    /// Searches until a node with an objective at least `expected` (under
    /// the ordering) is found, or the tree is exhausted. An unreachable
    /// target degrades to an exhaustive optimisation.
    pub fn decide(
        &self,
        root: S::Node,
        expected: S::Objective,
    ) -> Result<DecisionOutcome<S>, SearchError> {
        let fallback = root.clone();
        let mut params = self.params.clone();
        params.expected_objective = Some(expected);

        let raw = driver::run::<S, O, CountNodes>(
            Arc::clone(&self.space),
            root,
            params,
            self.skeleton,
            SearchMode::Decision,
            self.cluster,
            Arc::clone(&self.monitor),
        )?;

        let (best, objective_raw) = raw
            .best
            .unwrap_or_else(|| {
                let objective = self.space.objective(&fallback).into();
                (fallback, objective)
            });
        let objective = objective_from_raw::<S::Objective>(objective_raw)
            .unwrap_or_else(|| self.space.objective(&best));
        let satisfied = O::meets(objective_raw, expected.into());

        Ok(DecisionOutcome::new(
            best,
            objective,
            satisfied,
            raw.statistics,
            raw.locality_statistics,
        ))
    }

    /// Folds every node of the tree (to `max_depth`, when set) into the
    /// enumerator `E` and returns the combined value.
    pub fn enumerate<E>(&self, root: S::Node) -> Result<EnumerationOutcome<E::Output>, SearchError>
    where
        E: Enumerator<S::Node>,
    {
        let raw = driver::run::<S, O, E>(
            Arc::clone(&self.space),
            root,
            self.params.clone(),
            self.skeleton,
            SearchMode::Enumeration,
            self.cluster,
            Arc::clone(&self.monitor),
        )?;

        Ok(EnumerationOutcome::new(
            raw.enumerator.finish(),
            raw.statistics,
            raw.locality_statistics,
        ))
    }
}

impl<S, O> std::fmt::Debug for TreeSearch<S, O>
where
    S: SearchSpace,
    O: ObjectiveOrdering,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TreeSearch")
            .field("skeleton", &self.skeleton)
            .field("cluster", &self.cluster)
            .field("ordering", &O::NAME)
            .finish()
    }
}
