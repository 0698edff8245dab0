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

//! # Cluster Topology
//!
//! A cluster is a set of localities, each with its own registry, workpool
//! and worker threads. The topology is fixed for the lifetime of one
//! `search` call; localities never join or leave mid-search.

use arbor_core::error::SearchError;

/// A typed index for localities.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct LocalityId(usize);

impl LocalityId {
    /// Creates a new locality id.
    #[inline]
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the underlying index.
    #[inline]
    pub fn get(&self) -> usize {
        self.0
    }
}

impl std::fmt::Display for LocalityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "locality-{}", self.0)
    }
}

/// The shape of the simulated cluster for one search.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClusterSpec {
    /// Number of localities. At least 1.
    pub localities: usize,
    /// Worker threads per locality. `None` derives the count from the
    /// machine: all hardware threads but one, and at least one.
    pub workers_per_locality: Option<usize>,
}

impl Default for ClusterSpec {
    fn default() -> Self {
        Self {
            localities: 1,
            workers_per_locality: None,
        }
    }
}

impl ClusterSpec {
    /// A cluster of `localities` localities with derived worker counts.
    #[inline]
    pub fn new(localities: usize) -> Self {
        Self {
            localities,
            workers_per_locality: None,
        }
    }

    /// Sets an explicit worker-thread count per locality.
    #[inline]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers_per_locality = Some(workers);
        self
    }

    /// Worker threads each locality's scheduler will run.
    #[inline]
    pub fn worker_threads(&self) -> usize {
        match self.workers_per_locality {
            Some(workers) => workers.max(1),
            None => {
                let hardware = std::thread::available_parallelism()
                    .map(|n| n.get())
                    .unwrap_or(1);
                hardware.saturating_sub(1).max(1)
            }
        }
    }

    /// Checks the topology invariants.
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.localities == 0 {
            return Err(SearchError::Config(
                "cluster needs at least one locality".to_string(),
            ));
        }
        if self.workers_per_locality == Some(0) {
            return Err(SearchError::Config(
                "each locality needs at least one worker thread".to_string(),
            ));
        }
        Ok(())
    }

    /// All locality ids of this cluster in order.
    #[inline]
    pub fn locality_ids(&self) -> impl Iterator<Item = LocalityId> {
        (0..self.localities).map(LocalityId::new)
    }
}

impl std::fmt::Display for ClusterSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ClusterSpec(localities: {}, workers_per_locality: {})",
            self.localities,
            match self.workers_per_locality {
                Some(w) => w.to_string(),
                None => "auto".to_string(),
            }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locality_id_roundtrip() {
        let id = LocalityId::new(3);
        assert_eq!(id.get(), 3);
        assert_eq!(id.to_string(), "locality-3");
    }

    #[test]
    fn test_default_spec_is_single_locality() {
        let spec = ClusterSpec::default();
        assert_eq!(spec.localities, 1);
        assert!(spec.validate().is_ok());
        assert!(spec.worker_threads() >= 1);
    }

    #[test]
    fn test_zero_localities_rejected() {
        let spec = ClusterSpec {
            localities: 0,
            workers_per_locality: None,
        };
        assert!(spec.validate().is_err());
    }

    #[test]
    fn test_zero_workers_rejected() {
        let spec = ClusterSpec::new(2).with_workers(0);
        assert!(spec.validate().is_err());
    }

    #[test]
    fn test_explicit_worker_count() {
        let spec = ClusterSpec::new(2).with_workers(3);
        assert_eq!(spec.worker_threads(), 3);
        let ids = spec.locality_ids().collect::<Vec<_>>();
        assert_eq!(ids, vec![LocalityId::new(0), LocalityId::new(1)]);
    }
}
