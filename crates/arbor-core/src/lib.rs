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

//! Arbor-Core: contracts for parallel tree search
//!
//! Foundation crate of the arbor workspace. It defines the vocabulary every
//! other crate speaks: the user-facing search-space and generator contracts,
//! objective values and orderings, search parameters, the enumeration
//! contract, and the shared error type.
//!
//! Core flow
//! - Implement [`space::SearchSpace`] (and its [`space::NodeGenerator`]) for
//!   your problem.
//! - Pick an [`objective::ObjectiveOrdering`] (maximise or minimise).
//! - Configure a [`params::SearchParams`] via its builder.
//! - Hand everything to a skeleton in `arbor-search`.
//!
//! Design highlights
//! - Objective values are signed primitive integers convertible to `i64`,
//!   so shared bounds can live in a single atomic word.
//! - Generators are lazy and owned by one task at a time; random access
//!   (`nth_child`) is only required by the indexed strategies and has a
//!   sequential default.

pub mod enumerate;
pub mod error;
pub mod objective;
pub mod params;
pub mod space;

pub use enumerate::{CollectNodes, CountNodes, Enumerator};
pub use error::SearchError;
pub use objective::{objective_from_raw, Maximising, Minimising, ObjectiveOrdering, ObjectiveValue};
pub use params::{SearchParams, SearchParamsBuilder};
pub use space::{NodeGenerator, SearchSpace};
