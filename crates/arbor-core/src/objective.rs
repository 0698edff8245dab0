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

//! # Objective Values and Orderings
//!
//! Objective values are the currency of bounding and incumbent handling.
//! They are signed primitive integers (`i8` through `i64`) that convert
//! losslessly into `i64`, which lets the runtime keep every shared bound in
//! a single `AtomicI64` with a comparator-dependent sentinel for "no bound
//! installed yet".
//!
//! The direction of the search is a zero-sized type implementing
//! [`ObjectiveOrdering`]: [`Maximising`] treats larger objectives as better,
//! [`Minimising`] smaller ones. Making the direction a type parameter keeps
//! the hot comparison monomorphic instead of branching on a runtime flag.

use num_traits::{FromPrimitive, PrimInt, Signed};

/// A trait alias for numeric types that can serve as objectives and bounds.
/// These are the signed integer types `i8`, `i16`, `i32` and `i64`.
///
/// # Note
///
/// `i128` is intentionally excluded: it has no lossless `i64` conversion,
/// and shared bounds are stored as a single atomic `i64` word.
pub trait ObjectiveValue:
    PrimInt
    + Signed
    + FromPrimitive
    + Into<i64>
    + TryFrom<i64>
    + Send
    + Sync
    + std::fmt::Debug
    + std::fmt::Display
    + 'static
{
}

impl<T> ObjectiveValue for T where
    T: PrimInt
        + Signed
        + FromPrimitive
        + Into<i64>
        + TryFrom<i64>
        + Send
        + Sync
        + std::fmt::Debug
        + std::fmt::Display
        + 'static
{
}

/// Converts a raw `i64` bound back into the typed objective.
///
/// Returns `None` when the raw value does not fit `B`, which only happens
/// for the sentinel values of an ordering (a bound that was never updated).
#[inline]
pub fn objective_from_raw<B: ObjectiveValue>(raw: i64) -> Option<B> {
    B::try_from(raw).ok()
}

/// The direction of optimisation, lifted to the type level.
///
/// All comparisons in the runtime go through this trait so that the
/// monotonicity rule (a bound never regresses) is stated exactly once.
pub trait ObjectiveOrdering: Copy + Clone + Default + Send + Sync + 'static {
    /// Human-readable name, used in logs and `Display` impls.
    const NAME: &'static str;

    /// Returns `true` if `candidate` is strictly better than `current`.
    fn better<B: Ord>(candidate: B, current: B) -> bool;

    /// The sentinel representing "no bound installed yet".
    /// Every real objective is strictly better than this value.
    fn worst_raw() -> i64;

    /// Strictly-better on the raw `i64` representation.
    #[inline]
    fn better_raw(candidate: i64, current: i64) -> bool {
        Self::better(candidate, current)
    }

    /// Returns `true` if `candidate` is at least as good as `target`.
    /// This is the decision-mode acceptance test.
    #[inline]
    fn meets<B: Ord>(candidate: B, target: B) -> bool {
        !Self::better(target, candidate)
    }
}

/// Larger objectives win. The default ordering.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Maximising;

impl ObjectiveOrdering for Maximising {
    const NAME: &'static str = "Maximising";

    #[inline]
    fn better<B: Ord>(candidate: B, current: B) -> bool {
        candidate > current
    }

    #[inline]
    fn worst_raw() -> i64 {
        i64::MIN
    }
}

/// Smaller objectives win.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Minimising;

impl ObjectiveOrdering for Minimising {
    const NAME: &'static str = "Minimising";

    #[inline]
    fn better<B: Ord>(candidate: B, current: B) -> bool {
        candidate < current
    }

    #[inline]
    fn worst_raw() -> i64 {
        i64::MAX
    }
}

impl std::fmt::Display for Maximising {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", Self::NAME)
    }
}

impl std::fmt::Display for Minimising {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", Self::NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maximising_prefers_larger() {
        assert!(Maximising::better(5, 3));
        assert!(!Maximising::better(3, 5));
        assert!(!Maximising::better(4, 4));
    }

    #[test]
    fn test_minimising_prefers_smaller() {
        assert!(Minimising::better(3, 5));
        assert!(!Minimising::better(5, 3));
        assert!(!Minimising::better(4, 4));
    }

    #[test]
    fn test_sentinels_are_beaten_by_everything() {
        assert!(Maximising::better_raw(i64::MIN + 1, Maximising::worst_raw()));
        assert!(Minimising::better_raw(i64::MAX - 1, Minimising::worst_raw()));
    }

    #[test]
    fn test_meets_accepts_ties() {
        assert!(Maximising::meets(5, 5));
        assert!(Maximising::meets(6, 5));
        assert!(!Maximising::meets(4, 5));

        assert!(Minimising::meets(5, 5));
        assert!(Minimising::meets(4, 5));
        assert!(!Minimising::meets(6, 5));
    }

    #[test]
    fn test_objective_from_raw_roundtrip() {
        let raw: i64 = 42i32.into();
        assert_eq!(objective_from_raw::<i32>(raw), Some(42));
        // The maximising sentinel does not fit i32 and must not alias a value.
        assert_eq!(objective_from_raw::<i32>(Maximising::worst_raw()), None);
    }
}
