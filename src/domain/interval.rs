//! Half-open time intervals and the single overlap rule.
//!
//! Every conflict check in the crate goes through
//! [`Interval::overlaps`]. The rule is strict intersection of half-open
//! intervals (`[start, end)`), so back-to-back blocks that share a
//! boundary instant never conflict.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A half-open time interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    /// Inclusive start instant.
    pub start: DateTime<Utc>,
    /// Exclusive end instant.
    pub end: DateTime<Utc>,
}

impl Interval {
    /// Creates an interval without validating ordering.
    ///
    /// Callers that accept external input should check
    /// [`Interval::is_well_formed`] first.
    #[must_use]
    pub const fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Returns true when `end` is strictly after `start`.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        self.end > self.start
    }

    /// Returns true iff the two half-open intervals share any instant.
    ///
    /// Implemented as `self.start < other.end && other.start < self.end`.
    /// Deliberately not inclusive on both ends: a booking ending at `T`
    /// and one starting at `T` are back-to-back, not overlapping.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Returns true when `instant` falls within `[start, end)`.
    #[must_use]
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32, min: u32) -> DateTime<Utc> {
        match Utc.with_ymd_and_hms(2025, 3, 10, hour, min, 0) {
            chrono::LocalResult::Single(t) => t,
            _ => panic!("invalid test timestamp"),
        }
    }

    #[test]
    fn partial_overlap_detected() {
        let a = Interval::new(at(10, 0), at(11, 0));
        let b = Interval::new(at(10, 30), at(11, 30));
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
    }

    #[test]
    fn containment_is_overlap() {
        let outer = Interval::new(at(10, 0), at(12, 0));
        let inner = Interval::new(at(10, 30), at(11, 0));
        assert!(outer.overlaps(&inner));
        assert!(inner.overlaps(&outer));
    }

    #[test]
    fn back_to_back_is_not_overlap() {
        let a = Interval::new(at(10, 0), at(11, 0));
        let b = Interval::new(at(11, 0), at(12, 0));
        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));
    }

    #[test]
    fn disjoint_is_not_overlap() {
        let a = Interval::new(at(9, 0), at(10, 0));
        let b = Interval::new(at(11, 0), at(12, 0));
        assert!(!a.overlaps(&b));
    }

    #[test]
    fn identical_intervals_overlap() {
        let a = Interval::new(at(10, 0), at(11, 0));
        assert!(a.overlaps(&a));
    }

    #[test]
    fn well_formed_requires_strict_order() {
        assert!(Interval::new(at(10, 0), at(10, 30)).is_well_formed());
        assert!(!Interval::new(at(10, 0), at(10, 0)).is_well_formed());
        assert!(!Interval::new(at(11, 0), at(10, 0)).is_well_formed());
    }

    #[test]
    fn contains_is_half_open() {
        let a = Interval::new(at(10, 0), at(11, 0));
        assert!(a.contains(at(10, 0)));
        assert!(a.contains(at(10, 59)));
        assert!(!a.contains(at(11, 0)));
    }
}
