//! Time periods with independent boundary inclusivity.

use chrono::{NaiveDateTime, TimeDelta};
use serde::Serialize;
use std::fmt;

/// A time interval `[start, stop]` whose boundaries may each be open.
///
/// Both boundaries are inclusive by default. Unbounded sides are represented
/// with [`NaiveDateTime::MIN`] and [`NaiveDateTime::MAX`].
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use gf_types::Period;
///
/// let day = |d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap().and_hms_opt(0, 0, 0).unwrap();
///
/// let january = Period::new(day(1), day(31));
/// assert!(january.contains(day(1)));
///
/// let next = Period::new(day(31), day(31)).with_include_start(false);
/// assert!(!january.with_include_stop(false).intersects(&next));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Period {
    pub start: NaiveDateTime,
    pub stop: NaiveDateTime,
    pub include_start: bool,
    pub include_stop: bool,
}

impl Period {
    /// Create a period including both boundaries.
    pub fn new(start: NaiveDateTime, stop: NaiveDateTime) -> Self {
        Self {
            start,
            stop,
            include_start: true,
            include_stop: true,
        }
    }

    /// Create an inclusive period where a missing side extends to the
    /// minimum or maximum representable instant.
    pub fn unbounded(start: Option<NaiveDateTime>, stop: Option<NaiveDateTime>) -> Self {
        Self::new(
            start.unwrap_or(NaiveDateTime::MIN),
            stop.unwrap_or(NaiveDateTime::MAX),
        )
    }

    /// Set whether the start boundary belongs to the period.
    pub fn with_include_start(mut self, include_start: bool) -> Self {
        self.include_start = include_start;
        self
    }

    /// Set whether the stop boundary belongs to the period.
    pub fn with_include_stop(mut self, include_stop: bool) -> Self {
        self.include_stop = include_stop;
        self
    }

    /// Length of the period.
    pub fn duration(&self) -> TimeDelta {
        self.stop.signed_duration_since(self.start)
    }

    /// Middle of the period, `None` when it cannot be represented.
    pub fn center(&self) -> Option<NaiveDateTime> {
        self.start.checked_add_signed(self.duration() / 2)
    }

    /// Check whether an instant lies in the period, honoring inclusivity.
    pub fn contains(&self, instant: NaiveDateTime) -> bool {
        self.contains_with(instant, true)
    }

    /// Check whether an instant lies in the period.
    ///
    /// With `include_instant` false the instant itself is treated as open, so
    /// touching a boundary never counts even when the boundary is closed.
    pub fn contains_with(&self, instant: NaiveDateTime, include_instant: bool) -> bool {
        let after_start = if self.include_start && include_instant {
            self.start <= instant
        } else {
            self.start < instant
        };
        let before_stop = if self.include_stop && include_instant {
            instant <= self.stop
        } else {
            instant < self.stop
        };
        after_start && before_stop
    }

    /// Check whether two periods share at least one instant.
    ///
    /// Shared boundaries count only when both periods include them.
    pub fn intersects(&self, other: &Period) -> bool {
        if self.is_boundary(other.start) {
            if self.boundary_included(other.start, other.include_start) {
                return true;
            }
            if self.is_boundary(other.stop) {
                return true;
            }
            if self.contains(other.stop) {
                return true;
            }
            return other.contains_with(self.start, self.include_start)
                || other.contains_with(self.stop, self.include_stop);
        }

        if self.is_boundary(other.stop) {
            if self.boundary_included(other.stop, other.include_stop) {
                return true;
            }
            if self.contains(other.start) {
                return true;
            }
            return other.contains_with(self.start, self.include_start)
                || other.contains_with(self.stop, self.include_stop);
        }

        self.contains(other.start)
            || self.contains(other.stop)
            || other.contains_with(self.start, self.include_start)
            || other.contains_with(self.stop, self.include_stop)
    }

    fn is_boundary(&self, instant: NaiveDateTime) -> bool {
        self.start == instant || self.stop == instant
    }

    fn boundary_included(&self, instant: NaiveDateTime, include: bool) -> bool {
        if self.start == instant {
            self.include_start && include
        } else if self.stop == instant {
            self.include_stop && include
        } else {
            false
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}, {}{}",
            if self.include_start { '[' } else { ']' },
            self.start,
            self.stop,
            if self.include_stop { ']' } else { '[' }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_contains_inclusive_boundaries() {
        let period = Period::new(day(1), day(10));
        assert!(period.contains(day(1)));
        assert!(period.contains(day(5)));
        assert!(period.contains(day(10)));
        assert!(!period.contains(day(11)));
    }

    #[test]
    fn test_contains_open_boundaries() {
        let period = Period::new(day(1), day(10))
            .with_include_start(false)
            .with_include_stop(false);
        assert!(!period.contains(day(1)));
        assert!(!period.contains(day(10)));
        assert!(period.contains(day(2)));
    }

    #[test]
    fn test_excluded_stop_rejects_stop_instant() {
        let period = Period::new(day(1), day(10)).with_include_stop(false);
        assert!(!period.contains(day(10)));
        assert!(period.contains(day(9)));
    }

    #[test]
    fn test_contains_with_open_instant() {
        let period = Period::new(day(1), day(10));
        assert!(!period.contains_with(day(1), false));
        assert!(period.contains_with(day(5), false));
    }

    #[test]
    fn test_intersects_overlap() {
        let a = Period::new(day(1), day(10));
        let b = Period::new(day(5), day(15));
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
    }

    #[test]
    fn test_intersects_disjoint() {
        let a = Period::new(day(1), day(4));
        let b = Period::new(day(5), day(15));
        assert!(!a.intersects(&b));
        assert!(!b.intersects(&a));
    }

    #[test]
    fn test_intersects_containment() {
        let outer = Period::new(day(1), day(20));
        let inner = Period::new(day(5), day(6));
        assert!(outer.intersects(&inner));
        assert!(inner.intersects(&outer));
    }

    #[test]
    fn test_touching_boundaries_both_closed() {
        let a = Period::new(day(1), day(5));
        let b = Period::new(day(5), day(10));
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
    }

    #[test]
    fn test_touching_boundaries_one_open() {
        let a = Period::new(day(1), day(5)).with_include_stop(false);
        let b = Period::new(day(5), day(10));
        assert!(!a.intersects(&b));
        assert!(!b.intersects(&a));

        let c = Period::new(day(5), day(10)).with_include_start(false);
        assert!(!Period::new(day(1), day(5)).intersects(&c));
    }

    #[test]
    fn test_identical_open_periods_intersect() {
        let a = Period::new(day(1), day(5))
            .with_include_start(false)
            .with_include_stop(false);
        assert!(a.intersects(&a));
    }

    #[test]
    fn test_instant_period_inside() {
        let a = Period::new(day(1), day(5));
        let instant = Period::new(day(3), day(3));
        assert!(a.intersects(&instant));
        assert!(instant.intersects(&a));
    }

    #[test]
    fn test_unbounded_sides() {
        let since = Period::unbounded(Some(day(3)), None);
        assert!(since.contains(day(30)));
        assert!(!since.contains(day(2)));

        let until = Period::unbounded(None, Some(day(3)));
        assert!(until.contains(day(1)));
        assert!(until.intersects(&Period::new(day(3), day(9))));
    }

    #[test]
    fn test_center() {
        let period = Period::new(day(1), day(3));
        assert_eq!(period.center(), Some(day(2)));
    }

    #[test]
    fn test_display() {
        let period = Period::new(day(1), day(2)).with_include_stop(false);
        assert_eq!(period.to_string(), "[2024-01-01 00:00:00, 2024-01-02 00:00:00[");
    }
}
