//! Julian-day arithmetic relative to a reference epoch.
//!
//! Filenames encode dates either as whole days, days plus hours, or
//! fractional days elapsed since a reference date (1950-01-01 for most
//! altimetry products).

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};

const MICROSECONDS_PER_DAY: f64 = 86_400_000_000.0;

/// The CNES julian-day epoch, 1950-01-01T00:00:00.
pub fn cnes_reference() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1950, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or(NaiveDateTime::MIN)
}

/// A julian date split into whole days, hours and seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JulianDay {
    pub days: i64,
    pub hours: i64,
    pub seconds: i64,
}

impl JulianDay {
    pub fn new(days: i64, hours: i64, seconds: i64) -> Self {
        Self {
            days,
            hours,
            seconds,
        }
    }

    /// Convert to an instant, `None` on overflow.
    pub fn to_datetime(self, reference: NaiveDateTime) -> Option<NaiveDateTime> {
        let offset = TimeDelta::try_days(self.days)?
            .checked_add(&TimeDelta::try_hours(self.hours)?)?
            .checked_add(&TimeDelta::try_seconds(self.seconds)?)?;
        reference.checked_add_signed(offset)
    }

    /// Split the time elapsed since `reference`. Days are floored so an
    /// instant before the epoch still yields non-negative hours and seconds.
    pub fn from_datetime(instant: NaiveDateTime, reference: NaiveDateTime) -> Self {
        let elapsed = instant.signed_duration_since(reference).num_seconds();
        let days = elapsed.div_euclid(86_400);
        let remainder = elapsed.rem_euclid(86_400);
        Self {
            days,
            hours: remainder / 3_600,
            seconds: remainder % 3_600,
        }
    }
}

/// Convert fractional days elapsed since `reference` to an instant.
pub fn fractional_to_datetime(days: f64, reference: NaiveDateTime) -> Option<NaiveDateTime> {
    if !days.is_finite() {
        return None;
    }
    let micros = (days * MICROSECONDS_PER_DAY).round();
    if micros.abs() >= i64::MAX as f64 {
        return None;
    }
    reference.checked_add_signed(TimeDelta::microseconds(micros as i64))
}

/// Fractional days elapsed since `reference`.
pub fn datetime_to_fractional(instant: NaiveDateTime, reference: NaiveDateTime) -> Option<f64> {
    instant
        .signed_duration_since(reference)
        .num_microseconds()
        .map(|micros| micros as f64 / MICROSECONDS_PER_DAY)
}
