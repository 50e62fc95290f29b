//! Julian-day fields.

use chrono::{NaiveDateTime, TimeDelta};
use gf_error::{GfError, ParsingError, Result};
use gf_types::julian::{datetime_to_fractional, fractional_to_datetime, JulianDay};
use gf_types::{parse_instant, Period, Reference, Value};
use std::fmt;
use std::str::FromStr;

use super::{
    encode_mismatch, field_builders, sanitize_time_reference, test_instant, test_period,
    FieldInfo, FieldKind, FilenameField,
};

/// How a julian day is written in a filename.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JulianFormat {
    /// Whole days, e.g. `27028`
    Days,
    /// Days and hours, e.g. `27028_06`
    DaysHours,
    /// Fractional days, e.g. `27028.25`
    Fractional,
}

impl fmt::Display for JulianFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            JulianFormat::Days => "days",
            JulianFormat::DaysHours => "days_hours",
            JulianFormat::Fractional => "fractional",
        })
    }
}

impl FromStr for JulianFormat {
    type Err = GfError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "days" => Ok(JulianFormat::Days),
            "days_hours" => Ok(JulianFormat::DaysHours),
            "fractional" => Ok(JulianFormat::Fractional),
            other => Err(GfError::Config(format!(
                "Unknown julian day format '{other}', acceptable options are \
                 ['days', 'days_hours', 'fractional']"
            ))),
        }
    }
}

/// Conversion between julian-day text and instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JulianCodec {
    pub format: JulianFormat,
    pub reference: NaiveDateTime,
}

impl JulianCodec {
    pub fn new(format: JulianFormat, reference: NaiveDateTime) -> Self {
        Self { format, reference }
    }

    pub fn decode(
        &self,
        field: &str,
        input: &str,
    ) -> std::result::Result<NaiveDateTime, ParsingError> {
        let decoded = match self.format {
            JulianFormat::DaysHours => input.split_once('_').and_then(|(days, hours)| {
                let days = days.parse().ok()?;
                let hours = hours.parse().ok()?;
                JulianDay::new(days, hours, 0).to_datetime(self.reference)
            }),
            JulianFormat::Days => input
                .parse()
                .ok()
                .and_then(|days| JulianDay::new(days, 0, 0).to_datetime(self.reference)),
            JulianFormat::Fractional => input
                .parse()
                .ok()
                .and_then(|days| fractional_to_datetime(days, self.reference)),
        };

        decoded.ok_or_else(|| {
            ParsingError::new(
                input,
                field,
                "julian day",
                format!("not a julian day matching format '{}'", self.format),
            )
        })
    }

    pub fn encode(&self, instant: NaiveDateTime) -> Option<String> {
        match self.format {
            JulianFormat::DaysHours => {
                let julian = JulianDay::from_datetime(instant, self.reference);
                Some(format!("{:05}_{:02}", julian.days, julian.hours))
            }
            JulianFormat::Days => {
                let julian = JulianDay::from_datetime(instant, self.reference);
                Some(format!("{:02}", julian.days))
            }
            JulianFormat::Fractional => {
                datetime_to_fractional(instant, self.reference).map(|days| format!("{days:?}"))
            }
        }
    }
}

fn encode_instant(field: &str, codec: &JulianCodec, instant: NaiveDateTime) -> Result<String> {
    codec.encode(instant).ok_or_else(|| {
        GfError::Generation(format!(
            "Field '{field}' cannot express {instant} as a julian day"
        ))
    })
}

fn parse_reference(input: &str) -> Option<NaiveDateTime> {
    parse_instant(input).ok()
}

/// An instant written as a julian day.
#[derive(Debug, Clone)]
pub struct JulianDayField {
    info: FieldInfo,
    codec: JulianCodec,
}

impl JulianDayField {
    /// Create a field in the `days_hours` format relative to `reference`.
    pub fn new(name: impl Into<String>, reference: NaiveDateTime) -> Self {
        Self {
            info: FieldInfo::new(name),
            codec: JulianCodec::new(JulianFormat::DaysHours, reference),
        }
    }

    pub fn with_format(mut self, format: JulianFormat) -> Self {
        self.codec.format = format;
        self
    }
}

field_builders!(JulianDayField);

impl FilenameField for JulianDayField {
    fn info(&self) -> &FieldInfo {
        &self.info
    }

    fn kind(&self) -> FieldKind {
        FieldKind::DateTime
    }

    fn decode(&self, input: &str) -> std::result::Result<Value, ParsingError> {
        self.codec.decode(self.name(), input).map(Value::DateTime)
    }

    fn encode(&self, value: &Value) -> Result<String> {
        match value {
            Value::DateTime(instant) => encode_instant(self.name(), &self.codec, *instant),
            other => Err(encode_mismatch(self.name(), other)),
        }
    }

    fn sanitize(&self, reference: Reference) -> Result<Reference> {
        sanitize_time_reference(self.name(), self.kind(), reference, parse_reference)
    }

    fn test(&self, reference: &Reference, tested: &Value) -> bool {
        test_instant(reference, tested)
    }

    fn test_description(&self) -> String {
        "As a datetime field, it can be filtered by giving a reference period or datetime. \
         The tested value from the file name is filtered out if it is not included in the \
         reference period or not equal to the reference datetime. References can be given as \
         ISO 8601 strings or bounds of strings."
            .to_string()
    }
}

/// A julian day marking the start of a fixed-length period `[t, t + delta)`.
#[derive(Debug, Clone)]
pub struct JulianDeltaField {
    info: FieldInfo,
    codec: JulianCodec,
    delta: TimeDelta,
    include_stop: bool,
}

impl JulianDeltaField {
    /// Create a field in the `days` format relative to `reference`.
    pub fn new(name: impl Into<String>, reference: NaiveDateTime, delta: TimeDelta) -> Self {
        Self {
            info: FieldInfo::new(name),
            codec: JulianCodec::new(JulianFormat::Days, reference),
            delta,
            include_stop: false,
        }
    }

    pub fn with_format(mut self, format: JulianFormat) -> Self {
        self.codec.format = format;
        self
    }

    pub fn with_include_stop(mut self, include_stop: bool) -> Self {
        self.include_stop = include_stop;
        self
    }
}

field_builders!(JulianDeltaField);

impl FilenameField for JulianDeltaField {
    fn info(&self) -> &FieldInfo {
        &self.info
    }

    fn kind(&self) -> FieldKind {
        FieldKind::Period
    }

    fn decode(&self, input: &str) -> std::result::Result<Value, ParsingError> {
        let start = self.codec.decode(self.name(), input)?;
        let stop = start.checked_add_signed(self.delta).ok_or_else(|| {
            ParsingError::new(input, self.name(), "period", "period end is out of range")
        })?;
        Ok(Value::Period(
            Period::new(start, stop).with_include_stop(self.include_stop),
        ))
    }

    fn encode(&self, value: &Value) -> Result<String> {
        match value {
            Value::Period(period) => encode_instant(self.name(), &self.codec, period.start),
            Value::DateTime(instant) => encode_instant(self.name(), &self.codec, *instant),
            other => Err(encode_mismatch(self.name(), other)),
        }
    }

    fn sanitize(&self, reference: Reference) -> Result<Reference> {
        sanitize_time_reference(self.name(), self.kind(), reference, parse_reference)
    }

    fn test(&self, reference: &Reference, tested: &Value) -> bool {
        test_period(reference, tested)
    }

    fn test_description(&self) -> String {
        "As a period field, it can be filtered by giving a reference period or datetime. The \
         tested value from the file name is filtered out if it does not intersect the reference \
         period or does not contain the reference datetime."
            .to_string()
    }
}
