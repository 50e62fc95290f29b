//! Datetime and period fields.

use chrono::{NaiveDateTime, TimeDelta};
use gf_error::{GfError, ParsingError, Result};
use gf_types::{format_datetime, parse_datetime, parse_instant, Period, Reference, Value};

use super::{
    encode_mismatch, field_builders, sanitize_time_reference, test_instant, test_period,
    FieldInfo, FieldKind, FilenameField,
};

fn decode_with_formats(
    field: &str,
    formats: &[String],
    input: &str,
) -> std::result::Result<NaiveDateTime, ParsingError> {
    formats
        .iter()
        .find_map(|format| parse_datetime(input, format))
        .ok_or_else(|| {
            ParsingError::new(
                input,
                field,
                "datetime",
                format!("expected one of the formats {formats:?}"),
            )
        })
}

fn encode_with_format(field: &str, instant: &NaiveDateTime, format: &str) -> Result<String> {
    format_datetime(instant, format).ok_or_else(|| {
        GfError::Generation(format!(
            "Field '{field}' has an invalid date format '{format}'"
        ))
    })
}

/// Reference text is read as ISO 8601 first, then with the field's own formats.
fn parse_reference(formats: &[String], input: &str) -> Option<NaiveDateTime> {
    parse_instant(input)
        .ok()
        .or_else(|| formats.iter().find_map(|format| parse_datetime(input, format)))
}

/// An instant written with one of several strftime formats.
///
/// Decoding tries the formats in order; encoding uses the first one.
#[derive(Debug, Clone)]
pub struct DatetimeField {
    info: FieldInfo,
    formats: Vec<String>,
}

impl DatetimeField {
    pub fn new(name: impl Into<String>, formats: &[&str]) -> Self {
        Self {
            info: FieldInfo::new(name),
            formats: formats.iter().map(|f| f.to_string()).collect(),
        }
    }

    pub fn formats(&self) -> &[String] {
        &self.formats
    }
}

field_builders!(DatetimeField);

impl FilenameField for DatetimeField {
    fn info(&self) -> &FieldInfo {
        &self.info
    }

    fn kind(&self) -> FieldKind {
        FieldKind::DateTime
    }

    fn decode(&self, input: &str) -> std::result::Result<Value, ParsingError> {
        decode_with_formats(self.name(), &self.formats, input).map(Value::DateTime)
    }

    fn encode(&self, value: &Value) -> Result<String> {
        match (value, self.formats.first()) {
            (Value::DateTime(instant), Some(format)) => {
                encode_with_format(self.name(), instant, format)
            }
            (Value::DateTime(_), None) => Err(GfError::Generation(format!(
                "Field '{}' has no date format",
                self.name()
            ))),
            (other, _) => Err(encode_mismatch(self.name(), other)),
        }
    }

    fn sanitize(&self, reference: Reference) -> Result<Reference> {
        sanitize_time_reference(self.name(), self.kind(), reference, |s| {
            parse_reference(&self.formats, s)
        })
    }

    fn test(&self, reference: &Reference, tested: &Value) -> bool {
        test_instant(reference, tested)
    }

    fn test_description(&self) -> String {
        format!(
            "As a datetime field, it can be filtered by giving a reference period or datetime. \
             The tested value from the file name is filtered out if it is not included in the \
             reference period or not equal to the reference datetime. References can be given \
             as ISO 8601 strings, bounds of strings, or strings following the {:?} formatting.",
            self.formats
        )
    }
}

/// Length of the period a [`DateDeltaField`] starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Span {
    Fixed(TimeDelta),
    /// Calendar months: a year folder covers its own year, leap or not.
    Months(u32),
}

impl Span {
    pub fn years(years: u32) -> Self {
        Span::Months(years.saturating_mul(12))
    }

    pub fn end(&self, start: NaiveDateTime) -> Option<NaiveDateTime> {
        match self {
            Span::Fixed(delta) => start.checked_add_signed(*delta),
            Span::Months(months) => start.checked_add_months(chrono::Months::new(*months)),
        }
    }
}

impl From<TimeDelta> for Span {
    fn from(delta: TimeDelta) -> Self {
        Span::Fixed(delta)
    }
}

/// An instant marking the start of a period `[t, t + span)`.
///
/// The stop boundary is excluded unless [`DateDeltaField::with_include_stop`]
/// says otherwise.
#[derive(Debug, Clone)]
pub struct DateDeltaField {
    info: FieldInfo,
    formats: Vec<String>,
    span: Span,
    include_stop: bool,
}

impl DateDeltaField {
    pub fn new(name: impl Into<String>, formats: &[&str], span: impl Into<Span>) -> Self {
        Self {
            info: FieldInfo::new(name),
            formats: formats.iter().map(|f| f.to_string()).collect(),
            span: span.into(),
            include_stop: false,
        }
    }

    pub fn with_include_stop(mut self, include_stop: bool) -> Self {
        self.include_stop = include_stop;
        self
    }
}

field_builders!(DateDeltaField);

impl FilenameField for DateDeltaField {
    fn info(&self) -> &FieldInfo {
        &self.info
    }

    fn kind(&self) -> FieldKind {
        FieldKind::Period
    }

    fn decode(&self, input: &str) -> std::result::Result<Value, ParsingError> {
        let start = decode_with_formats(self.name(), &self.formats, input)?;
        let stop = self.span.end(start).ok_or_else(|| {
            ParsingError::new(input, self.name(), "period", "period end is out of range")
        })?;
        Ok(Value::Period(
            Period::new(start, stop).with_include_stop(self.include_stop),
        ))
    }

    fn encode(&self, value: &Value) -> Result<String> {
        let start = match value {
            Value::Period(period) => period.start,
            Value::DateTime(instant) => *instant,
            other => return Err(encode_mismatch(self.name(), other)),
        };
        match self.formats.first() {
            Some(format) => encode_with_format(self.name(), &start, format),
            None => Err(GfError::Generation(format!(
                "Field '{}' has no date format",
                self.name()
            ))),
        }
    }

    fn sanitize(&self, reference: Reference) -> Result<Reference> {
        sanitize_time_reference(self.name(), self.kind(), reference, |s| {
            parse_reference(&self.formats, s)
        })
    }

    fn test(&self, reference: &Reference, tested: &Value) -> bool {
        test_period(reference, tested)
    }

    fn test_description(&self) -> String {
        format!(
            "As a period field, it can be filtered by giving a reference period or datetime. \
             The tested value from the file name is filtered out if it does not intersect the \
             reference period or does not contain the reference datetime. References can be \
             given as ISO 8601 strings, bounds of strings, or strings following the {:?} \
             formatting.",
            self.formats
        )
    }
}

/// A period written as two formatted dates joined by a separator.
#[derive(Debug, Clone)]
pub struct PeriodField {
    info: FieldInfo,
    format: String,
    separator: String,
}

impl PeriodField {
    pub fn new(name: impl Into<String>, format: impl Into<String>, separator: impl Into<String>) -> Self {
        Self {
            info: FieldInfo::new(name),
            format: format.into(),
            separator: separator.into(),
        }
    }

    /// Split the captured text into its start and stop dates.
    ///
    /// When the separator also appears inside the date format, the middle
    /// occurrence is the one between the two dates.
    fn split<'a>(&self, input: &'a str) -> Option<(&'a str, &'a str)> {
        if self.separator.is_empty() {
            return None;
        }
        if self.format.contains(self.separator.as_str()) {
            let positions: Vec<usize> = input
                .match_indices(self.separator.as_str())
                .map(|(index, _)| index)
                .collect();
            let position = *positions.get(positions.len() / 2)?;
            Some((&input[..position], &input[position + self.separator.len()..]))
        } else {
            let parts: Vec<&str> = input.split(self.separator.as_str()).collect();
            match parts.as_slice() {
                [start, stop] => Some((*start, *stop)),
                _ => None,
            }
        }
    }
}

field_builders!(PeriodField);

impl FilenameField for PeriodField {
    fn info(&self) -> &FieldInfo {
        &self.info
    }

    fn kind(&self) -> FieldKind {
        FieldKind::Period
    }

    fn decode(&self, input: &str) -> std::result::Result<Value, ParsingError> {
        let (start, stop) = self.split(input).ok_or_else(|| {
            ParsingError::new(
                input,
                self.name(),
                "period",
                format!(
                    "it cannot be separated in two begin/end dates using separator '{}'",
                    self.separator
                ),
            )
        })?;

        let parse = |text: &str| {
            parse_datetime(text, &self.format).ok_or_else(|| {
                ParsingError::new(
                    input,
                    self.name(),
                    "period",
                    format!("'{text}' does not follow the format '{}'", self.format),
                )
            })
        };

        Ok(Value::Period(Period::new(parse(start)?, parse(stop)?)))
    }

    fn encode(&self, value: &Value) -> Result<String> {
        match value {
            Value::Period(period) => Ok(format!(
                "{}{}{}",
                encode_with_format(self.name(), &period.start, &self.format)?,
                self.separator,
                encode_with_format(self.name(), &period.stop, &self.format)?
            )),
            other => Err(encode_mismatch(self.name(), other)),
        }
    }

    fn sanitize(&self, reference: Reference) -> Result<Reference> {
        let formats = [self.format.clone()];
        sanitize_time_reference(self.name(), self.kind(), reference, |s| {
            parse_reference(&formats, s)
        })
    }

    fn test(&self, reference: &Reference, tested: &Value) -> bool {
        test_period(reference, tested)
    }

    fn test_description(&self) -> String {
        format!(
            "As a period field, it can be filtered by giving a reference period or datetime. \
             The tested value from the file name is filtered out if it does not intersect the \
             reference period or does not contain the reference datetime. References can be \
             given as ISO 8601 strings, bounds of strings, or strings following the '{}' \
             formatting.",
            self.format
        )
    }
}
