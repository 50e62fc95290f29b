//! Typed filename fields.
//!
//! A field turns the text captured by a named regex group into a [`Value`],
//! turns a value back into text for filename generation, and decides whether
//! a decoded value passes a caller [`Reference`].

use chrono::NaiveDateTime;
use gf_error::{GfError, ParsingError, Result};
use gf_types::{Period, Reference, Value};
use std::fmt;

mod enumeration;
mod julian;
mod numeric;
mod temporal;
mod text;
mod version;

pub use enumeration::{CaseType, EnumField};
pub use julian::{JulianCodec, JulianDayField, JulianDeltaField, JulianFormat};
pub use numeric::{FloatField, IntegerField};
pub use temporal::{DateDeltaField, DatetimeField, PeriodField, Span};
pub use text::StringField;
pub use version::{L2Version, L2VersionField, Timeliness};

/// The type of value a field decodes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    String,
    Integer,
    Float,
    Enum,
    DateTime,
    Period,
}

impl FieldKind {
    /// Whether references for this field are times or periods.
    pub fn is_temporal(&self) -> bool {
        matches!(self, FieldKind::DateTime | FieldKind::Period)
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldKind::String => "string",
            FieldKind::Integer => "integer",
            FieldKind::Float => "float",
            FieldKind::Enum => "enum",
            FieldKind::DateTime => "datetime",
            FieldKind::Period => "period",
        };
        f.write_str(name)
    }
}

/// Attributes shared by every field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldInfo {
    /// Name of the field, identical to its regex group name
    pub name: String,
    /// Value used when the group does not participate in the match
    pub default: Option<Value>,
    /// Free-text description
    pub description: String,
}

impl FieldInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default: None,
            description: String::new(),
        }
    }
}

/// A typed field of a filename convention.
pub trait FilenameField: fmt::Debug + Send + Sync {
    /// Shared attributes (name, default, description).
    fn info(&self) -> &FieldInfo;

    /// Type of the decoded values.
    fn kind(&self) -> FieldKind;

    /// Convert a captured group into a value.
    fn decode(&self, input: &str) -> std::result::Result<Value, ParsingError>;

    /// Convert a value into its filename text.
    fn encode(&self, value: &Value) -> Result<String>;

    /// Normalize a caller reference into the shape [`FilenameField::test`] expects.
    ///
    /// Fails with [`GfError::FileListing`] when the reference cannot be
    /// tested against this field.
    fn sanitize(&self, reference: Reference) -> Result<Reference>;

    /// Check a decoded value against a sanitized reference.
    fn test(&self, reference: &Reference, tested: &Value) -> bool;

    /// How the field can be filtered.
    fn test_description(&self) -> String;

    fn name(&self) -> &str {
        &self.info().name
    }

    fn default_value(&self) -> Option<&Value> {
        self.info().default.as_ref()
    }

    /// Field description followed by its filtering description.
    fn description(&self) -> String {
        let description = self.info().description.trim();
        if description.is_empty() {
            self.test_description()
        } else {
            format!("{description} {}", self.test_description())
        }
    }
}

/// Builder setters shared by every field type.
macro_rules! field_builders {
    ($field:ty) => {
        impl $field {
            /// Set the value used when the group does not participate in the match.
            pub fn with_default(mut self, default: impl Into<gf_types::Value>) -> Self {
                self.info.default = Some(default.into());
                self
            }

            /// Set the field description.
            pub fn with_description(mut self, description: impl Into<String>) -> Self {
                self.info.description = description.into();
                self
            }
        }
    };
}
pub(crate) use field_builders;

pub(crate) fn encode_mismatch(field: &str, value: &Value) -> GfError {
    GfError::Generation(format!(
        "Field '{field}' cannot encode a {} value ('{value}')",
        value.type_name()
    ))
}

pub(crate) fn unsupported_reference(field: &str, kind: FieldKind, reference: &Reference) -> GfError {
    GfError::FileListing(format!(
        "Field '{field}' ({kind}) cannot be filtered with a {} reference ('{reference}')",
        reference.shape()
    ))
}

/// Normalize a reference for a datetime or period field.
///
/// Bounds become an inclusive [`Period`] (a missing side is unbounded) and
/// strings become instants. `parse` converts text into an instant.
pub(crate) fn sanitize_time_reference<F>(
    field: &str,
    kind: FieldKind,
    reference: Reference,
    parse: F,
) -> Result<Reference>
where
    F: Fn(&str) -> Option<NaiveDateTime>,
{
    let to_instant = |value: Value| -> Result<NaiveDateTime> {
        match value {
            Value::DateTime(dt) => Ok(dt),
            Value::Str(s) => parse(&s).ok_or_else(|| {
                GfError::FileListing(format!(
                    "Reference '{s}' for field '{field}' is not a valid date"
                ))
            }),
            other => Err(GfError::FileListing(format!(
                "Field '{field}' ({kind}) cannot be filtered with a {} bound ('{other}')",
                other.type_name()
            ))),
        }
    };

    match reference {
        Reference::Bounds(start, stop) => {
            let start = start.map(&to_instant).transpose()?;
            let stop = stop.map(&to_instant).transpose()?;
            Ok(Reference::Period(Period::unbounded(start, stop)))
        }
        Reference::Value(Value::Period(period)) => Ok(Reference::Period(period)),
        Reference::Value(value) => Ok(Reference::Value(Value::DateTime(to_instant(value)?))),
        Reference::Period(period) => Ok(Reference::Period(period)),
        other => Err(unsupported_reference(field, kind, &other)),
    }
}

/// Test an instant value: inside a reference period, or equal to a reference instant.
pub(crate) fn test_instant(reference: &Reference, tested: &Value) -> bool {
    let Some(instant) = tested.as_datetime() else {
        return false;
    };
    match reference {
        Reference::Period(period) => period.contains(instant),
        Reference::Value(Value::DateTime(expected)) => *expected == instant,
        _ => false,
    }
}

/// Test a period value: intersecting a reference period, or containing a reference instant.
pub(crate) fn test_period(reference: &Reference, tested: &Value) -> bool {
    let Some(period) = tested.as_period() else {
        return false;
    };
    match reference {
        Reference::Period(other) => period.intersects(other),
        Reference::Value(Value::DateTime(instant)) => period.contains(*instant),
        _ => false,
    }
}
