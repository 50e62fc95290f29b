//! Filter references.

use chrono::NaiveDateTime;
use std::fmt;
use std::ops::Range;

use crate::{Period, Value};

/// A reference a decoded field value is tested against.
///
/// References are given loosely by callers (strings from a command line,
/// scalars from a configuration file) and normalized by the field they target
/// before any test is run.
#[derive(Debug, Clone, PartialEq)]
pub enum Reference {
    /// Equality with a single value
    Value(Value),
    /// Membership in a collection of values
    List(Vec<Value>),
    /// Half-open integer range `[start, stop)`
    Range { start: i64, stop: i64 },
    /// Raw bounds, either side optional, turned into a typed reference by the field
    Bounds(Option<Value>, Option<Value>),
    /// Intersection with a time period
    Period(Period),
}

impl Reference {
    /// Bounds on both sides.
    pub fn between(start: impl Into<Value>, stop: impl Into<Value>) -> Self {
        Reference::Bounds(Some(start.into()), Some(stop.into()))
    }

    /// Bounds with only a lower side.
    pub fn from_start(start: impl Into<Value>) -> Self {
        Reference::Bounds(Some(start.into()), None)
    }

    /// Bounds with only an upper side.
    pub fn until(stop: impl Into<Value>) -> Self {
        Reference::Bounds(None, Some(stop.into()))
    }

    /// The single value of a scalar reference.
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Reference::Value(v) => Some(v),
            _ => None,
        }
    }

    /// Short name of the reference shape, used in error messages.
    pub fn shape(&self) -> &'static str {
        match self {
            Reference::Value(_) => "single value",
            Reference::List(_) => "list",
            Reference::Range { .. } => "range",
            Reference::Bounds(..) => "bounds",
            Reference::Period(_) => "period",
        }
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reference::Value(v) => write!(f, "{v}"),
            Reference::List(values) => {
                let joined: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                write!(f, "[{}]", joined.join(", "))
            }
            Reference::Range { start, stop } => write!(f, "{start}..{stop}"),
            Reference::Bounds(start, stop) => {
                let side = |v: &Option<Value>| v.as_ref().map(|v| v.to_string()).unwrap_or_default();
                write!(f, "{}..{}", side(start), side(stop))
            }
            Reference::Period(p) => write!(f, "{p}"),
        }
    }
}

impl From<Value> for Reference {
    fn from(value: Value) -> Self {
        Reference::Value(value)
    }
}

impl From<&str> for Reference {
    fn from(value: &str) -> Self {
        Reference::Value(value.into())
    }
}

impl From<String> for Reference {
    fn from(value: String) -> Self {
        Reference::Value(value.into())
    }
}

impl From<i64> for Reference {
    fn from(value: i64) -> Self {
        Reference::Value(value.into())
    }
}

impl From<i32> for Reference {
    fn from(value: i32) -> Self {
        Reference::Value(value.into())
    }
}

impl From<f64> for Reference {
    fn from(value: f64) -> Self {
        Reference::Value(value.into())
    }
}

impl From<NaiveDateTime> for Reference {
    fn from(value: NaiveDateTime) -> Self {
        Reference::Value(value.into())
    }
}

impl From<Period> for Reference {
    fn from(value: Period) -> Self {
        Reference::Period(value)
    }
}

impl From<Range<i64>> for Reference {
    fn from(range: Range<i64>) -> Self {
        Reference::Range {
            start: range.start,
            stop: range.end,
        }
    }
}

impl From<Range<i32>> for Reference {
    fn from(range: Range<i32>) -> Self {
        Reference::Range {
            start: range.start.into(),
            stop: range.end.into(),
        }
    }
}

impl<T: Into<Value>> From<Vec<T>> for Reference {
    fn from(values: Vec<T>) -> Self {
        Reference::List(values.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversions() {
        assert_eq!(Reference::from(2), Reference::Value(Value::Int(2)));
        assert_eq!(
            Reference::from(vec!["A", "B"]),
            Reference::List(vec![Value::from("A"), Value::from("B")])
        );
        assert_eq!(
            Reference::from(3..7),
            Reference::Range { start: 3, stop: 7 }
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(Reference::from(vec![1, 2]).to_string(), "[1, 2]");
        assert_eq!(Reference::from_start("2024-01-01").to_string(), "2024-01-01..");
        assert_eq!(Reference::between(1, 4).to_string(), "1..4");
    }
}
