//! Integer and float fields.

use gf_error::{GfError, ParsingError, Result};
use gf_types::{Reference, Value};

use super::{
    encode_mismatch, field_builders, unsupported_reference, FieldInfo, FieldKind, FilenameField,
};

/// An integer field such as a cycle or pass number.
///
/// References may be a single integer, a list of integers, a half-open range,
/// or bounds (both sides inclusive). Text references are parsed.
#[derive(Debug, Clone)]
pub struct IntegerField {
    info: FieldInfo,
}

impl IntegerField {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            info: FieldInfo::new(name),
        }
    }

    fn reference_integer(&self, value: Value) -> Result<i64> {
        match value {
            Value::Int(i) => Ok(i),
            Value::Str(s) => s.trim().parse().map_err(|_| {
                GfError::FileListing(format!(
                    "Reference '{s}' for field '{}' is not an integer",
                    self.name()
                ))
            }),
            other => Err(GfError::FileListing(format!(
                "Reference '{other}' for field '{}' is a {}, expected an integer",
                self.name(),
                other.type_name()
            ))),
        }
    }
}

field_builders!(IntegerField);

impl FilenameField for IntegerField {
    fn info(&self) -> &FieldInfo {
        &self.info
    }

    fn kind(&self) -> FieldKind {
        FieldKind::Integer
    }

    fn decode(&self, input: &str) -> std::result::Result<Value, ParsingError> {
        input
            .parse()
            .map(Value::Int)
            .map_err(|e| ParsingError::new(input, self.name(), "integer", format!("{e}")))
    }

    fn encode(&self, value: &Value) -> Result<String> {
        match value {
            Value::Int(i) => Ok(i.to_string()),
            other => Err(encode_mismatch(self.name(), other)),
        }
    }

    fn sanitize(&self, reference: Reference) -> Result<Reference> {
        match reference {
            Reference::Value(value) => Ok(Reference::Value(Value::Int(
                self.reference_integer(value)?,
            ))),
            Reference::List(values) => Ok(Reference::List(
                values
                    .into_iter()
                    .map(|v| self.reference_integer(v).map(Value::Int))
                    .collect::<Result<Vec<_>>>()?,
            )),
            Reference::Range { start, stop } => Ok(Reference::Range { start, stop }),
            Reference::Bounds(start, stop) => {
                let start = start.map(|v| self.reference_integer(v)).transpose()?;
                let stop = stop.map(|v| self.reference_integer(v)).transpose()?;
                Ok(Reference::Range {
                    start: start.unwrap_or(i64::MIN),
                    stop: stop.map_or(i64::MAX, |s| s.saturating_add(1)),
                })
            }
            other => Err(unsupported_reference(self.name(), self.kind(), &other)),
        }
    }

    fn test(&self, reference: &Reference, tested: &Value) -> bool {
        let Some(tested) = tested.as_int() else {
            return false;
        };
        match reference {
            Reference::List(values) => values.iter().any(|v| v.as_int() == Some(tested)),
            Reference::Range { start, stop } => *start <= tested && tested < *stop,
            Reference::Value(Value::Int(expected)) => *expected == tested,
            _ => false,
        }
    }

    fn test_description(&self) -> String {
        "As an integer field, it can be filtered by using a reference value. The reference \
         can either be a list, a range or an integer. The tested value from the file name is \
         filtered out if it is outside the given list/range or not equal to the integer value."
            .to_string()
    }
}

/// A floating point field.
#[derive(Debug, Clone)]
pub struct FloatField {
    info: FieldInfo,
}

impl FloatField {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            info: FieldInfo::new(name),
        }
    }
}

field_builders!(FloatField);

impl FilenameField for FloatField {
    fn info(&self) -> &FieldInfo {
        &self.info
    }

    fn kind(&self) -> FieldKind {
        FieldKind::Float
    }

    fn decode(&self, input: &str) -> std::result::Result<Value, ParsingError> {
        input
            .parse()
            .map(Value::Float)
            .map_err(|e| ParsingError::new(input, self.name(), "float", format!("{e}")))
    }

    fn encode(&self, value: &Value) -> Result<String> {
        match value {
            Value::Float(_) => Ok(value.to_string()),
            other => Err(encode_mismatch(self.name(), other)),
        }
    }

    fn sanitize(&self, reference: Reference) -> Result<Reference> {
        match reference {
            Reference::Value(Value::Float(f)) => Ok(Reference::Value(Value::Float(f))),
            Reference::Value(Value::Int(i)) => Ok(Reference::Value(Value::Float(i as f64))),
            Reference::Value(Value::Str(s)) => s
                .trim()
                .parse()
                .map(|f| Reference::Value(Value::Float(f)))
                .map_err(|_| {
                    GfError::FileListing(format!(
                        "Reference '{s}' for field '{}' is not a number",
                        self.name()
                    ))
                }),
            other => Err(unsupported_reference(self.name(), self.kind(), &other)),
        }
    }

    fn test(&self, reference: &Reference, tested: &Value) -> bool {
        matches!(reference, Reference::Value(expected) if expected == tested)
    }

    fn test_description(&self) -> String {
        "As a float field, it can be filtered by using a reference float value. The tested \
         value found in the file name is filtered out if it is not equal to the reference value."
            .to_string()
    }
}
