//! Free-text field.

use gf_error::{ParsingError, Result};
use gf_types::{Reference, Value};

use super::{
    encode_mismatch, field_builders, unsupported_reference, FieldInfo, FieldKind, FilenameField,
};

/// A field kept as the raw captured text.
#[derive(Debug, Clone)]
pub struct StringField {
    info: FieldInfo,
}

impl StringField {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            info: FieldInfo::new(name),
        }
    }
}

field_builders!(StringField);

impl FilenameField for StringField {
    fn info(&self) -> &FieldInfo {
        &self.info
    }

    fn kind(&self) -> FieldKind {
        FieldKind::String
    }

    fn decode(&self, input: &str) -> std::result::Result<Value, ParsingError> {
        Ok(Value::Str(input.to_string()))
    }

    fn encode(&self, value: &Value) -> Result<String> {
        match value {
            Value::Str(s) => Ok(s.clone()),
            other => Err(encode_mismatch(self.name(), other)),
        }
    }

    fn sanitize(&self, reference: Reference) -> Result<Reference> {
        match reference {
            Reference::Value(Value::Str(s)) => Ok(Reference::Value(Value::Str(s))),
            Reference::Value(value @ (Value::Int(_) | Value::Float(_))) => {
                Ok(Reference::Value(Value::Str(value.to_string())))
            }
            other => Err(unsupported_reference(self.name(), self.kind(), &other)),
        }
    }

    fn test(&self, reference: &Reference, tested: &Value) -> bool {
        matches!(reference, Reference::Value(expected) if expected == tested)
    }

    fn test_description(&self) -> String {
        "As a string field, it can be filtered by giving a reference string. The tested value \
         from the file name is filtered out if it is not equal to the reference value."
            .to_string()
    }
}
