//! Enumeration field.

use gf_error::{GfError, ParsingError, Result};
use gf_types::{Reference, Value};

use super::{
    encode_mismatch, field_builders, unsupported_reference, FieldInfo, FieldKind, FilenameField,
};

/// Case normalization applied to enumeration text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseType {
    Upper,
    Lower,
}

impl CaseType {
    fn apply(self, input: &str) -> String {
        match self {
            CaseType::Upper => input.to_uppercase(),
            CaseType::Lower => input.to_lowercase(),
        }
    }
}

/// A field whose values belong to a closed set of symbols.
///
/// Captured text is case-normalized (when a decoding case is set) before
/// being resolved to a member, and members are re-cased when encoded.
///
/// # Example
///
/// ```
/// use gf_convention::field::{CaseType, EnumField};
/// use gf_convention::FilenameField;
/// use gf_types::Value;
///
/// let delay = EnumField::new("delay", "Delay", &["NRT", "DT"])
///     .with_case_type(CaseType::Upper)
///     .with_encoded_case(CaseType::Lower);
///
/// assert_eq!(delay.decode("nrt").unwrap(), Value::Enum("NRT".to_string()));
/// assert_eq!(delay.encode(&Value::Enum("DT".to_string())).unwrap(), "dt");
/// ```
#[derive(Debug, Clone)]
pub struct EnumField {
    info: FieldInfo,
    type_name: String,
    members: Vec<String>,
    case_type: Option<CaseType>,
    encoded_case: Option<CaseType>,
}

impl EnumField {
    /// Create an enumeration field over `members`, named `type_name` in messages.
    pub fn new(name: impl Into<String>, type_name: impl Into<String>, members: &[&str]) -> Self {
        Self {
            info: FieldInfo::new(name),
            type_name: type_name.into(),
            members: members.iter().map(|m| m.to_string()).collect(),
            case_type: None,
            encoded_case: None,
        }
    }

    /// Normalize captured text to this case before resolving it.
    pub fn with_case_type(mut self, case_type: CaseType) -> Self {
        self.case_type = Some(case_type);
        self
    }

    /// Re-case members to this case when encoding.
    pub fn with_encoded_case(mut self, case_type: CaseType) -> Self {
        self.encoded_case = Some(case_type);
        self
    }

    pub fn members(&self) -> &[String] {
        &self.members
    }

    fn normalize(&self, input: &str) -> String {
        match self.case_type {
            Some(case_type) => case_type.apply(input),
            None => input.to_string(),
        }
    }

    fn is_member(&self, symbol: &str) -> bool {
        self.members.iter().any(|m| m == symbol)
    }

    fn resolve_reference(&self, value: Value) -> Result<Value> {
        let symbol = match value {
            Value::Str(s) | Value::Enum(s) => s,
            other => {
                return Err(GfError::FileListing(format!(
                    "Reference '{other}' for field '{}' is a {}, expected a {} member",
                    self.name(),
                    other.type_name(),
                    self.type_name
                )));
            }
        };

        if self.is_member(&symbol) {
            return Ok(Value::Enum(symbol));
        }
        let normalized = self.normalize(&symbol);
        if self.is_member(&normalized) {
            return Ok(Value::Enum(normalized));
        }
        Err(GfError::FileListing(format!(
            "'{symbol}' is not a {} member for field '{}'. Possible values are: {:?}",
            self.type_name,
            self.name(),
            self.members
        )))
    }
}

field_builders!(EnumField);

impl FilenameField for EnumField {
    fn info(&self) -> &FieldInfo {
        &self.info
    }

    fn kind(&self) -> FieldKind {
        FieldKind::Enum
    }

    fn decode(&self, input: &str) -> std::result::Result<Value, ParsingError> {
        let symbol = self.normalize(input);
        if self.is_member(&symbol) {
            Ok(Value::Enum(symbol))
        } else {
            Err(ParsingError::new(
                input,
                self.name(),
                &self.type_name,
                format!("possible values are {:?}", self.members),
            ))
        }
    }

    fn encode(&self, value: &Value) -> Result<String> {
        match value {
            Value::Enum(symbol) => Ok(match self.encoded_case {
                Some(case_type) => case_type.apply(symbol),
                None => symbol.clone(),
            }),
            other => Err(encode_mismatch(self.name(), other)),
        }
    }

    fn sanitize(&self, reference: Reference) -> Result<Reference> {
        match reference {
            Reference::Value(value) => Ok(Reference::Value(self.resolve_reference(value)?)),
            Reference::List(values) => Ok(Reference::List(
                values
                    .into_iter()
                    .map(|v| self.resolve_reference(v))
                    .collect::<Result<Vec<_>>>()?,
            )),
            other => Err(unsupported_reference(self.name(), self.kind(), &other)),
        }
    }

    fn test(&self, reference: &Reference, tested: &Value) -> bool {
        match reference {
            Reference::List(members) => members.contains(tested),
            Reference::Value(expected) => expected == tested,
            _ => false,
        }
    }

    fn test_description(&self) -> String {
        format!(
            "As an enum field, it can be filtered using a reference {} member or its equivalent \
             string. The tested value found in the file name is filtered out if it is not equal \
             to the given member. Possible values are: {:?}",
            self.type_name, self.members
        )
    }
}
