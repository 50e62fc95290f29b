//! Composite release identifier of the SWOT L2 products.

use gf_error::{GfError, ParsingError, Result};
use gf_types::{Reference, Value};
use std::fmt;
use std::str::FromStr;

use super::{
    encode_mismatch, field_builders, unsupported_reference, FieldInfo, FieldKind, FilenameField,
};

/// Processing chain that produced an L2 granule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timeliness {
    /// Forward stream, `PI..`
    Forward,
    /// Reprocessing campaign, `PG..`
    Reprocessing,
}

/// A CRID such as `PIC0_01`: timeliness, baseline letter, minor version and
/// product counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct L2Version {
    pub timeliness: Timeliness,
    pub baseline: char,
    pub minor: u8,
    pub counter: u8,
}

impl fmt::Display for L2Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let timeliness = match self.timeliness {
            Timeliness::Forward => 'I',
            Timeliness::Reprocessing => 'G',
        };
        write!(
            f,
            "P{timeliness}{}{}_{:02}",
            self.baseline, self.minor, self.counter
        )
    }
}

const CRID_LENGTH: usize = 7;

/// Whether `c` may appear at `position` of a CRID.
fn fits_slot(position: usize, c: char) -> bool {
    match position {
        0 => c == 'P',
        1 => c == 'I' || c == 'G',
        2 => c.is_ascii_uppercase(),
        4 => c == '_',
        3 | 5 | 6 => c.is_ascii_digit(),
        _ => false,
    }
}

/// Whether `text` is the start of a well formed CRID.
fn is_crid_prefix(text: &str) -> bool {
    !text.is_empty() && text.chars().enumerate().all(|(position, c)| fits_slot(position, c))
}

fn digit(c: char) -> u8 {
    c.to_digit(10).map_or(0, |d| d as u8)
}

impl FromStr for L2Version {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let chars: Vec<char> = s.chars().collect();
        if chars.len() != CRID_LENGTH || !is_crid_prefix(s) {
            return Err(format!(
                "expected P, then I or G, a baseline letter, a minor digit and a two digit counter (PIC0_01), got '{s}'"
            ));
        }
        Ok(Self {
            timeliness: if chars[1] == 'I' {
                Timeliness::Forward
            } else {
                Timeliness::Reprocessing
            },
            baseline: chars[2],
            minor: digit(chars[3]),
            counter: digit(chars[5]) * 10 + digit(chars[6]),
        })
    }
}

/// The CRID of a SWOT L2 granule.
///
/// Decoding rejects identifiers that do not follow the `P[IG][A-Z]N_NN`
/// structure. References are whole CRIDs or their leading part: `PIC`
/// selects every forward granule of baseline C, whatever the minor version
/// and counter.
#[derive(Debug, Clone)]
pub struct L2VersionField {
    info: FieldInfo,
}

impl L2VersionField {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            info: FieldInfo::new(name),
        }
    }

    fn check_reference(&self, value: Value) -> Result<Value> {
        match value {
            Value::Str(s) if is_crid_prefix(&s.to_uppercase()) => Ok(Value::Str(s.to_uppercase())),
            other => Err(GfError::FileListing(format!(
                "Reference '{other}' for field '{}' is not a product version such as PIC0_01 or PIC",
                self.name()
            ))),
        }
    }
}

field_builders!(L2VersionField);

impl FilenameField for L2VersionField {
    fn info(&self) -> &FieldInfo {
        &self.info
    }

    fn kind(&self) -> FieldKind {
        FieldKind::String
    }

    fn decode(&self, input: &str) -> std::result::Result<Value, ParsingError> {
        input
            .parse::<L2Version>()
            .map(|version| Value::Str(version.to_string()))
            .map_err(|reason| ParsingError::new(input, self.name(), "L2 version", reason))
    }

    fn encode(&self, value: &Value) -> Result<String> {
        match value {
            Value::Str(s) => s
                .parse::<L2Version>()
                .map(|version| version.to_string())
                .map_err(|reason| {
                    GfError::Generation(format!("Field '{}': {reason}", self.name()))
                }),
            other => Err(encode_mismatch(self.name(), other)),
        }
    }

    fn sanitize(&self, reference: Reference) -> Result<Reference> {
        match reference {
            Reference::Value(value) => Ok(Reference::Value(self.check_reference(value)?)),
            Reference::List(values) => values
                .into_iter()
                .map(|value| self.check_reference(value))
                .collect::<Result<Vec<_>>>()
                .map(Reference::List),
            other => Err(unsupported_reference(self.name(), self.kind(), &other)),
        }
    }

    fn test(&self, reference: &Reference, tested: &Value) -> bool {
        let Value::Str(tested) = tested else {
            return false;
        };
        let selects = |value: &Value| {
            matches!(value, Value::Str(prefix) if tested.starts_with(prefix.as_str()))
        };
        match reference {
            Reference::Value(value) => selects(value),
            Reference::List(values) => values.iter().any(selects),
            _ => false,
        }
    }

    fn test_description(&self) -> String {
        "As a product version field, it can be filtered by giving a version such as PIC0_01, \
         the start of one such as PIC (every minor version and counter of baseline C), or a \
         list of those. The tested value from the file name is filtered out if it does not \
         start with any of the references."
            .to_string()
    }
}
