//! Filtering of parsed records.

use gf_error::{GfError, Result};
use gf_types::{Filters, Reference, Value};
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::field::FilenameField;

/// A set of sanitized references bound to record positions.
///
/// Records are the output of [`crate::FilenameConvention::parse`], ordered
/// like the fields given to [`RecordFilter::new`].
#[derive(Debug, Clone)]
pub struct RecordFilter {
    fields: Vec<Arc<dyn FilenameField>>,
    /// (position in record, sanitized reference)
    references: Vec<(usize, Reference)>,
}

impl RecordFilter {
    /// Bind and sanitize the filters against `fields`.
    ///
    /// # Errors
    ///
    /// Returns [`GfError::FileListing`] if a filter key is not a field name or
    /// if a reference cannot be used with its field.
    pub fn new(fields: &[Arc<dyn FilenameField>], filters: &Filters) -> Result<Self> {
        let unknown: BTreeSet<&str> = filters
            .keys()
            .filter(|key| !fields.iter().any(|f| f.name() == *key))
            .collect();
        if !unknown.is_empty() {
            return Err(GfError::FileListing(format!(
                "Tried to build filter on file name fields using unknown keys: '{unknown:?}'"
            )));
        }

        let references = filters
            .iter()
            .map(|(key, reference)| {
                let index = fields
                    .iter()
                    .position(|f| f.name() == key)
                    .ok_or_else(|| GfError::FileListing(format!("Unknown filter key '{key}'")))?;
                Ok((index, fields[index].sanitize(reference.clone())?))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            fields: fields.to_vec(),
            references,
        })
    }

    /// Whether the record passes every reference.
    ///
    /// A value missing from the record fails any reference on its field.
    pub fn test(&self, record: &[Option<Value>]) -> bool {
        self.references.iter().all(|(index, reference)| {
            match record.get(*index).and_then(Option::as_ref) {
                Some(value) => self.fields[*index].test(reference, value),
                None => false,
            }
        })
    }

    /// Whether no reference is set, so every record passes.
    pub fn is_empty(&self) -> bool {
        self.references.is_empty()
    }

    /// Names of the filtered fields.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.references
            .iter()
            .map(|(index, _)| self.fields[*index].name())
    }
}
