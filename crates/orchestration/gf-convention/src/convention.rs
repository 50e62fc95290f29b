//! Two-way filename conventions.

use gf_error::{GfError, Result};
use gf_types::Value;
use regex::{Captures, Regex};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use crate::field::FilenameField;
use crate::template::GenerationTemplate;

/// Decoded field values in declaration order.
///
/// A value is `None` when its group did not capture anything and the field
/// has no default.
pub type Record = Vec<Option<Value>>;

/// Parse and generate filenames following a naming convention.
///
/// The convention pairs a regex, whose named groups are the fields, with an
/// optional generation template. Both are checked against the field list
/// when the convention is built:
/// - every field has a group of the same name and every named group a field
/// - every field appears in the template and every placeholder is a field
#[derive(Debug, Clone)]
pub struct FilenameConvention {
    regex: Regex,
    fields: Vec<Arc<dyn FilenameField>>,
    template: Option<GenerationTemplate>,
}

impl FilenameConvention {
    /// Build a convention.
    ///
    /// # Errors
    ///
    /// Returns [`GfError::Config`] if the pattern or template is invalid,
    /// if field names are duplicated, or if the groups or placeholders do not
    /// match the field names.
    pub fn new(
        pattern: &str,
        fields: Vec<Arc<dyn FilenameField>>,
        generation: Option<&str>,
    ) -> Result<Self> {
        let regex = Regex::new(pattern)
            .map_err(|e| GfError::Config(format!("Invalid convention pattern '{pattern}': {e}")))?;
        let template = generation.map(GenerationTemplate::parse).transpose()?;

        let convention = Self {
            regex,
            fields,
            template,
        };
        convention.check_consistency()?;
        Ok(convention)
    }

    fn check_consistency(&self) -> Result<()> {
        let mut field_names = BTreeSet::new();
        for field in &self.fields {
            if !field_names.insert(field.name()) {
                return Err(GfError::Config(format!(
                    "Field '{}' is declared twice in convention '{}'",
                    field.name(),
                    self.regex.as_str()
                )));
            }
        }

        let groups: BTreeSet<&str> = self.regex.capture_names().flatten().collect();
        let missing_groups = difference(&field_names, &groups);
        if !missing_groups.is_empty() {
            return Err(GfError::Config(format!(
                "Regex '{}' misses the following fields: {missing_groups:?}",
                self.regex.as_str()
            )));
        }
        let missing_fields = difference(&groups, &field_names);
        if !missing_fields.is_empty() {
            return Err(GfError::Config(format!(
                "Missing fields definition in convention '{}': {missing_fields:?}",
                self.regex.as_str()
            )));
        }

        if let Some(template) = &self.template {
            let placeholders = template.field_names();
            let missing_placeholders = difference(&field_names, &placeholders);
            if !missing_placeholders.is_empty() {
                return Err(GfError::Config(format!(
                    "Generation string '{}' misses the following fields: {missing_placeholders:?}",
                    template.as_str()
                )));
            }
            let undeclared = difference(&placeholders, &field_names);
            if !undeclared.is_empty() {
                return Err(GfError::Config(format!(
                    "The following fields are defined in the generation string '{}' but not \
                     in the field list: {undeclared:?}",
                    template.as_str()
                )));
            }
        }

        Ok(())
    }

    /// Search the pattern in `filename`.
    pub fn match_filename<'h>(&self, filename: &'h str) -> Option<Captures<'h>> {
        self.regex.captures(filename)
    }

    /// Decode the captured groups into a record.
    ///
    /// A group that did not capture anything yields the field default.
    pub fn parse(&self, captures: &Captures<'_>) -> Result<Record> {
        self.fields
            .iter()
            .map(|field| match captures.name(field.name()) {
                Some(group) if !group.as_str().is_empty() => {
                    Ok(Some(field.decode(group.as_str())?))
                }
                _ => Ok(field.default_value().cloned()),
            })
            .collect()
    }

    /// Match and parse a filename. `Ok(None)` when the name does not follow
    /// the convention.
    pub fn parse_filename(&self, filename: &str) -> Result<Option<Record>> {
        self.match_filename(filename)
            .map(|captures| self.parse(&captures))
            .transpose()
    }

    /// Generate a filename from named values.
    ///
    /// # Errors
    ///
    /// Returns [`GfError::Generation`] if the convention has no generation
    /// template, a value is missing, or a value cannot be encoded.
    pub fn generate(&self, values: &HashMap<String, Value>) -> Result<String> {
        let template = self.template.as_ref().ok_or_else(|| {
            GfError::Generation(format!(
                "Convention '{}' is only configured for parsing, it has no generation string",
                self.regex.as_str()
            ))
        })?;
        template.render(values, &self.fields)
    }

    /// Whether filenames can be generated.
    pub fn can_generate(&self) -> bool {
        self.template.is_some()
    }

    pub fn fields(&self) -> &[Arc<dyn FilenameField>] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Arc<dyn FilenameField>> {
        self.fields.iter().find(|f| f.name() == name)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name())
    }

    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }
}

fn difference<'a>(left: &BTreeSet<&'a str>, right: &BTreeSet<&str>) -> Vec<&'a str> {
    left.iter().filter(|name| !right.contains(*name)).copied().collect()
}
