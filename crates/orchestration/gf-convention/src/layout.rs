//! Folder layouts of remote trees.
//!
//! A [`Layout`] describes the folder name convention at each depth below a
//! product root. Bound to filters, it decides which folders can hold matching
//! granules so the walk never lists the others.

use gf_error::{GfError, Result};
use gf_types::{Filters, Reference, Value};
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, warn};

use crate::convention::FilenameConvention;
use crate::record_filter::RecordFilter;

/// One folder naming convention per depth.
#[derive(Debug, Clone)]
pub struct Layout {
    levels: Vec<FilenameConvention>,
}

impl Layout {
    pub fn new(levels: Vec<FilenameConvention>) -> Self {
        Self { levels }
    }

    /// Number of constrained folder levels.
    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    pub fn levels(&self) -> &[FilenameConvention] {
        &self.levels
    }

    /// Names of the fields of every level.
    pub fn field_names(&self) -> BTreeSet<&str> {
        self.levels
            .iter()
            .flat_map(|level| level.field_names())
            .collect()
    }

    /// Bind filters to the levels.
    ///
    /// Keys that no level knows are ignored with a warning: they usually
    /// target the granule names rather than the folders.
    ///
    /// # Errors
    ///
    /// Returns [`GfError::FileListing`] if a reference cannot be used with
    /// the field it targets.
    pub fn set_filters(&self, filters: &Filters) -> Result<LayoutFilter<'_>> {
        let known = self.field_names();
        let unknown: BTreeSet<&str> = filters.keys().filter(|k| !known.contains(k)).collect();
        if !unknown.is_empty() {
            warn!(
                "Layout has been configured with unknown references '{:?}'. They will be ignored.",
                unknown
            );
        }

        let filters = self
            .levels
            .iter()
            .map(|level| {
                let names: BTreeSet<&str> = level.field_names().collect();
                RecordFilter::new(level.fields(), &filters.subset(|k| names.contains(k)))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(LayoutFilter {
            layout: self,
            filters,
        })
    }

    /// Build the relative folder path narrowed by the filters.
    ///
    /// A level is included only when every one of its fields is bound to a
    /// single value; other levels are skipped.
    pub fn build_path(&self, filters: &Filters) -> Result<String> {
        let mut parts = Vec::new();

        for level in &self.levels {
            let mut values = HashMap::new();
            for field in level.fields() {
                let bound = match filters.get(field.name()) {
                    Some(Reference::Value(value)) => {
                        match field.sanitize(Reference::Value(value.clone()))? {
                            Reference::Value(value) => Some(value),
                            _ => None,
                        }
                    }
                    _ => None,
                };
                match bound {
                    Some(value) => {
                        values.insert(field.name().to_string(), value);
                    }
                    None => break,
                }
            }

            if values.len() != level.fields().len() || !level.can_generate() {
                debug!("Skipping path level '{}', not every field is bound", level.pattern());
                continue;
            }
            parts.push(generate_folder(level, &values)?);
        }

        Ok(parts.join("/"))
    }
}

fn generate_folder(level: &FilenameConvention, values: &HashMap<String, Value>) -> Result<String> {
    level.generate(values).map_err(|e| match e {
        GfError::Generation(message) => {
            GfError::Generation(format!("Cannot build folder name: {message}"))
        }
        other => other,
    })
}

/// A [`Layout`] bound to the filters of one listing request.
#[derive(Debug, Clone)]
pub struct LayoutFilter<'a> {
    layout: &'a Layout,
    /// One filter per level, possibly empty
    filters: Vec<RecordFilter>,
}

impl LayoutFilter<'_> {
    /// Whether the folder at `depth` may contain matching granules.
    ///
    /// Folders deeper than the layout, or at a level with no applicable
    /// filter, are always accepted. Otherwise the folder name must follow the
    /// level convention and pass its filter.
    ///
    /// # Errors
    ///
    /// Returns a parsing error if the folder name matches the level pattern
    /// but a group cannot be decoded.
    pub fn test(&self, depth: usize, folder: &str) -> Result<bool> {
        let (Some(level), Some(filter)) = (self.layout.levels.get(depth), self.filters.get(depth))
        else {
            return Ok(true);
        };
        if filter.is_empty() {
            return Ok(true);
        }

        match level.parse_filename(folder)? {
            Some(record) => Ok(filter.test(&record)),
            None => Ok(false),
        }
    }

    /// Whether any level has an applicable filter.
    pub fn is_constrained(&self) -> bool {
        self.filters.iter().any(|f| !f.is_empty())
    }
}
