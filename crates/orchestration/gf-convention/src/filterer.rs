//! Walk, parse and filter granules of a remote tree.

use gf_error::{GfError, Result};
use gf_types::{Filters, Value};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use std::collections::BTreeSet;
use tracing::{debug, info};

use crate::convention::{FilenameConvention, Record};
use crate::record_filter::RecordFilter;
use crate::walker::TreeWalker;

/// Name of the column holding the granule access path.
pub const PATH_COLUMN: &str = "path";

/// One selected granule: its decoded fields and where to fetch it.
#[derive(Debug, Clone, PartialEq)]
pub struct Granule {
    pub values: Record,
    pub path: String,
}

/// Selected granules, one column per convention field plus the path.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GranuleTable {
    columns: Vec<String>,
    rows: Vec<Granule>,
}

impl GranuleTable {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, granule: Granule) {
        self.rows.push(granule);
    }

    /// Field column names, without the path column.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Values of one field column, `None` for an unknown column.
    pub fn column(&self, name: &str) -> Option<Vec<Option<&Value>>> {
        let index = self.columns.iter().position(|c| c == name)?;
        Some(
            self.rows
                .iter()
                .map(|row| row.values.get(index).and_then(Option::as_ref))
                .collect(),
        )
    }

    /// Access paths in row order.
    pub fn paths(&self) -> Vec<&str> {
        self.rows.iter().map(|row| row.path.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Granule> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn into_paths(self) -> Vec<String> {
        self.rows.into_iter().map(|row| row.path).collect()
    }
}

impl IntoIterator for GranuleTable {
    type Item = Granule;
    type IntoIter = std::vec::IntoIter<Granule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

/// A row serialized as a map of column name to value.
struct RowRef<'a> {
    columns: &'a [String],
    granule: &'a Granule,
}

impl Serialize for RowRef<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len() + 1))?;
        for (column, value) in self.columns.iter().zip(&self.granule.values) {
            map.serialize_entry(column, value)?;
        }
        map.serialize_entry(PATH_COLUMN, &self.granule.path)?;
        map.end()
    }
}

impl Granule {
    /// Serializable view of the row keyed by `columns`.
    pub fn with_columns<'a>(&'a self, columns: &'a [String]) -> impl Serialize + 'a {
        RowRef {
            columns,
            granule: self,
        }
    }
}

impl Serialize for GranuleTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.rows.len()))?;
        for granule in &self.rows {
            seq.serialize_element(&granule.with_columns(&self.columns))?;
        }
        seq.end()
    }
}

/// Lists the granules of a tree that follow a convention and pass filters.
pub struct FilenameFilterer<'a> {
    convention: &'a FilenameConvention,
    walker: TreeWalker<'a>,
}

impl<'a> FilenameFilterer<'a> {
    pub fn new(convention: &'a FilenameConvention, walker: TreeWalker<'a>) -> Self {
        Self { convention, walker }
    }

    /// Walk the tree under `root` and keep the matching granules.
    ///
    /// Filter keys may target the convention fields, the layout fields, or
    /// both. Leaves whose name does not follow the convention are dropped.
    ///
    /// # Errors
    ///
    /// - [`GfError::FileListing`] if a key is unknown to both the convention
    ///   and the layout, or a reference cannot be used with its field
    /// - Parsing errors when a matching name cannot be decoded
    /// - Listing errors from the walk
    pub fn list(&self, root: &str, filters: &Filters) -> Result<GranuleTable> {
        let convention_keys: BTreeSet<&str> = self.convention.field_names().collect();
        let layout_keys: BTreeSet<&str> = self
            .walker
            .layout()
            .map(|layout| layout.field_names())
            .unwrap_or_default();

        let unknown: BTreeSet<&str> = filters
            .keys()
            .filter(|k| !convention_keys.contains(k) && !layout_keys.contains(k))
            .collect();
        if !unknown.is_empty() {
            return Err(GfError::FileListing(format!(
                "Tried to build filter on file name fields using unknown keys: '{unknown:?}'"
            )));
        }

        let record_filter = RecordFilter::new(
            self.convention.fields(),
            &filters.subset(|k| convention_keys.contains(k)),
        )?;
        let walk_filters = filters.subset(|k| layout_keys.contains(k));

        let columns = self
            .convention
            .field_names()
            .map(str::to_string)
            .collect();
        let mut table = GranuleTable::new(columns);
        let mut skipped = 0usize;

        for leaf in self.walker.iter(root, &walk_filters)? {
            let leaf = leaf?;
            let Some(record) = self.convention.parse_filename(basename(&leaf.name))? else {
                skipped += 1;
                continue;
            };
            if record_filter.test(&record) {
                table.push(Granule {
                    values: record,
                    path: leaf.access,
                });
            }
        }

        debug!("{} leaves did not follow the convention", skipped);
        info!("Selected {} granules under {}", table.len(), root);
        Ok(table)
    }
}

fn basename(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}
