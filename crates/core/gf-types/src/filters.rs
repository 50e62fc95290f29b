//! Named filter references for one listing request.

use gf_error::{GfError, Result};
use std::collections::BTreeMap;

use crate::{Reference, Value};

/// Field references keyed by field name.
///
/// Values parsed from text stay untyped ([`Value::Str`]); the field they
/// target converts them when the filter is built.
///
/// # Example
///
/// ```
/// use gf_types::{Filters, Reference};
///
/// let mut filters = Filters::new().with("cycle_number", vec![1, 2]);
/// filters.parse_and_add("time=2024-01-01..2024-02-01").unwrap();
///
/// assert_eq!(filters.len(), 2);
/// assert!(matches!(filters.get("time"), Some(Reference::Bounds(..))));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filters {
    entries: BTreeMap<String, Reference>,
}

impl Filters {
    /// Create an empty filter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a reference, builder style.
    pub fn with(mut self, field: impl Into<String>, reference: impl Into<Reference>) -> Self {
        self.insert(field, reference);
        self
    }

    /// Add or replace the reference of a field.
    pub fn insert(&mut self, field: impl Into<String>, reference: impl Into<Reference>) {
        self.entries.insert(field.into(), reference.into());
    }

    /// Parse a filter from its command-line form and add it.
    ///
    /// Accepted forms:
    /// - `field=value` - equality
    /// - `field=v1,v2,v3` - membership
    /// - `field=start..stop` - bounds, either side may be left empty
    pub fn parse_and_add(&mut self, input: &str) -> Result<()> {
        let (field, reference) = parse_filter(input)?;
        self.entries.insert(field, reference);
        Ok(())
    }

    pub fn get(&self, field: &str) -> Option<&Reference> {
        self.entries.get(field)
    }

    pub fn contains_key(&self, field: &str) -> bool {
        self.entries.contains_key(field)
    }

    pub fn remove(&mut self, field: &str) -> Option<Reference> {
        self.entries.remove(field)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Reference)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Layer these filters over `defaults`; keys present here win.
    pub fn merged_over(&self, defaults: &Filters) -> Filters {
        let mut entries = defaults.entries.clone();
        entries.extend(self.entries.iter().map(|(k, v)| (k.clone(), v.clone())));
        Filters { entries }
    }

    /// Keep only the keys accepted by `predicate`.
    pub fn subset<F>(&self, mut predicate: F) -> Filters
    where
        F: FnMut(&str) -> bool,
    {
        Filters {
            entries: self
                .entries
                .iter()
                .filter(|(k, _)| predicate(k))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }
}

impl<K: Into<String>, R: Into<Reference>> FromIterator<(K, R)> for Filters {
    fn from_iter<I: IntoIterator<Item = (K, R)>>(iter: I) -> Self {
        Filters {
            entries: iter
                .into_iter()
                .map(|(k, r)| (k.into(), r.into()))
                .collect(),
        }
    }
}

fn parse_filter(input: &str) -> Result<(String, Reference)> {
    let input = input.trim();

    let Some((field, values)) = input.split_once('=') else {
        return Err(GfError::Config(format!(
            "Invalid filter format: '{input}'. Expected 'field=value1,value2' or 'field=start..stop'"
        )));
    };

    let field = field.trim();
    if field.is_empty() {
        return Err(GfError::Config(format!(
            "Empty field name in filter: '{input}'"
        )));
    }

    let values = values.trim();
    if values.is_empty() {
        return Err(GfError::Config(format!(
            "No values specified in filter: '{input}'"
        )));
    }

    if let Some((start, stop)) = values.split_once("..") {
        let side = |s: &str| {
            let s = s.trim();
            (!s.is_empty()).then(|| Value::Str(s.to_string()))
        };
        let (start, stop) = (side(start), side(stop));
        if start.is_none() && stop.is_none() {
            return Err(GfError::Config(format!(
                "Both bounds are empty in filter: '{input}'"
            )));
        }
        return Ok((field.to_string(), Reference::Bounds(start, stop)));
    }

    let mut items: Vec<Value> = values
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| Value::Str(s.to_string()))
        .collect();

    let reference = match items.len() {
        0 => {
            return Err(GfError::Config(format!(
                "No valid values in filter: '{input}'"
            )));
        }
        1 if !values.contains(',') => Reference::Value(items.remove(0)),
        _ => Reference::List(items),
    };

    Ok((field.to_string(), reference))
}
