//! Filename conventions and tree filtering for granule-fetch.
//!
//! This crate provides:
//! - Typed filename fields ([`field`]) decoding regex groups into [`Value`]s
//! - [`FilenameConvention`] - parse and generate filenames with a regex and a template
//! - [`RecordFilter`] - test parsed records against caller references
//! - [`Layout`] - one convention per folder depth, used to prune remote trees
//! - [`TreeWalker`] - depth-first listing of a remote tree with early pruning
//! - [`FilenameFilterer`] - walk, parse and filter granules into a [`GranuleTable`]
//! - [`implementations`] - the catalog of known product conventions and layouts
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use gf_convention::field::IntegerField;
//! use gf_convention::{FilenameConvention, RecordFilter};
//! use gf_types::{Filters, Value};
//!
//! let convention = FilenameConvention::new(
//!     r"dataset_(?P<cycle_number>\d{2})\.nc",
//!     vec![Arc::new(IntegerField::new("cycle_number"))],
//!     Some("dataset_{cycle_number:>02d}.nc"),
//! )
//! .unwrap();
//!
//! let record = convention.parse_filename("dataset_07.nc").unwrap().unwrap();
//! assert_eq!(record, vec![Some(Value::Int(7))]);
//!
//! let filter = RecordFilter::new(convention.fields(), &Filters::new().with("cycle_number", 7)).unwrap();
//! assert!(filter.test(&record));
//! ```

pub mod convention;
pub mod field;
pub mod filterer;
pub mod implementations;
pub mod layout;
pub mod record_filter;
pub mod template;
pub mod walker;

pub use convention::{FilenameConvention, Record};
pub use field::{FieldKind, FilenameField};
pub use filterer::{FilenameFilterer, Granule, GranuleTable};
pub use implementations::ConventionRegistry;
pub use layout::{Layout, LayoutFilter};
pub use record_filter::RecordFilter;
pub use template::GenerationTemplate;
pub use walker::{TreeWalker, Walk, WalkStats, WalkedLeaf};

pub use gf_types::{Filters, Period, Reference, Value};
