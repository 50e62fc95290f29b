//! Core types for granule-fetch.
//!
//! This crate provides the vocabulary shared by conventions, layouts and the
//! discovery front ends:
//!
//! - [`Period`] - a time interval with independent boundary inclusivity
//! - [`julian`] - julian-day arithmetic relative to a reference epoch
//! - [`Value`] - a decoded filename field value
//! - [`Reference`] - a filter reference a field value is tested against
//! - [`Filters`] - the named references of one listing request

pub mod filters;
pub mod instant;
pub mod julian;
pub mod period;
pub mod reference;
pub mod value;

pub use filters::Filters;
pub use instant::{format_datetime, parse_datetime, parse_instant};
pub use period::Period;
pub use reference::Reference;
pub use value::Value;
