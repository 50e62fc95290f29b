//! Core traits for granule-fetch.
//!
//! This crate defines the seams between the discovery engine and the outside
//! world:
//! - [`TreeListing`] - Trait for remote folder listing providers (THREDDS, in-memory)
//! - [`GranuleFetcher`] - Trait for granule transfer backends (HTTP, test doubles)

pub mod fetch;
pub mod listing;

pub use fetch::*;
pub use listing::*;
