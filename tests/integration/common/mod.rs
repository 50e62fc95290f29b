//! Common utilities for integration tests.
//!
//! This module provides in-memory stand-ins for the catalog server and the
//! file server, plus the sample products used across the tests.

pub mod fixtures;
pub mod memory;

pub use fixtures::{discoverer, sample_tree, CATALOG_BASE, FILE_SERVER};
pub use memory::FakeFetcher;
