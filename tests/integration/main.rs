//! Integration tests for granule-fetch.
//!
//! These tests run the whole discovery pipeline (layout configuration,
//! convention registry, tree walk, filename filtering) and the bulk
//! downloader against in-memory catalogs and transports, so they need no
//! network access.
//!
//! ## Running Integration Tests
//!
//! ```bash
//! cargo test -p integration-tests
//! ```

mod common;
mod discovery_test;
mod download_test;
mod thredds_test;
