//! Shared utilities for the granule-fetch command-line tools.
//!
//! This crate provides:
//! - [`LogLevel`] - a `clap` value for `--log-level`
//! - [`init_logging`] - stderr logging, overridable through `GF_LOG`
//! - Human-readable formatting of sizes and durations

pub mod args;
pub mod format;
pub mod logging;

pub use args::LogLevel;
pub use format::{format_bytes, format_duration};
pub use logging::init_logging;
