//! Error types and classification for granule-fetch.
//!
//! This crate provides:
//! - [`GfError`] - Top-level error enum for discovery and download errors
//! - Domain-specific errors ([`ParsingError`], [`ListingError`], [`DownloadError`])
//! - [`ErrorCategory`] for retry decisions in the bulk downloader

use thiserror::Error;

/// Top-level error type for granule-fetch.
#[derive(Error, Debug)]
pub enum GfError {
    /// Invalid convention, layout or product configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// A filename fragment could not be decoded into its field type
    #[error("Parsing error: {0}")]
    Parsing(#[from] ParsingError),

    /// A filename or folder name could not be generated
    #[error("Generation error: {0}")]
    Generation(String),

    /// Invalid filters for a file listing (unknown key, unusable reference)
    #[error("File listing error: {0}")]
    FileListing(String),

    /// Remote catalog listing failed
    #[error("Listing error: {0}")]
    Listing(#[from] ListingError),

    /// Granule download failed
    #[error("Download error: {0}")]
    Download(#[from] DownloadError),

    /// Credentials could not be read or stored
    #[error("Credentials error: {0}")]
    Credentials(String),

    /// Local I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic errors (wrapped anyhow)
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Failure to convert a matched filename group into its field type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("'{input}' extracted from group '{field}' could not be converted to {target}: {reason}")]
pub struct ParsingError {
    /// The offending substring
    pub input: String,
    /// Name of the field being decoded
    pub field: String,
    /// Name of the target type
    pub target: String,
    /// Underlying cause
    pub reason: String,
}

impl ParsingError {
    /// Create a new parsing error.
    pub fn new(
        input: impl Into<String>,
        field: impl Into<String>,
        target: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            input: input.into(),
            field: field.into(),
            target: target.into(),
            reason: reason.into(),
        }
    }
}

/// Remote listing errors.
#[derive(Error, Debug)]
pub enum ListingError {
    /// Request could not be sent or timed out
    #[error("Request to {url} failed: {message}")]
    Request { url: String, message: String },

    /// Server answered with a non-success status
    #[error("{url} answered with HTTP {status}")]
    Status { url: String, status: u16 },

    /// Catalog document is malformed
    #[error("Malformed catalog {url}: {message}")]
    Malformed { url: String, message: String },

    /// A reference in the catalog could not be resolved to a URL
    #[error("Invalid URL '{0}'")]
    InvalidUrl(String),
}

/// Granule download errors.
#[derive(Error, Debug)]
pub enum DownloadError {
    /// Connection, timeout or protocol failure
    #[error("Request to {url} failed: {message}")]
    Request { url: String, message: String },

    /// Server answered with a non-success status
    #[error("{url} answered with HTTP {status}")]
    Status { url: String, status: u16 },

    /// Destination could not be written
    #[error("Cannot write {path}: {message}")]
    Write { path: String, message: String },
}

/// Error classification for retry decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Transient error - retry with exponential backoff
    ///
    /// Examples: network timeout, HTTP 503, throttling
    Transient,

    /// Permanent error - never retry
    ///
    /// Examples: file not found, access denied, invalid configuration
    Permanent,
}

/// Classifies an error to determine retry behavior.
pub fn classify_error(error: &GfError) -> ErrorCategory {
    match error {
        GfError::Listing(e) => classify_listing_error(e),
        GfError::Download(e) => classify_download_error(e),
        GfError::Config(_)
        | GfError::Parsing(_)
        | GfError::Generation(_)
        | GfError::FileListing(_)
        | GfError::Credentials(_)
        | GfError::Io(_) => ErrorCategory::Permanent,
        GfError::Other(e) => classify_message(&e.to_string()),
    }
}

fn classify_listing_error(error: &ListingError) -> ErrorCategory {
    match error {
        ListingError::Request { .. } => ErrorCategory::Transient,
        ListingError::Status { status, .. } => classify_status(*status),
        ListingError::Malformed { .. } => ErrorCategory::Permanent,
        ListingError::InvalidUrl(_) => ErrorCategory::Permanent,
    }
}

fn classify_download_error(error: &DownloadError) -> ErrorCategory {
    match error {
        DownloadError::Request { .. } => ErrorCategory::Transient,
        DownloadError::Status { status, .. } => classify_status(*status),
        DownloadError::Write { .. } => ErrorCategory::Permanent,
    }
}

/// HTTP 429 and 5xx are worth retrying, other statuses are not.
pub fn classify_status(status: u16) -> ErrorCategory {
    if status == 429 || (500..600).contains(&status) {
        ErrorCategory::Transient
    } else {
        ErrorCategory::Permanent
    }
}

fn classify_message(message: &str) -> ErrorCategory {
    let message = message.to_lowercase();
    if message.contains("timeout")
        || message.contains("timed out")
        || message.contains("connection reset")
        || message.contains("connection refused")
        || message.contains("service unavailable")
    {
        ErrorCategory::Transient
    } else {
        ErrorCategory::Permanent
    }
}

/// Result type alias using GfError.
pub type Result<T> = std::result::Result<T, GfError>;
