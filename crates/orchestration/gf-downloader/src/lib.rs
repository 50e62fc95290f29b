//! gf-downloader - bulk granule downloads for granule-fetch.
//!
//! This crate provides:
//!
//! - [`BulkDownloader`] - bounded-concurrency downloads into a directory,
//!   reporting failures instead of aborting
//! - [`with_retry`] - retries transient errors, backing off longer when throttled
//! - [`HttpFetcher`] - HTTP transport with basic authentication
//! - [`CredentialStore`] - `.netrc` credentials, prompted once when missing
//!
//! # Example
//!
//! ```ignore
//! use gf_downloader::{BulkDownloader, CredentialStore, DownloadConfig, HttpFetcher, StdinPrompt};
//! use std::time::Duration;
//!
//! let credentials = CredentialStore::user_default()?.ensure(gf_downloader::DEFAULT_HOST, &StdinPrompt)?;
//! let fetcher = HttpFetcher::new(Duration::from_secs(300))?.with_credentials(credentials);
//!
//! let downloader = BulkDownloader::new(fetcher, DownloadConfig::new().with_concurrency(8));
//! let report = downloader.download_all(&urls, "granules".as_ref()).await?;
//! eprintln!("{} files, {} bytes", report.downloaded.len(), report.bytes);
//! ```

pub mod credentials;
pub mod downloader;
pub mod http;
pub mod retry;

pub use credentials::{CredentialPrompt, CredentialStore, Credentials, StdinPrompt, DEFAULT_HOST};
pub use downloader::{
    granule_file_name, BulkDownloader, DownloadConfig, DownloadFailure, DownloadReport,
};
pub use http::HttpFetcher;
pub use retry::{with_retry, RetryConfig, RetryReason};
