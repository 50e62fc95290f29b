//! Bounded-concurrency bulk downloads.

use futures::stream::{self, StreamExt};
use gf_error::{GfError, Result};
use gf_traits::GranuleFetcher;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::retry::{with_retry, RetryConfig};

/// Configuration of a bulk download.
#[derive(Debug, Clone)]
pub struct DownloadConfig {
    /// Maximum number of transfers in flight
    pub concurrency: usize,

    /// Replace files already present in the output directory
    pub overwrite: bool,

    /// Retry policy applied to each transfer
    pub retry: RetryConfig,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            concurrency: 4,
            overwrite: false,
            retry: RetryConfig::default(),
        }
    }
}

impl DownloadConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of concurrent transfers (at least one).
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Replace existing files.
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Set the retry policy.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }
}

/// A transfer that failed after its retries.
#[derive(Debug, Clone, Serialize)]
pub struct DownloadFailure {
    pub url: String,
    pub error: String,
}

/// Outcome of a bulk download, in input order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DownloadReport {
    /// Files written by this run
    pub downloaded: Vec<PathBuf>,
    /// Files left untouched because they already existed
    pub skipped: Vec<PathBuf>,
    pub failures: Vec<DownloadFailure>,
    pub bytes: u64,
    #[serde(with = "duration_ms")]
    pub elapsed: Duration,
}

impl DownloadReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Every granule present locally after the run.
    pub fn local_files(&self) -> impl Iterator<Item = &PathBuf> {
        self.downloaded.iter().chain(&self.skipped)
    }
}

mod duration_ms {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_millis() as u64)
    }
}

enum Outcome {
    Downloaded(PathBuf, u64),
    Skipped(PathBuf),
    Failed(DownloadFailure),
}

/// Local file name of a granule URL: its last path segment.
///
/// # Errors
///
/// Returns [`GfError::Config`] when the URL has no file name.
pub fn granule_file_name(url: &str) -> Result<&str> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    match path.rsplit('/').next() {
        Some(name) if !name.is_empty() && name != ".." && name != "." => Ok(name),
        _ => Err(GfError::Config(format!("Cannot derive a file name from '{url}'"))),
    }
}

/// Downloads granules into a directory with a bounded number of transfers.
pub struct BulkDownloader<F: GranuleFetcher> {
    fetcher: F,
    config: DownloadConfig,
}

impl<F: GranuleFetcher> BulkDownloader<F> {
    pub fn new(fetcher: F, config: DownloadConfig) -> Self {
        Self { fetcher, config }
    }

    /// Download `urls` into `output_dir`, creating it when needed.
    ///
    /// Individual failures are reported, never raised.
    ///
    /// # Errors
    ///
    /// Returns [`GfError::Io`] when the output directory cannot be created.
    pub async fn download_all(&self, urls: &[String], output_dir: &Path) -> Result<DownloadReport> {
        tokio::fs::create_dir_all(output_dir).await?;
        let started = Instant::now();

        let outcomes: Vec<Outcome> = stream::iter(urls)
            .map(|url| self.download_one(url, output_dir))
            .buffered(self.config.concurrency.max(1))
            .collect()
            .await;

        let mut report = DownloadReport::default();
        for outcome in outcomes {
            match outcome {
                Outcome::Downloaded(path, bytes) => {
                    report.bytes += bytes;
                    report.downloaded.push(path);
                }
                Outcome::Skipped(path) => report.skipped.push(path),
                Outcome::Failed(failure) => report.failures.push(failure),
            }
        }
        report.elapsed = started.elapsed();

        info!(
            downloaded = report.downloaded.len(),
            skipped = report.skipped.len(),
            failed = report.failures.len(),
            bytes = report.bytes,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "Download complete"
        );
        Ok(report)
    }

    async fn download_one(&self, url: &str, output_dir: &Path) -> Outcome {
        let failed = |error: GfError| {
            warn!(url, error = %error, "Download failed");
            Outcome::Failed(DownloadFailure {
                url: url.to_string(),
                error: error.to_string(),
            })
        };

        let destination = match granule_file_name(url) {
            Ok(name) => output_dir.join(name),
            Err(e) => return failed(e),
        };

        if !self.config.overwrite && tokio::fs::try_exists(&destination).await.unwrap_or(false) {
            debug!(path = %destination.display(), "Already downloaded, skipping");
            return Outcome::Skipped(destination);
        }

        let result = with_retry(&self.config.retry, url, || {
            self.fetcher.fetch(url, &destination)
        })
        .await;

        match result {
            Ok(bytes) => Outcome::Downloaded(destination, bytes),
            Err(e) => failed(e),
        }
    }
}
