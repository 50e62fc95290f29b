//! HTTP transport for granules.

use async_trait::async_trait;
use gf_error::{DownloadError, GfError, Result};
use gf_traits::GranuleFetcher;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::credentials::Credentials;

/// Fetches granules over HTTP(S), optionally with basic authentication.
///
/// Bodies are streamed to `<destination>.part` and renamed once complete, so
/// an interrupted transfer never leaves a file that looks downloaded.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    credentials: Option<Credentials>,
}

impl HttpFetcher {
    /// Create a fetcher with a per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`GfError::Config`] if the HTTP client cannot be built.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("granule-fetch/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| GfError::Config(format!("Cannot build HTTP client: {e}")))?;
        Ok(Self {
            client,
            credentials: None,
        })
    }

    /// Set the credentials sent with every request.
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }
}

fn part_path(destination: &Path) -> PathBuf {
    let mut name = destination.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}

fn write_error(path: &Path, error: impl std::fmt::Display) -> GfError {
    DownloadError::Write {
        path: path.display().to_string(),
        message: error.to_string(),
    }
    .into()
}

/// Write the body to `partial`, then move it to `destination`.
async fn stream_body(
    mut response: reqwest::Response,
    url: &str,
    partial: &Path,
    destination: &Path,
) -> Result<u64> {
    let mut file = tokio::fs::File::create(partial)
        .await
        .map_err(|e| write_error(partial, e))?;

    let mut written = 0u64;
    loop {
        let chunk = response.chunk().await.map_err(|e| DownloadError::Request {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        let Some(chunk) = chunk else { break };
        file.write_all(&chunk)
            .await
            .map_err(|e| write_error(partial, e))?;
        written += chunk.len() as u64;
    }
    file.flush().await.map_err(|e| write_error(partial, e))?;
    drop(file);

    tokio::fs::rename(partial, destination)
        .await
        .map_err(|e| write_error(destination, e))?;
    Ok(written)
}

async fn discard(partial: &Path) {
    match tokio::fs::remove_file(partial).await {
        Ok(()) => debug!(path = %partial.display(), "Removed partial download"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %partial.display(), error = %e, "Cannot remove partial download"),
    }
}

#[async_trait]
impl GranuleFetcher for HttpFetcher {
    async fn fetch(&self, url: &str, destination: &Path) -> Result<u64> {
        let request_error = |e: reqwest::Error| -> GfError {
            DownloadError::Request {
                url: url.to_string(),
                message: e.to_string(),
            }
            .into()
        };

        let mut request = self.client.get(url);
        if let Some(credentials) = &self.credentials {
            request = request.basic_auth(&credentials.login, Some(&credentials.password));
        }

        let response = request.send().await.map_err(request_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            }
            .into());
        }

        let partial = part_path(destination);
        let written = match stream_body(response, url, &partial, destination).await {
            Ok(written) => written,
            Err(e) => {
                discard(&partial).await;
                return Err(e);
            }
        };

        debug!(url, bytes = written, "Fetched granule");
        Ok(written)
    }
}
