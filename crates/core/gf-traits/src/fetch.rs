//! Granule transfer trait.

use async_trait::async_trait;
use gf_error::Result;
use std::path::Path;

/// Trait for granule transfer backends.
///
/// # Implementations
///
/// - HTTP fetcher with basic authentication
/// - In-memory fetchers for tests
#[async_trait]
pub trait GranuleFetcher: Send + Sync {
    /// Downloads the granule at `url` into `destination`.
    ///
    /// # Returns
    ///
    /// The number of bytes written
    async fn fetch(&self, url: &str, destination: &Path) -> Result<u64>;
}

#[async_trait]
impl<T: GranuleFetcher + ?Sized> GranuleFetcher for std::sync::Arc<T> {
    async fn fetch(&self, url: &str, destination: &Path) -> Result<u64> {
        (**self).fetch(url, destination).await
    }
}
