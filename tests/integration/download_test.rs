//! Discovery followed by bulk downloads.

use crate::common::{discoverer, FakeFetcher, FILE_SERVER};
use gf_discoverer::Product;
use gf_downloader::{BulkDownloader, DownloadConfig, RetryConfig};
use gf_types::Filters;
use std::sync::Arc;
use std::time::Duration;

fn url(path: &str) -> String {
    format!("{FILE_SERVER}{path}")
}

fn product_a_urls() -> Vec<String> {
    discoverer()
        .filter_granules(
            &Product::new("productA"),
            &Filters::new().with("cycle_number", 2),
        )
        .unwrap()
}

fn fast_retries() -> RetryConfig {
    RetryConfig::new()
        .with_max_retries(2)
        .with_initial_delay(Duration::from_millis(1))
        .with_max_delay(Duration::from_millis(2))
}

#[tokio::test]
async fn test_discovered_granules_are_downloaded() {
    let dir = tempfile::tempdir().unwrap();
    let fetcher = FakeFetcher::new()
        .with_body(url("productA_path/cycle_02/dataset_02.nc"), b"first")
        .with_body(url("productA_path/cycle_02/dataset_22.nc"), b"second");

    let downloader = BulkDownloader::new(fetcher, DownloadConfig::new());
    let report = downloader
        .download_all(&product_a_urls(), dir.path())
        .await
        .unwrap();

    assert!(report.is_success());
    assert_eq!(report.bytes, 11);
    assert_eq!(
        std::fs::read(dir.path().join("dataset_02.nc")).unwrap(),
        b"first"
    );
    assert_eq!(
        std::fs::read(dir.path().join("dataset_22.nc")).unwrap(),
        b"second"
    );
}

#[tokio::test]
async fn test_second_run_skips_existing_files() {
    let dir = tempfile::tempdir().unwrap();
    let fetcher = Arc::new(
        FakeFetcher::new()
            .with_body(url("productA_path/cycle_02/dataset_02.nc"), b"first")
            .with_body(url("productA_path/cycle_02/dataset_22.nc"), b"second"),
    );
    let urls = product_a_urls();

    let downloader = BulkDownloader::new(Arc::clone(&fetcher), DownloadConfig::new());
    downloader.download_all(&urls, dir.path()).await.unwrap();
    let report = downloader.download_all(&urls, dir.path()).await.unwrap();

    assert!(report.downloaded.is_empty());
    assert_eq!(report.skipped.len(), 2);
    assert_eq!(fetcher.calls().len(), 2);
}

#[tokio::test]
async fn test_failures_are_reported_and_transient_ones_retried() {
    let dir = tempfile::tempdir().unwrap();
    let flaky = url("productA_path/cycle_02/dataset_02.nc");
    let missing = url("productA_path/cycle_02/dataset_22.nc");
    let fetcher = Arc::new(
        FakeFetcher::new()
            .with_body(flaky.clone(), b"eventually")
            .with_failures(flaky.clone(), 2),
    );

    let config = DownloadConfig::new().with_retry(fast_retries());
    let downloader = BulkDownloader::new(Arc::clone(&fetcher), config);
    let report = downloader
        .download_all(&product_a_urls(), dir.path())
        .await
        .unwrap();

    assert!(!report.is_success());
    assert_eq!(report.downloaded.len(), 1);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].url, missing);
    assert!(report.failures[0].error.contains("404"));

    let calls = fetcher.calls();
    assert_eq!(calls.iter().filter(|c| **c == flaky).count(), 3);
    assert_eq!(calls.iter().filter(|c| **c == missing).count(), 1);
}
