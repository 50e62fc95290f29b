//! Retry policy for granule transfers.
//!
//! The wait before another attempt depends on why the previous one failed:
//! permanent errors are never repeated, throttling answers back off from a
//! longer base than other transient failures.

use gf_error::{classify_error, DownloadError, ErrorCategory, GfError, ListingError};
use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

/// Why a failed attempt is worth repeating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryReason {
    /// The server asked to slow down (HTTP 429)
    Throttled,
    /// Any other transient failure: 5xx, timeout, dropped connection
    Unavailable,
}

impl RetryReason {
    /// Reason to retry after `error`, `None` when it is permanent.
    pub fn of(error: &GfError) -> Option<Self> {
        if classify_error(error) == ErrorCategory::Permanent {
            return None;
        }
        match error {
            GfError::Download(DownloadError::Status { status: 429, .. })
            | GfError::Listing(ListingError::Status { status: 429, .. }) => Some(Self::Throttled),
            _ => Some(Self::Unavailable),
        }
    }
}

/// How many times, and how long apart, a transfer is attempted.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// First delay after a transient failure, doubled on each retry.
    pub initial_delay: Duration,
    /// First delay after a throttling answer, doubled on each retry.
    pub throttle_delay: Duration,
    /// Upper bound of any delay.
    pub max_delay: Duration,
    /// Draw each delay at random between half and all of its nominal value.
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(200),
            throttle_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(30),
            jitter: true,
        }
    }
}

impl RetryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Single attempt, no retry.
    pub fn disabled() -> Self {
        Self::default().with_max_retries(0)
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_initial_delay(mut self, initial_delay: Duration) -> Self {
        self.initial_delay = initial_delay;
        self
    }

    pub fn with_throttle_delay(mut self, throttle_delay: Duration) -> Self {
        self.throttle_delay = throttle_delay;
        self
    }

    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    /// Delay before retrying once attempt number `attempt` (from 0) failed
    /// with `error`.
    ///
    /// Returns `None` when the error is permanent or the retries are spent.
    pub fn delay_for(&self, attempt: u32, error: &GfError) -> Option<Duration> {
        if attempt >= self.max_retries {
            return None;
        }
        let base = match RetryReason::of(error)? {
            RetryReason::Throttled => self.throttle_delay,
            RetryReason::Unavailable => self.initial_delay,
        };

        let nominal = 1u32
            .checked_shl(attempt)
            .and_then(|factor| base.checked_mul(factor))
            .map_or(self.max_delay, |delay| delay.min(self.max_delay));

        Some(if self.jitter { spread(nominal) } else { nominal })
    }
}

/// Random delay in `[delay / 2, delay]`.
fn spread(delay: Duration) -> Duration {
    let half = delay / 2;
    half + half.mul_f64(rand::rng().random_range(0.0..=1.0))
}

/// Run `operation` until it succeeds, fails permanently, or runs out of
/// retries. The last error is returned when every attempt failed.
pub async fn with_retry<F, Fut, T>(
    config: &RetryConfig,
    operation_name: &str,
    mut operation: F,
) -> Result<T, GfError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, GfError>>,
{
    let mut attempt = 0;
    loop {
        let error = match operation().await {
            Ok(result) => return Ok(result),
            Err(e) => e,
        };

        let Some(delay) = config.delay_for(attempt, &error) else {
            warn!(
                operation = operation_name,
                attempts = attempt + 1,
                error = %error,
                "Giving up"
            );
            return Err(error);
        };

        warn!(
            operation = operation_name,
            attempt,
            error = %error,
            delay_ms = delay.as_millis(),
            "Transient failure, retrying"
        );
        sleep(delay).await;
        attempt += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn status(status: u16) -> GfError {
        DownloadError::Status {
            url: "http://host/a.nc".to_string(),
            status,
        }
        .into()
    }

    fn steady() -> RetryConfig {
        RetryConfig::new()
            .with_max_retries(5)
            .with_initial_delay(Duration::from_millis(100))
            .with_throttle_delay(Duration::from_secs(1))
            .with_max_delay(Duration::from_secs(3))
            .with_jitter(false)
    }

    #[test]
    fn test_defaults() {
        let config = RetryConfig::default();
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.initial_delay, Duration::from_millis(200));
        assert!(config.jitter);
        assert_eq!(RetryConfig::disabled().max_retries, 0);
    }

    #[test]
    fn test_reason_follows_classification() {
        assert_eq!(RetryReason::of(&status(429)), Some(RetryReason::Throttled));
        assert_eq!(RetryReason::of(&status(503)), Some(RetryReason::Unavailable));
        assert_eq!(RetryReason::of(&status(404)), None);
        assert_eq!(
            RetryReason::of(&GfError::Config("bad layout".to_string())),
            None
        );

        let listing: GfError = ListingError::Status {
            url: "http://host/catalog.xml".to_string(),
            status: 429,
        }
        .into();
        assert_eq!(RetryReason::of(&listing), Some(RetryReason::Throttled));
    }

    #[test]
    fn test_unavailable_delay_doubles() {
        let config = steady();
        let error = status(503);

        assert_eq!(config.delay_for(0, &error), Some(Duration::from_millis(100)));
        assert_eq!(config.delay_for(1, &error), Some(Duration::from_millis(200)));
        assert_eq!(config.delay_for(3, &error), Some(Duration::from_millis(800)));
    }

    #[test]
    fn test_throttled_delay_starts_higher_and_is_capped() {
        let config = steady();
        let error = status(429);

        assert_eq!(config.delay_for(0, &error), Some(Duration::from_secs(1)));
        assert_eq!(config.delay_for(1, &error), Some(Duration::from_secs(2)));
        assert_eq!(config.delay_for(2, &error), Some(Duration::from_secs(3)));
    }

    #[test]
    fn test_huge_attempt_is_capped() {
        let config = steady().with_max_retries(u32::MAX);
        assert_eq!(
            config.delay_for(40, &status(500)),
            Some(Duration::from_secs(3))
        );
    }

    #[test]
    fn test_no_delay_when_permanent_or_exhausted() {
        let config = steady();
        assert_eq!(config.delay_for(0, &status(404)), None);
        assert_eq!(config.delay_for(5, &status(503)), None);
        assert_eq!(RetryConfig::disabled().delay_for(0, &status(503)), None);
    }

    #[test]
    fn test_jitter_bounds() {
        let config = steady().with_jitter(true);
        for _ in 0..50 {
            let delay = config.delay_for(2, &status(502)).unwrap();
            assert!(delay >= Duration::from_millis(200));
            assert!(delay <= Duration::from_millis(400));
        }
    }

    #[tokio::test]
    async fn test_with_retry_success_after_transient_errors() {
        let config = RetryConfig::new()
            .with_initial_delay(Duration::from_millis(1))
            .with_jitter(false);
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result = with_retry(&config, "fetch", || {
            let count = counter.fetch_add(1, Ordering::SeqCst);
            async move {
                if count < 2 {
                    Err(status(503))
                } else {
                    Ok(42)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_with_retry_permanent_error() {
        let config = RetryConfig::new();
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result: Result<(), _> = with_retry(&config, "fetch", || {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Err(status(404)) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_with_retry_gives_up() {
        let config = RetryConfig::new()
            .with_max_retries(2)
            .with_initial_delay(Duration::from_millis(1))
            .with_jitter(false);
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result: Result<(), _> = with_retry(&config, "fetch", || {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Err(status(500)) }
        })
        .await;

        assert!(matches!(
            result,
            Err(GfError::Download(DownloadError::Status { status: 500, .. }))
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
