//! Retry logic with exponential backoff for transient download failures.
//!
//! A failed fetch is classified into a [`FailureType`]; the [`RetryPolicy`]
//! then decides whether to retry and with what delay. Server error statuses
//! are treated as transient here: the catalog's front end intermittently
//! returns 5xx (and the occasional stray 4xx) under load, and a capped
//! backoff recovers most of them.
//!
//! # Example
//!
//! ```
//! use peraturan_dl::download::{
//!     DownloadError, FailureType, RetryDecision, RetryPolicy, classify_error,
//! };
//!
//! let policy = RetryPolicy::default();
//! let error = DownloadError::server_status("https://peraturan.go.id/cari", 503);
//!
//! match policy.should_retry(classify_error(&error), 1) {
//!     RetryDecision::Retry { delay, attempt } => {
//!         println!("retrying in {delay:?} (attempt {attempt})");
//!     }
//!     RetryDecision::DoNotRetry { reason } => println!("giving up: {reason}"),
//! }
//! ```

use std::time::{Duration, SystemTime};

use rand::Rng;
use tracing::{debug, instrument};

use super::DownloadError;

/// Default maximum attempts (including the initial attempt).
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default base delay for exponential backoff.
const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);

/// Default maximum delay cap.
const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(32);

/// Default backoff multiplier (doubles each attempt).
const DEFAULT_BACKOFF_MULTIPLIER: f32 = 2.0;

/// Maximum jitter added to delays.
const MAX_JITTER: Duration = Duration::from_millis(500);

/// Ceiling applied to server-supplied Retry-After values.
const MAX_RETRY_AFTER: Duration = Duration::from_secs(300);

/// Classification of download failure types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureType {
    /// Temporary failure that may succeed on retry.
    ///
    /// Network timeouts, connection errors, and non-429 error statuses.
    Transient,

    /// Failure that won't succeed regardless of retries.
    ///
    /// Local IO errors, invalid URLs, empty document bodies.
    Permanent,

    /// Server rate limiting (HTTP 429); honors Retry-After when present.
    RateLimited,
}

/// Decision on whether to retry a failed download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    /// Retry after the specified delay.
    Retry {
        /// How long to wait before retrying.
        delay: Duration,
        /// The attempt number this will be (1-indexed).
        attempt: u32,
    },

    /// Do not retry.
    DoNotRetry {
        /// Human-readable reason why retry is not attempted.
        reason: String,
    },
}

/// Configuration for retry behavior with exponential backoff.
///
/// Delay formula: `min(base_delay * multiplier^(attempt-1), max_delay) +
/// jitter`. With defaults the delays are roughly 1s, 2s before the attempt
/// budget runs out.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the initial attempt).
    max_attempts: u32,

    /// Base delay for the first retry.
    base_delay: Duration,

    /// Maximum delay cap.
    max_delay: Duration,

    /// Multiplier applied each attempt.
    backoff_multiplier: f32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
            backoff_multiplier: DEFAULT_BACKOFF_MULTIPLIER,
        }
    }
}

impl RetryPolicy {
    /// Creates a retry policy with custom settings; `max_attempts` is
    /// clamped to at least 1.
    #[must_use]
    pub fn new(
        max_attempts: u32,
        base_delay: Duration,
        max_delay: Duration,
        backoff_multiplier: f32,
    ) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay,
            backoff_multiplier,
        }
    }

    /// Creates a policy with a custom attempt budget, defaults otherwise.
    #[must_use]
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..Self::default()
        }
    }

    /// Returns the maximum number of attempts configured.
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Determines whether to retry after the given failed attempt
    /// (1-indexed).
    #[instrument(skip(self), fields(max_attempts = self.max_attempts))]
    pub fn should_retry(&self, failure_type: FailureType, attempt: u32) -> RetryDecision {
        match failure_type {
            FailureType::Permanent => {
                return RetryDecision::DoNotRetry {
                    reason: "permanent failure - retry would not help".to_string(),
                };
            }
            FailureType::Transient | FailureType::RateLimited => {}
        }

        if attempt >= self.max_attempts {
            debug!(attempt, max = self.max_attempts, "max attempts reached");
            return RetryDecision::DoNotRetry {
                reason: format!("max attempts ({}) exhausted", self.max_attempts),
            };
        }

        let delay = self.calculate_delay(attempt);
        debug!(
            attempt,
            next_attempt = attempt + 1,
            delay_ms = delay.as_millis(),
            "will retry"
        );

        RetryDecision::Retry {
            delay,
            attempt: attempt + 1,
        }
    }

    /// Calculates the backoff delay for a retry of the given attempt.
    fn calculate_delay(&self, attempt: u32) -> Duration {
        let base_ms = self.base_delay.as_millis() as f64;
        let multiplier = f64::from(self.backoff_multiplier);

        // attempt is 1-indexed; the first retry waits one base delay.
        let exponent = f64::from(attempt.saturating_sub(1));
        let delay_ms = base_ms * multiplier.powf(exponent);
        let capped_ms = delay_ms.min(self.max_delay.as_millis() as f64);

        Duration::from_millis(capped_ms as u64) + jitter()
    }
}

/// Random jitter between 0 and [`MAX_JITTER`], spreading simultaneous
/// retries apart.
fn jitter() -> Duration {
    let mut rng = rand::thread_rng();
    Duration::from_millis(rng.gen_range(0..=MAX_JITTER.as_millis() as u64))
}

/// Classifies a download error for retry decisions.
///
/// Any non-success status except 429 is transient: the catalog is a single
/// shared host and its error statuses rarely reflect the document itself.
/// Local errors (IO, invalid URL, empty body) never benefit from retry.
#[instrument]
pub fn classify_error(error: &DownloadError) -> FailureType {
    match error {
        DownloadError::ServerStatus { status: 429, .. } => FailureType::RateLimited,
        DownloadError::ServerStatus { .. }
        | DownloadError::Timeout { .. }
        | DownloadError::Transport { .. } => FailureType::Transient,
        DownloadError::Io { .. }
        | DownloadError::InvalidUrl { .. }
        | DownloadError::EmptyDocument { .. } => FailureType::Permanent,
    }
}

/// Parses a Retry-After header value into a wait duration.
///
/// Accepts both the delta-seconds form (`"120"`) and the HTTP-date form
/// (`"Wed, 21 Oct 2026 07:28:00 GMT"`); the result is capped at five
/// minutes. Returns `None` for unparseable values and dates in the past.
#[must_use]
pub fn retry_after_duration(value: &str) -> Option<Duration> {
    let value = value.trim();
    if let Ok(seconds) = value.parse::<u64>() {
        return Some(Duration::from_secs(seconds).min(MAX_RETRY_AFTER));
    }
    let date = httpdate::parse_http_date(value).ok()?;
    date.duration_since(SystemTime::now())
        .ok()
        .map(|d| d.min(MAX_RETRY_AFTER))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_policy_default_values() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.base_delay, Duration::from_secs(1));
        assert_eq!(policy.max_delay, Duration::from_secs(32));
        assert!((policy.backoff_multiplier - 2.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_retry_policy_max_attempts_minimum_is_one() {
        assert_eq!(RetryPolicy::with_max_attempts(0).max_attempts(), 1);
    }

    #[test]
    fn test_delay_doubles_per_attempt() {
        let policy = RetryPolicy::new(5, Duration::from_secs(1), Duration::from_secs(32), 2.0);
        let first = policy.calculate_delay(1);
        assert!(first >= Duration::from_secs(1) && first <= Duration::from_millis(1500));
        let second = policy.calculate_delay(2);
        assert!(second >= Duration::from_secs(2) && second <= Duration::from_millis(2500));
        let third = policy.calculate_delay(3);
        assert!(third >= Duration::from_secs(4) && third <= Duration::from_millis(4500));
    }

    #[test]
    fn test_delay_respects_cap() {
        let policy = RetryPolicy::new(10, Duration::from_secs(1), Duration::from_secs(5), 2.0);
        let delay = policy.calculate_delay(6);
        assert!(delay >= Duration::from_secs(5));
        assert!(delay <= Duration::from_millis(5500));
    }

    #[test]
    fn test_jitter_within_bounds() {
        for _ in 0..100 {
            assert!(jitter() <= MAX_JITTER);
        }
    }

    #[test]
    fn test_classify_429_rate_limited() {
        let error = DownloadError::server_status("https://peraturan.go.id/cari", 429);
        assert_eq!(classify_error(&error), FailureType::RateLimited);
    }

    #[test]
    fn test_classify_server_statuses_transient() {
        for status in [404, 500, 502, 503, 504] {
            let error = DownloadError::server_status("https://peraturan.go.id/cari", status);
            assert_eq!(
                classify_error(&error),
                FailureType::Transient,
                "status {status}"
            );
        }
    }

    #[test]
    fn test_classify_timeout_transient() {
        let error = DownloadError::timeout("https://peraturan.go.id/cari");
        assert_eq!(classify_error(&error), FailureType::Transient);
    }

    #[test]
    fn test_classify_local_errors_permanent() {
        let io = DownloadError::io(
            "/tmp/x.pdf",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(classify_error(&io), FailureType::Permanent);
        assert_eq!(
            classify_error(&DownloadError::invalid_url("nope")),
            FailureType::Permanent
        );
        assert_eq!(
            classify_error(&DownloadError::empty_document("https://x/y.pdf")),
            FailureType::Permanent
        );
    }

    #[test]
    fn test_should_retry_permanent_does_not_retry() {
        let decision = RetryPolicy::default().should_retry(FailureType::Permanent, 1);
        assert!(matches!(decision, RetryDecision::DoNotRetry { .. }));
    }

    #[test]
    fn test_should_retry_respects_attempt_budget() {
        let policy = RetryPolicy::with_max_attempts(3);
        assert!(matches!(
            policy.should_retry(FailureType::Transient, 1),
            RetryDecision::Retry { attempt: 2, .. }
        ));
        assert!(matches!(
            policy.should_retry(FailureType::Transient, 2),
            RetryDecision::Retry { attempt: 3, .. }
        ));
        assert!(matches!(
            policy.should_retry(FailureType::Transient, 3),
            RetryDecision::DoNotRetry { .. }
        ));
    }

    #[test]
    fn test_retry_after_seconds_form() {
        assert_eq!(retry_after_duration("120"), Some(Duration::from_secs(120)));
        assert_eq!(retry_after_duration(" 5 "), Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_retry_after_capped_at_five_minutes() {
        assert_eq!(retry_after_duration("86400"), Some(Duration::from_secs(300)));
    }

    #[test]
    fn test_retry_after_http_date_in_past_is_none() {
        assert_eq!(retry_after_duration("Wed, 21 Oct 2015 07:28:00 GMT"), None);
    }

    #[test]
    fn test_retry_after_garbage_is_none() {
        assert_eq!(retry_after_duration("soon"), None);
        assert_eq!(retry_after_duration(""), None);
    }
}
