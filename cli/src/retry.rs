//! Retry classification and backoff schedule for API calls.

use std::time::Duration;

use reqwest::StatusCode;

pub const DEFAULT_MAX_RETRIES: u32 = 3;

const BASE_DELAY_MS: u64 = 1000;
const MAX_DELAY_MS: u64 = 30_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_retries: DEFAULT_MAX_RETRIES }
    }
}

impl RetryPolicy {
    #[must_use]
    pub fn new(max_retries: u32) -> Self {
        Self { max_retries }
    }

    /// Whether another attempt is allowed after `attempt` (0-based) failed.
    #[must_use]
    pub fn allows_retry(self, attempt: u32) -> bool {
        attempt < self.max_retries
    }
}

/// Delay before retrying a failed `attempt` (0-based): 1 s, 2 s, 4 s, ...
/// capped at 30 s.
#[must_use]
pub fn backoff_delay(attempt: u32) -> Duration {
    let factor = 1_u64.checked_shl(attempt).unwrap_or(u64::MAX);
    Duration::from_millis(BASE_DELAY_MS.saturating_mul(factor).min(MAX_DELAY_MS))
}

/// Server-side and rate-limit statuses are worth another attempt; other
/// client errors are not.
#[must_use]
pub fn is_retryable_status(status: StatusCode) -> bool {
    status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS
}

/// Connection failures and timeouts are transient; request-building and
/// decode errors are not.
#[must_use]
pub fn is_transient(err: &reqwest::Error) -> bool {
    err.is_connect() || err.is_timeout() || (err.is_request() && !err.is_builder())
}

#[cfg(test)]
#[path = "retry_test.rs"]
mod tests;
