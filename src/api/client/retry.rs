//! Backoff schedule for backend calls.
//!
//! Reads are replayed on transient failures. `POST /chat` starts a run and
//! `DELETE /runs/{id}` removes one, so anything other than `GET` is sent
//! exactly once no matter what the policy allows.

use crate::error::ApiError;
use reqwest::Method;
use std::time::Duration;

/// Longest `Retry-After` the console will sit through.
const RETRY_AFTER_CAP_SECS: u64 = 300;

#[derive(Clone, Copy, Debug)]
pub(super) struct RetryPolicy {
    /// Attempts for a `GET`, counting the first one.
    pub(super) read_attempts: u32,
    pub(super) base_delay: Duration,
    pub(super) delay_cap: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            read_attempts: 3,
            base_delay: Duration::from_millis(250),
            delay_cap: Duration::from_secs(8),
        }
    }
}

impl RetryPolicy {
    pub(super) fn attempts_for(&self, method: &Method) -> u32 {
        if *method == Method::GET {
            self.read_attempts.max(1)
        } else {
            1
        }
    }

    /// How long to wait before replaying attempt number `attempt` (zero
    /// based) of a `method` request that failed with `err`, or `None` to
    /// give up and report `err`.
    pub(super) fn next_delay(
        &self,
        method: &Method,
        attempt: u32,
        err: &ApiError,
    ) -> Option<Duration> {
        if attempt.saturating_add(1) >= self.attempts_for(method) || !is_transient(err) {
            return None;
        }
        if let Some(seconds) = err.retry_after_secs() {
            return Some(Duration::from_secs(seconds.clamp(1, RETRY_AFTER_CAP_SECS)));
        }
        let factor = 2u128.saturating_pow(attempt);
        let millis = self
            .base_delay
            .as_millis()
            .saturating_mul(factor)
            .min(self.delay_cap.as_millis());
        Some(Duration::from_millis(millis as u64))
    }
}

/// Failures worth another read: the backend was busy, restarting or out of
/// reach. Client errors and undecodable bodies repeat identically.
fn is_transient(err: &ApiError) -> bool {
    match err {
        ApiError::Http(inner) => inner.is_timeout() || inner.is_connect(),
        ApiError::Status { code, .. } => *code == 429 || (500..=599).contains(code),
        ApiError::InvalidResponse(_) | ApiError::InvalidUrl(_) => false,
    }
}
