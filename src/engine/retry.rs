//! Job-level retry policy
//!
//! The paginator never retries. A job that fails with a retryable error is
//! re-run from its first page; every request is a GET, so repeating it is safe.

use crate::error::Error;
use crate::types::BackoffType;
use std::time::Duration;

/// How many times, and how patiently, a failed job is re-run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: u32,
    backoff_type: BackoffType,
    initial_backoff: Duration,
    max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            backoff_type: BackoffType::Linear,
            initial_backoff: Duration::from_secs(2),
            max_backoff: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Policy with `max_retries` retries and the default backoff
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Self::default()
        }
    }

    /// Policy that never retries
    pub fn none() -> Self {
        Self::new(0)
    }

    /// Set the backoff strategy
    #[must_use]
    pub fn with_backoff(mut self, backoff_type: BackoffType, initial: Duration, max: Duration) -> Self {
        self.backoff_type = backoff_type;
        self.initial_backoff = initial;
        self.max_backoff = max;
        self
    }

    /// Retries after the first attempt
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Total attempts allowed
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Whether a job that failed on `attempt` (1-based) with `error` runs again
    pub fn should_retry(&self, attempt: u32, error: &Error) -> bool {
        attempt < self.max_attempts() && error.is_retryable()
    }

    /// Delay before retry number `retry` (0-based)
    pub fn backoff(&self, retry: u32) -> Duration {
        let delay = match self.backoff_type {
            BackoffType::Constant => self.initial_backoff,
            BackoffType::Linear => self.initial_backoff.saturating_mul(retry.saturating_add(1)),
            BackoffType::Exponential => self
                .initial_backoff
                .saturating_mul(2u32.saturating_pow(retry)),
        };
        delay.min(self.max_backoff)
    }
}
