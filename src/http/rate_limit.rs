//! Request quota
//!
//! An optional account-wide cap on request rate, enforced with a governor
//! token bucket. It sits on top of the fixed delay between pages.

use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::Quota;
use std::num::NonZeroU32;
use std::sync::Arc;

type DirectLimiter = governor::RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Request quota settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimiterConfig {
    /// Sustained requests per second
    pub requests_per_second: u32,
    /// Requests allowed back to back before throttling starts
    pub burst_size: u32,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self::per_second(5)
    }
}

impl RateLimiterConfig {
    /// Quota of `requests_per_second` with bursts of `burst_size`
    pub fn new(requests_per_second: u32, burst_size: u32) -> Self {
        Self {
            requests_per_second,
            burst_size,
        }
    }

    /// Quota of `n` requests per second, bursting up to `n`
    pub fn per_second(n: u32) -> Self {
        Self::new(n, n)
    }

    /// Governor quota; zero rates and bursts count as one
    fn quota(&self) -> Quota {
        let at_least_one = |n: u32| NonZeroU32::new(n).unwrap_or(NonZeroU32::MIN);
        Quota::per_second(at_least_one(self.requests_per_second))
            .allow_burst(at_least_one(self.burst_size))
    }
}

/// Shared token bucket; clones draw from the same quota
#[derive(Clone)]
pub struct RateLimiter {
    bucket: Arc<DirectLimiter>,
}

impl RateLimiter {
    /// Create a limiter enforcing `config`
    pub fn new(config: &RateLimiterConfig) -> Self {
        Self {
            bucket: Arc::new(DirectLimiter::direct(config.quota())),
        }
    }

    /// Wait for a request slot
    pub async fn wait(&self) {
        self.bucket.until_ready().await;
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter").finish_non_exhaustive()
    }
}
