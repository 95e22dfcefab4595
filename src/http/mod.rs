//! HTTP client module
//!
//! Provides the shared HTTP session used by the paginator.
//!
//! # Features
//!
//! - **Single request semantics**: one GET per call, no hidden retries
//! - **Failure classification**: transport, rejection, and decode errors
//! - **Rate Limiting**: Token bucket rate limiter using governor
//! - **Authentication**: Bearer token on every request

mod client;
mod rate_limit;

pub(crate) use client::strip_query;
pub use client::{HttpClient, HttpClientConfig, HttpClientConfigBuilder, RequestConfig};
pub use rate_limit::{RateLimiter, RateLimiterConfig};
