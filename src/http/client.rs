//! HTTP client for the remote API
//!
//! Provides a reusable HTTP session that handles:
//! - Bearer authentication
//! - Optional rate limiting to prevent API throttling
//! - Classification of failures into transport, rejection, and decode errors
//!
//! The client never retries. Retrying is a decision of the calling layer.

use super::rate_limit::{RateLimiter, RateLimiterConfig};
use crate::decode::decode_error_body;
use crate::error::{Error, Result};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Session-wide settings of the HTTP client
#[derive(Clone)]
pub struct HttpClientConfig {
    /// Prefix for locators that are not absolute URLs
    pub base_url: Option<String>,
    /// Timeout applied when a request sets none
    pub timeout: Duration,
    /// Optional request quota
    pub rate_limit: Option<RateLimiterConfig>,
    /// Access token sent as `Authorization: Bearer`
    pub bearer_token: Option<String>,
    /// Value of the `User-Agent` header
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout: Duration::from_secs(90),
            rate_limit: None,
            bearer_token: None,
            user_agent: format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
        }
    }
}

impl std::fmt::Debug for HttpClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClientConfig")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("rate_limit", &self.rate_limit)
            .field("has_bearer_token", &self.bearer_token.is_some())
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl HttpClientConfig {
    /// Start from the defaults
    pub fn builder() -> HttpClientConfigBuilder {
        HttpClientConfigBuilder::default()
    }
}

/// Builder for [`HttpClientConfig`]
#[derive(Default)]
pub struct HttpClientConfigBuilder {
    config: HttpClientConfig,
}

impl HttpClientConfigBuilder {
    /// Resolve relative locators against `url`
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = Some(url.into());
        self
    }

    /// Session-wide request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Enforce a request quota
    pub fn rate_limit(mut self, quota: RateLimiterConfig) -> Self {
        self.config.rate_limit = Some(quota);
        self
    }

    /// Send requests without a quota
    pub fn no_rate_limit(mut self) -> Self {
        self.config.rate_limit = None;
        self
    }

    /// Authenticate every request with `token`
    pub fn bearer_token(mut self, token: impl Into<String>) -> Self {
        self.config.bearer_token = Some(token.into());
        self
    }

    /// Override the `User-Agent` header
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Finish the configuration
    pub fn build(self) -> HttpClientConfig {
        self.config
    }
}

/// Per-request options
#[derive(Debug, Clone, Default)]
pub struct RequestConfig {
    /// Query parameters, in order
    pub query: Vec<(String, String)>,
    /// Timeout overriding the session timeout
    pub timeout: Option<Duration>,
}

impl RequestConfig {
    /// No query and the session timeout
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a query parameter
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Override the timeout
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// HTTP session shared by every job of a run
pub struct HttpClient {
    session: Client,
    config: HttpClientConfig,
    quota: Option<RateLimiter>,
}

impl HttpClient {
    /// Client with the default settings
    pub fn new() -> Result<Self> {
        Self::with_config(HttpClientConfig::default())
    }

    /// Client with the given settings
    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        let session = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .build()?;
        let quota = config.rate_limit.as_ref().map(RateLimiter::new);

        Ok(Self {
            session,
            config,
            quota,
        })
    }

    /// GET `url` and parse the body as JSON
    pub async fn get_json(&self, url: &str, request: RequestConfig) -> Result<Value> {
        let body = self.get_text(url, request).await?;
        serde_json::from_str(&body)
            .map_err(|e| Error::malformed(format!("Failed to parse JSON: {e}")))
    }

    /// GET `url` once and return the body of a 2xx/3xx response
    ///
    /// Query parameters are only attached when present, so a continuation
    /// URL is requested exactly as the server returned it. A 4xx/5xx answer
    /// becomes [`Error::RemoteRejected`] with the decoded error body.
    pub async fn get_text(&self, url: &str, request: RequestConfig) -> Result<String> {
        let target = self.build_url(url);
        let timeout = request.timeout.unwrap_or(self.config.timeout);

        if let Some(quota) = &self.quota {
            quota.wait().await;
        }

        let mut builder = self.session.get(&target).timeout(timeout);
        if let Some(token) = &self.config.bearer_token {
            builder = builder.bearer_auth(token);
        }
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| classify_transport(e, timeout))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| classify_transport(e, timeout))?;

        debug!("GET {} -> {}", strip_query(&target), status.as_u16());

        if status.is_client_error() || status.is_server_error() {
            return Err(Error::remote_rejected(
                status.as_u16(),
                decode_error_body(&body),
            ));
        }
        Ok(body)
    }

    /// Build full URL from path
    pub fn build_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }

        match &self.config.base_url {
            Some(base) => {
                let base = base.trim_end_matches('/');
                let path = path.trim_start_matches('/');
                format!("{base}/{path}")
            }
            None => path.to_string(),
        }
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("base_url", &self.config.base_url)
            .field("timeout", &self.config.timeout)
            .field("has_bearer_token", &self.config.bearer_token.is_some())
            .field("has_rate_limiter", &self.quota.is_some())
            .finish_non_exhaustive()
    }
}

/// Map a reqwest failure onto the transport error variants
fn classify_transport(err: reqwest::Error, timeout: Duration) -> Error {
    if err.is_timeout() {
        Error::Timeout {
            timeout_ms: timeout.as_millis() as u64,
        }
    } else {
        Error::Transport(err)
    }
}

/// Drop the query string so tokens embedded in continuation URLs are not logged
pub(crate) fn strip_query(url: &str) -> &str {
    url.split_once('?').map_or(url, |(head, _)| head)
}
