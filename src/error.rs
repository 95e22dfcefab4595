//! Error types for ads-extract
//!
//! This module defines the error hierarchy for the entire crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.
//!
//! Failures are grouped into the [`ErrorKind`] taxonomy so callers can decide
//! between retrying a job, skipping it, or treating the failure as fatal.

use crate::decode::RemoteErrorBody;
use serde::Serialize;
use thiserror::Error;

/// Graph API error code for an invalid parameter (including rejected breakdown combinations)
pub const INVALID_PARAMETER_CODE: i64 = 100;

/// The main error type for ads-extract
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Remote API Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Remote API rejected request with HTTP {status}: {body}")]
    RemoteRejected { status: u16, body: RemoteErrorBody },

    #[error("Malformed response: {message}")]
    MalformedResponse { message: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // Record Errors
    // ============================================================================
    #[error("Record contract violated: {message}")]
    ContractViolation { message: String },

    // ============================================================================
    // Arrow/Parquet Errors
    // ============================================================================
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Output error: {message}")]
    Output { message: String },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),
}

/// Classification of a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Network failure or timeout; the job may be retried
    Transport,
    /// The remote API answered with a 4xx/5xx status
    RemoteRejected,
    /// The response body could not be decoded
    MalformedResponse,
    /// A record did not have the required top-level shape
    ContractViolation,
    /// Configuration, output, or other local failure
    Local,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Transport => "transport",
            Self::RemoteRejected => "remote_rejected",
            Self::MalformedResponse => "malformed_response",
            Self::ContractViolation => "contract_violation",
            Self::Local => "local",
        };
        f.write_str(name)
    }
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Create an invalid config value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a remote rejection error
    pub fn remote_rejected(status: u16, body: RemoteErrorBody) -> Self {
        Self::RemoteRejected { status, body }
    }

    /// Create a malformed response error
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            message: message.into(),
        }
    }

    /// Create a contract violation error
    pub fn contract(message: impl Into<String>) -> Self {
        Self::ContractViolation {
            message: message.into(),
        }
    }

    /// Create an output error
    pub fn output(message: impl Into<String>) -> Self {
        Self::Output {
            message: message.into(),
        }
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Transport(_) | Error::Timeout { .. } => ErrorKind::Transport,
            Error::RemoteRejected { .. } => ErrorKind::RemoteRejected,
            Error::MalformedResponse { .. } => ErrorKind::MalformedResponse,
            Error::ContractViolation { .. } => ErrorKind::ContractViolation,
            _ => ErrorKind::Local,
        }
    }

    /// HTTP status of a remote rejection
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::RemoteRejected { status, .. } => Some(*status),
            Error::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Check if this is a rejection carrying the invalid-parameter error code
    pub fn is_invalid_parameter(&self) -> bool {
        match self {
            Error::RemoteRejected { body, .. } => body.code() == Some(INVALID_PARAMETER_CODE),
            _ => false,
        }
    }

    /// Check if this is an invalid-parameter rejection caused by the breakdown combination
    pub fn is_breakdown_rejection(&self) -> bool {
        match self {
            Error::RemoteRejected { body, .. } => {
                self.is_invalid_parameter()
                    && body
                        .message()
                        .is_some_and(|m| m.to_ascii_lowercase().contains("breakdown"))
            }
            _ => false,
        }
    }

    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Transport(_) | Error::Timeout { .. } => true,
            Error::RemoteRejected { status, .. } => {
                is_retryable_status(*status) && !self.is_invalid_parameter()
            }
            _ => false,
        }
    }
}

/// Check if an HTTP status code is retryable
fn is_retryable_status(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504)
}

/// Result type alias for ads-extract
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::RemoteError;

    fn structured(code: i64, message: &str) -> RemoteErrorBody {
        RemoteErrorBody::Structured(RemoteError {
            code,
            message: message.to_string(),
            error_type: Some("OAuthException".to_string()),
            error_subcode: None,
            fbtrace_id: None,
        })
    }

    #[test]
    fn test_error_display() {
        let err = Error::config("test message");
        assert_eq!(err.to_string(), "Configuration error: test message");

        let err = Error::missing_field("access_token");
        assert_eq!(
            err.to_string(),
            "Missing required config field: access_token"
        );

        let err = Error::remote_rejected(404, RemoteErrorBody::Raw("Not found".to_string()));
        assert_eq!(
            err.to_string(),
            "Remote API rejected request with HTTP 404: Not found"
        );
    }

    #[test]
    fn test_error_kind() {
        assert_eq!(
            Error::Timeout { timeout_ms: 10 }.kind(),
            ErrorKind::Transport
        );
        assert_eq!(
            Error::remote_rejected(400, RemoteErrorBody::Raw(String::new())).kind(),
            ErrorKind::RemoteRejected
        );
        assert_eq!(Error::malformed("x").kind(), ErrorKind::MalformedResponse);
        assert_eq!(Error::contract("x").kind(), ErrorKind::ContractViolation);
        assert_eq!(Error::output("x").kind(), ErrorKind::Local);
        assert_eq!(ErrorKind::RemoteRejected.to_string(), "remote_rejected");
    }

    #[test]
    fn test_is_retryable() {
        assert!(Error::Timeout { timeout_ms: 1000 }.is_retryable());
        assert!(Error::remote_rejected(429, RemoteErrorBody::Raw(String::new())).is_retryable());
        assert!(Error::remote_rejected(500, structured(2, "Service unavailable")).is_retryable());
        assert!(Error::remote_rejected(503, RemoteErrorBody::Raw(String::new())).is_retryable());

        assert!(!Error::remote_rejected(400, structured(100, "bad")).is_retryable());
        assert!(!Error::remote_rejected(401, RemoteErrorBody::Raw(String::new())).is_retryable());
        assert!(!Error::remote_rejected(500, structured(100, "bad")).is_retryable());
        assert!(!Error::malformed("oops").is_retryable());
        assert!(!Error::contract("not an object").is_retryable());
        assert!(!Error::config("test").is_retryable());
    }

    #[test]
    fn test_breakdown_rejection() {
        let err = Error::remote_rejected(
            400,
            structured(
                100,
                "(#100) Current combination of data breakdown columns (action_type, platform_position) is invalid",
            ),
        );
        assert!(err.is_invalid_parameter());
        assert!(err.is_breakdown_rejection());
        assert_eq!(err.status(), Some(400));

        let err = Error::remote_rejected(400, structured(100, "Tried accessing nonexisting field"));
        assert!(err.is_invalid_parameter());
        assert!(!err.is_breakdown_rejection());

        let err = Error::remote_rejected(400, structured(190, "Invalid OAuth access token"));
        assert!(!err.is_invalid_parameter());
        assert!(!err.is_breakdown_rejection());

        let err = Error::remote_rejected(400, RemoteErrorBody::Raw("breakdown".to_string()));
        assert!(!err.is_breakdown_rejection());
    }

    #[test]
    fn test_result_context() {
        let result: Result<()> = Err(Error::config("inner"));
        let with_context = result.context("outer");
        assert!(with_context
            .unwrap_err()
            .to_string()
            .contains("outer: Configuration error: inner"));
    }
}
