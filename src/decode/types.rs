//! Wire types for the remote API
//!
//! A successful page is a JSON object with a `data` array and an optional
//! `paging.next` continuation URL. A failed request carries an `error` object.

use crate::types::RawRecord;
use serde::{Deserialize, Serialize};

/// Maximum number of characters of a raw error body shown in messages
pub const RAW_BODY_DISPLAY_LIMIT: usize = 400;

/// One decoded page of results
///
/// Either the page has a continuation reference, or it is the terminal page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageEnvelope {
    /// Records in server order
    pub records: Vec<RawRecord>,
    /// Absolute URL of the next page, used verbatim
    pub next: Option<String>,
}

impl PageEnvelope {
    /// Create a terminal page
    pub fn terminal(records: Vec<RawRecord>) -> Self {
        Self {
            records,
            next: None,
        }
    }

    /// Create a page that continues at `next`
    pub fn continued(records: Vec<RawRecord>, next: impl Into<String>) -> Self {
        Self {
            records,
            next: Some(next.into()),
        }
    }

    /// Check if this is the last page
    pub fn is_terminal(&self) -> bool {
        self.next.is_none()
    }

    /// Number of records on this page
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if this page has no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// `paging` member of a page
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct Paging {
    #[serde(default)]
    pub next: Option<String>,
}

/// Page as it appears on the wire
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct WirePage {
    #[serde(default)]
    pub data: Option<Vec<RawRecord>>,
    #[serde(default)]
    pub paging: Option<Paging>,
}

/// Structured error payload returned by the remote API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteError {
    /// Numeric error code
    pub code: i64,
    /// Human-readable message
    pub message: String,
    /// Error class (e.g. "OAuthException")
    #[serde(rename = "type", default)]
    pub error_type: Option<String>,
    /// Finer-grained error code
    #[serde(default)]
    pub error_subcode: Option<i64>,
    /// Server trace identifier
    #[serde(default)]
    pub fbtrace_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub error: RemoteError,
}

/// Best-effort decoded body of a rejected request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteErrorBody {
    /// The body carried a structured `error` object
    Structured(RemoteError),
    /// The body was not a structured error; raw response text
    Raw(String),
}

impl RemoteErrorBody {
    /// Numeric error code, if structured
    pub fn code(&self) -> Option<i64> {
        match self {
            Self::Structured(e) => Some(e.code),
            Self::Raw(_) => None,
        }
    }

    /// Error message, if structured
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Structured(e) => Some(e.message.as_str()),
            Self::Raw(_) => None,
        }
    }
}

impl std::fmt::Display for RemoteErrorBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Structured(e) => {
                write!(f, "code {}", e.code)?;
                if let Some(subcode) = e.error_subcode {
                    write!(f, "/{subcode}")?;
                }
                if let Some(kind) = &e.error_type {
                    write!(f, " ({kind})")?;
                }
                write!(f, ": {}", e.message)
            }
            Self::Raw(text) => {
                if text.chars().count() > RAW_BODY_DISPLAY_LIMIT {
                    let head: String = text.chars().take(RAW_BODY_DISPLAY_LIMIT).collect();
                    write!(f, "{head}...")
                } else {
                    f.write_str(text)
                }
            }
        }
    }
}
