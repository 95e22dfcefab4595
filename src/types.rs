//! Common types used throughout ads-extract
//!
//! This module contains shared type definitions, type aliases,
//! and utility types used across multiple modules.

use serde::{Deserialize, Serialize};

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// JSON object type
pub type JsonObject = serde_json::Map<String, JsonValue>;

/// One record as returned by the remote API, arbitrarily nested
pub type RawRecord = JsonValue;

/// Name of a JSON value's type, for error messages
pub fn json_type_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

// ============================================================================
// Backoff Type
// ============================================================================

/// Backoff strategy between job retries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackoffType {
    /// Constant delay between retries
    Constant,
    /// Linear increase in delay
    #[default]
    Linear,
    /// Exponential increase in delay
    Exponential,
}

// ============================================================================
// Output Format
// ============================================================================

/// File format written by the file sink
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Comma-separated values with a header row
    #[default]
    Csv,
    /// Parquet (Snappy compressed)
    Parquet,
    /// JSON Lines, one object per row
    Json,
}

impl OutputFormat {
    /// File extension for this format
    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Parquet => "parquet",
            Self::Json => "jsonl",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_type_serde() {
        let backoff: BackoffType = serde_json::from_str("\"exponential\"").unwrap();
        assert_eq!(backoff, BackoffType::Exponential);
        assert_eq!(BackoffType::default(), BackoffType::Linear);
    }

    #[test]
    fn test_output_format_extension() {
        assert_eq!(OutputFormat::Csv.extension(), "csv");
        assert_eq!(OutputFormat::Parquet.extension(), "parquet");
        assert_eq!(OutputFormat::Json.extension(), "jsonl");

        let format: OutputFormat = serde_yaml::from_str("parquet").unwrap();
        assert_eq!(format, OutputFormat::Parquet);
    }
}
