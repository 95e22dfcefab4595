//! Pagination types
//!
//! Query parameters attached to the first request of a page sequence.

use std::collections::BTreeMap;

/// Value of a single query parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    /// Plain text
    Text(String),
    /// Integer
    Number(i64),
    /// List of values, sent comma-joined
    List(Vec<String>),
}

impl ParamValue {
    /// Render the value as it is sent on the wire
    pub fn render(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Number(n) => n.to_string(),
            Self::List(items) => items.join(","),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        Self::Number(i64::from(value))
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(value: Vec<String>) -> Self {
        Self::List(value)
    }
}

impl From<&[&str]> for ParamValue {
    fn from(value: &[&str]) -> Self {
        Self::List(value.iter().map(|s| (*s).to_string()).collect())
    }
}

/// Ordered query parameter mapping
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    params: BTreeMap<String, ParamValue>,
}

impl QueryParams {
    /// Create an empty mapping
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a parameter, replacing any previous value
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        self.params.insert(key.into(), value.into());
    }

    /// Set a parameter (builder style)
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Get a parameter
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.params.get(key)
    }

    /// Remove all parameters
    pub fn clear(&mut self) {
        self.params.clear();
    }

    /// Check if there are no parameters
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Number of parameters
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Render as wire-level key/value pairs
    pub fn to_query(&self) -> Vec<(String, String)> {
        self.params
            .iter()
            .map(|(k, v)| (k.clone(), v.render()))
            .collect()
    }
}
