//! Flat record types

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Number, Value};

/// A single flat value: text, number, or null
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Scalar {
    /// Absent or null in the source
    #[default]
    Null,
    /// Text value
    Text(String),
    /// Numeric value
    Number(Number),
}

impl Scalar {
    /// Convert a JSON value found in a scalar position
    ///
    /// Booleans become text. Arrays and objects are kept as their JSON
    /// encoding so nothing is dropped.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::String(s) => Self::Text(s.clone()),
            Value::Number(n) => Self::Number(n.clone()),
            Value::Bool(b) => Self::Text(b.to_string()),
            Value::Array(_) | Value::Object(_) => Self::Text(value.to_string()),
        }
    }

    /// Create a text scalar
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Check if this is null
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Text content, if this is text
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Integer content, if this is an integral number
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    /// Float content, if this is a number
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    /// Render as a JSON value
    pub fn to_json(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Text(s) => Value::String(s.clone()),
            Self::Number(n) => Value::Number(n.clone()),
        }
    }
}

impl From<Option<String>> for Scalar {
    fn from(value: Option<String>) -> Self {
        value.map_or(Self::Null, Self::Text)
    }
}

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_none(),
            Self::Text(s) => serializer.serialize_str(s),
            Self::Number(n) => n.serialize(serializer),
        }
    }
}

/// A single-level record with ordered, named scalar fields
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FlatRecord {
    fields: Vec<(String, Scalar)>,
}

impl FlatRecord {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field
    pub fn push(&mut self, name: impl Into<String>, value: Scalar) {
        self.fields.push((name.into(), value));
    }

    /// Get a field by name
    pub fn get(&self, name: &str) -> Option<&Scalar> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Field names in order
    pub fn names(&self) -> Vec<&str> {
        self.fields.iter().map(|(n, _)| n.as_str()).collect()
    }

    /// Iterate over fields in order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Scalar)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the record has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Render as a JSON object
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.fields
                .iter()
                .map(|(n, v)| (n.clone(), v.to_json()))
                .collect(),
        )
    }
}

impl<N: Into<String>> FromIterator<(N, Scalar)> for FlatRecord {
    fn from_iter<I: IntoIterator<Item = (N, Scalar)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(|(n, v)| (n.into(), v)).collect(),
        }
    }
}

impl Serialize for FlatRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
