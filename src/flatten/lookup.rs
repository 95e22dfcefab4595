//! Null-safe lookups over nested JSON
//!
//! Every helper accepts an optional parent and yields nothing (or
//! [`Scalar::Null`]) when the parent is absent or a value has the wrong type.

use super::record::Scalar;
use crate::types::JsonObject;
use serde_json::Value;

/// Nested object under `key`, if present and an object
pub(crate) fn child<'a>(parent: Option<&'a JsonObject>, key: &str) -> Option<&'a JsonObject> {
    parent?.get(key)?.as_object()
}

/// Array under `key`, if present and an array
pub(crate) fn array<'a>(parent: Option<&'a JsonObject>, key: &str) -> Option<&'a [Value]> {
    parent?.get(key)?.as_array().map(Vec::as_slice)
}

/// Scalar under `key`, null when absent
pub(crate) fn scalar(parent: Option<&JsonObject>, key: &str) -> Scalar {
    parent
        .and_then(|p| p.get(key))
        .map_or(Scalar::Null, Scalar::from_json)
}

/// First value that is neither null nor empty text
pub(crate) fn first_present(candidates: impl IntoIterator<Item = Scalar>) -> Scalar {
    candidates
        .into_iter()
        .find(|s| !s.is_null() && s.as_str() != Some(""))
        .unwrap_or(Scalar::Null)
}
