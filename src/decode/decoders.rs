//! Response body decoders

use super::types::{ErrorEnvelope, PageEnvelope, RemoteErrorBody, WirePage};
use crate::error::{Error, Result};
use crate::types::json_type_name;
use serde_json::Value;

/// Decode a successful response body into a page
///
/// A missing or null `data` member is an empty page. An empty `paging.next`
/// string marks the terminal page.
pub fn decode_envelope(body: &str) -> Result<PageEnvelope> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| Error::malformed(format!("Failed to parse JSON: {e}")))?;

    if !value.is_object() {
        return Err(Error::malformed(format!(
            "Expected a JSON object, got {}",
            json_type_name(&value)
        )));
    }

    let page: WirePage = serde_json::from_value(value)
        .map_err(|e| Error::malformed(format!("Unexpected page shape: {e}")))?;

    let next = page
        .paging
        .and_then(|p| p.next)
        .filter(|next| !next.is_empty());

    Ok(PageEnvelope {
        records: page.data.unwrap_or_default(),
        next,
    })
}

/// Decode the body of a rejected request
///
/// Falls back to the raw text when the body is not a structured error.
pub fn decode_error_body(body: &str) -> RemoteErrorBody {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => RemoteErrorBody::Structured(envelope.error),
        Err(_) => RemoteErrorBody::Raw(body.to_string()),
    }
}
