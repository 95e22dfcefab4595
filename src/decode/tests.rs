//! Tests for decoder module

use super::*;
use crate::error::ErrorKind;
use serde_json::json;

// ============================================================================
// Envelope Tests
// ============================================================================

#[test]
fn test_decode_envelope_with_next() {
    let body = json!({
        "data": [{"id": "1"}, {"id": "2"}],
        "paging": {
            "cursors": {"before": "a", "after": "b"},
            "next": "https://graph.example.com/v20.0/act_1/ads?after=b"
        }
    })
    .to_string();

    let page = decode_envelope(&body).unwrap();
    assert_eq!(page.len(), 2);
    assert_eq!(page.records[0]["id"], "1");
    assert_eq!(
        page.next.as_deref(),
        Some("https://graph.example.com/v20.0/act_1/ads?after=b")
    );
    assert!(!page.is_terminal());
}

#[test]
fn test_decode_envelope_terminal() {
    let body = json!({
        "data": [{"id": "3"}],
        "paging": {"cursors": {"before": "c", "after": "d"}}
    })
    .to_string();

    let page = decode_envelope(&body).unwrap();
    assert_eq!(page, PageEnvelope::terminal(vec![json!({"id": "3"})]));
}

#[test]
fn test_decode_envelope_missing_data_is_empty() {
    let page = decode_envelope("{}").unwrap();
    assert!(page.is_empty());
    assert!(page.is_terminal());

    let page = decode_envelope(r#"{"data": null}"#).unwrap();
    assert!(page.is_empty());
}

#[test]
fn test_decode_envelope_empty_next_is_terminal() {
    let page = decode_envelope(r#"{"data": [], "paging": {"next": ""}}"#).unwrap();
    assert!(page.is_terminal());
}

#[test]
fn test_decode_envelope_not_json() {
    let err = decode_envelope("<html>Bad Gateway</html>").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedResponse);
}

#[test]
fn test_decode_envelope_not_object() {
    let err = decode_envelope("[1, 2, 3]").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedResponse);
    assert!(err.to_string().contains("array"));
}

#[test]
fn test_decode_envelope_data_not_array() {
    let err = decode_envelope(r#"{"data": {"id": "1"}}"#).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedResponse);
}

// ============================================================================
// Error Body Tests
// ============================================================================

#[test]
fn test_decode_error_body_structured() {
    let body = json!({
        "error": {
            "message": "(#100) Current combination of data breakdown columns is invalid",
            "type": "OAuthException",
            "code": 100,
            "fbtrace_id": "AbC123"
        }
    })
    .to_string();

    let decoded = decode_error_body(&body);
    assert_eq!(decoded.code(), Some(100));
    assert!(decoded.message().unwrap().contains("breakdown"));

    if let RemoteErrorBody::Structured(err) = &decoded {
        assert_eq!(err.error_type.as_deref(), Some("OAuthException"));
        assert_eq!(err.fbtrace_id.as_deref(), Some("AbC123"));
        assert!(err.error_subcode.is_none());
    } else {
        panic!("Expected Structured");
    }

    assert_eq!(
        decoded.to_string(),
        "code 100 (OAuthException): (#100) Current combination of data breakdown columns is invalid"
    );
}

#[test]
fn test_decode_error_body_raw() {
    let decoded = decode_error_body("upstream connect error");
    assert_eq!(
        decoded,
        RemoteErrorBody::Raw("upstream connect error".to_string())
    );
    assert_eq!(decoded.code(), None);
    assert_eq!(decoded.message(), None);
}

#[test]
fn test_decode_error_body_json_without_error_object() {
    let decoded = decode_error_body(r#"{"status": "down"}"#);
    assert!(matches!(decoded, RemoteErrorBody::Raw(_)));
}

#[test]
fn test_raw_body_display_is_truncated() {
    let long = "x".repeat(RAW_BODY_DISPLAY_LIMIT + 50);
    let shown = RemoteErrorBody::Raw(long).to_string();
    assert_eq!(shown.len(), RAW_BODY_DISPLAY_LIMIT + 3);
    assert!(shown.ends_with("..."));
}
