//! Pure functions for encoding request bodies and decoding API responses.
//!
//! Decoding never fails with a Rust error: every response, however malformed,
//! resolves to either a [`GenerationRecord`] or an [`ErrorRecord`] the caller
//! can show.

use serde_json::Value;

use super::error::CodecError;
use super::requests::WireRequest;
use super::types::{ErrorRecord, GenerationRecord, REQUEST_FAILED};

/// Encode a wire request as a JSON string.
pub fn encode(request: &WireRequest) -> Result<String, CodecError> {
    serde_json::to_string(request).map_err(CodecError::from)
}

/// Returns true if a `Content-Type` header value denotes JSON.
///
/// Accepts `application/json` and structured suffixes such as
/// `application/problem+json`, with or without parameters.
pub fn is_json_content_type(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    essence == "application/json" || essence.ends_with("+json")
}

/// Synthesized status line, e.g. `HTTP 502: Bad Gateway`.
pub fn status_line(http_status: u16) -> String {
    let reason = http::StatusCode::from_u16(http_status)
        .ok()
        .and_then(|status| status.canonical_reason())
        .unwrap_or("Unknown Status");
    format!("HTTP {}: {}", http_status, reason)
}

/// Decode an API response.
///
/// - Non-JSON bodies are error messages verbatim, tagged with the HTTP status.
/// - JSON that fails to parse falls back to the raw text as the message.
/// - Non-2xx JSON prefers `error.message`, else a synthesized status line.
/// - 2xx JSON is a [`GenerationRecord`], or the tagged `{"error": ...}` form.
///
/// # Examples
///
/// ```
/// use shaper_core::generation::{decode, GenerationStatus};
///
/// let record = decode(
///     r#"{"id":"x1","url":"https://cdn/x1","status":"pending"}"#,
///     200,
///     Some("application/json"),
/// )
/// .unwrap();
/// assert_eq!(record.status, GenerationStatus::Pending);
///
/// let error = decode("Not Found", 404, Some("text/plain")).unwrap_err();
/// assert_eq!(error.message, "Not Found");
/// assert_eq!(error.status, Some(404));
/// ```
pub fn decode(
    raw: &str,
    http_status: u16,
    content_type: Option<&str>,
) -> Result<GenerationRecord, ErrorRecord> {
    if !content_type.is_some_and(is_json_content_type) {
        return Err(ErrorRecord::with_status(
            raw_or_status_line(raw, http_status),
            http_status,
        ));
    }

    let value: Value = serde_json::from_str(raw).map_err(|_| {
        ErrorRecord::with_status(raw_or_status_line(raw, http_status), http_status)
    })?;

    if !(200..300).contains(&http_status) {
        let message = error_message(&value).unwrap_or_else(|| status_line(http_status));
        return Err(ErrorRecord::with_status(message, http_status));
    }

    decode_envelope(value).unwrap_or_else(|_| {
        Err(ErrorRecord::with_status(
            raw_or_status_line(raw, http_status),
            http_status,
        ))
    })
}

// An object with an `error` key and no `status` is the tagged error form; its
// error carries the status embedded in the body, if any. A `status` that is not
// a string is kept as its JSON text and decodes as unrecognized.
fn decode_envelope(
    mut value: Value,
) -> Result<Result<GenerationRecord, ErrorRecord>, serde_json::Error> {
    if let Some(status) = value.get_mut("status") {
        if !status.is_string() {
            *status = Value::String(status.to_string());
        }
    }

    let is_tagged_error = value.get("status").is_none() && value.get("error").is_some();
    if is_tagged_error {
        let message = error_message(&value).unwrap_or_else(|| REQUEST_FAILED.to_string());
        let status = value
            .pointer("/error/status")
            .and_then(Value::as_u64)
            .and_then(|s| u16::try_from(s).ok());
        return Ok(Err(ErrorRecord { message, status }));
    }

    let nested_message = error_message(&value);
    let mut record: GenerationRecord = serde_json::from_value(value)?;
    if record.message.is_none() {
        record.message = nested_message;
    }
    Ok(Ok(record))
}

fn error_message(value: &Value) -> Option<String> {
    match value.get("error") {
        Some(Value::String(message)) => Some(message.clone()),
        Some(error) => error
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string),
        None => None,
    }
}

fn raw_or_status_line(raw: &str, http_status: u16) -> String {
    if raw.trim().is_empty() {
        status_line(http_status)
    } else {
        raw.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::{GenerationRequest, GenerationStatus};

    const JSON: Option<&str> = Some("application/json; charset=utf-8");

    #[test]
    fn test_encode_prompt_only() {
        let body = encode(&WireRequest::from_request(&GenerationRequest::new(
            "Build a login form",
        )))
        .unwrap();
        assert_eq!(body, r#"{"prompt":"Build a login form"}"#);
    }

    #[test]
    fn test_decode_pending_record() {
        let record = decode(
            r#"{"id":"x1","url":"https://cdn/x1","status":"pending"}"#,
            200,
            JSON,
        )
        .unwrap();
        assert_eq!(record.id.as_deref(), Some("x1"));
        assert_eq!(record.url.as_deref(), Some("https://cdn/x1"));
        assert_eq!(record.status, GenerationStatus::Pending);
    }

    #[test]
    fn test_decode_normalizes_aliases() {
        let record = decode(r#"{"id":"x1","url":"u","status":"building"}"#, 200, JSON).unwrap();
        assert_eq!(record.status, GenerationStatus::Processing);
    }

    #[test]
    fn test_decode_non_string_status_is_unrecognized() {
        let record = decode(r#"{"id":"x1","status":3}"#, 200, JSON).unwrap();
        assert_eq!(record.status, GenerationStatus::Unrecognized("3".to_string()));

        let record = decode(r#"{"id":"x1","status":null}"#, 200, JSON).unwrap();
        assert_eq!(
            record.status,
            GenerationStatus::Unrecognized("null".to_string())
        );
    }

    #[test]
    fn test_decode_plain_text_error() {
        let error = decode("Not Found", 404, None).unwrap_err();
        assert_eq!(error, ErrorRecord::with_status("Not Found", 404));
    }

    #[test]
    fn test_decode_plain_text_on_success_is_error() {
        let error = decode("<html>ok</html>", 200, Some("text/html")).unwrap_err();
        assert_eq!(error.message, "<html>ok</html>");
        assert_eq!(error.status, Some(200));
    }

    #[test]
    fn test_decode_empty_plain_body_synthesizes_status_line() {
        let error = decode("", 502, Some("text/plain")).unwrap_err();
        assert_eq!(error.message, "HTTP 502: Bad Gateway");
    }

    #[test]
    fn test_decode_invalid_json_falls_back_to_raw() {
        let error = decode("{not json", 200, JSON).unwrap_err();
        assert_eq!(error.message, "{not json");
    }

    #[test]
    fn test_decode_json_error_prefers_error_message() {
        let error = decode(
            r#"{"error":{"message":"Prompt is required","status":400}}"#,
            400,
            JSON,
        )
        .unwrap_err();
        assert_eq!(error, ErrorRecord::with_status("Prompt is required", 400));
    }

    #[test]
    fn test_decode_json_error_without_message_synthesizes() {
        let error = decode(r#"{"detail":"nope"}"#, 500, JSON).unwrap_err();
        assert_eq!(error.message, "HTTP 500: Internal Server Error");
    }

    #[test]
    fn test_decode_tagged_error_on_success_status() {
        let error = decode(r#"{"error":{"message":"quota","status":429}}"#, 200, JSON).unwrap_err();
        assert_eq!(error, ErrorRecord::with_status("quota", 429));
    }

    #[test]
    fn test_decode_error_status_keeps_server_message() {
        let record = decode(
            r#"{"id":"x1","url":"u","status":"error","error":{"message":"model overloaded"}}"#,
            200,
            JSON,
        )
        .unwrap();
        assert_eq!(record.status, GenerationStatus::Error);
        assert_eq!(record.message.as_deref(), Some("model overloaded"));
    }

    #[test]
    fn test_decode_is_pure() {
        let raw = r#"{"id":"x1","url":"u","status":"completed"}"#;
        assert_eq!(decode(raw, 200, JSON), decode(raw, 200, JSON));
        assert_eq!(decode("boom", 500, None), decode("boom", 500, None));
    }

    #[test]
    fn test_json_content_type_detection() {
        assert!(is_json_content_type("application/json"));
        assert!(is_json_content_type("Application/JSON; charset=utf-8"));
        assert!(is_json_content_type("application/problem+json"));
        assert!(!is_json_content_type("text/plain"));
    }
}
