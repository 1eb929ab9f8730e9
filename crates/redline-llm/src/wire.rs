//! Wire types for the model service.
//!
//! Request: `{"model": ..., "messages": [...], "chunkText": ...}`.
//! Response: a JSON array of suggestion objects, each carrying
//! `issue`, `suggestion`, `severity`, `quote`, `start_para_idx`, and
//! `end_para_idx`. Any other response shape is a parse failure and a
//! permanent error for the chunk.

use serde::{Deserialize, Serialize};

use redline_core::{Severity, Suggestion, suggestion_hash};

use crate::error::ClientError;

/// One chat message in the request payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Message role (`"system"` or `"user"`).
    pub role: String,
    /// Message text.
    pub content: String,
}

impl ChatMessage {
    /// Build a system message.
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".into(),
            content: content.into(),
        }
    }

    /// Build a user message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".into(),
            content: content.into(),
        }
    }
}

/// A review request for one chunk.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRequest {
    /// Model identifier.
    pub model: String,
    /// Prompt messages (persona system prompt plus the chunk's user message).
    pub messages: Vec<ChatMessage>,
    /// Raw text of the chunk's paragraphs.
    pub chunk_text: String,
}

/// One suggestion object as the service reports it.
#[derive(Debug, Deserialize)]
struct RawSuggestion {
    issue: String,
    suggestion: String,
    severity: Severity,
    quote: String,
    start_para_idx: usize,
    end_para_idx: usize,
}

impl From<RawSuggestion> for Suggestion {
    fn from(raw: RawSuggestion) -> Self {
        let hash = suggestion_hash(&raw.suggestion, &raw.quote);
        Self {
            issue: raw.issue,
            suggestion_text: raw.suggestion,
            severity: raw.severity,
            quote: raw.quote,
            start_para_idx: raw.start_para_idx,
            end_para_idx: raw.end_para_idx,
            hash,
        }
    }
}

/// Parse a response body into suggestions, hashing each at creation time.
///
/// # Errors
///
/// [`ClientError::MalformedResponse`] when the body is not a JSON array of
/// well-formed suggestion objects.
pub fn parse_suggestions(body: &str) -> Result<Vec<Suggestion>, ClientError> {
    let raw: Vec<RawSuggestion> =
        serde_json::from_str(body).map_err(|e| ClientError::MalformedResponse {
            message: e.to_string(),
        })?;
    Ok(raw.into_iter().map(Suggestion::from).collect())
}

/// Extract a human-readable message from an error response body.
///
/// Tries the common envelopes (`{"error": {"message": ...}}`, flat
/// `{"message": ...}`) and falls back to the raw body with the status.
#[must_use]
pub fn api_error_message(body: &str, status: u16) -> String {
    if let Ok(json) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(msg) = json["error"]["message"].as_str() {
            return msg.to_string();
        }
        if let Some(msg) = json["message"].as_str() {
            return msg.to_string();
        }
    }
    format!("HTTP {status}: {body}")
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn request_serializes_chunk_text_camel_case() {
        let request = ReviewRequest {
            model: "grok-review-1".into(),
            messages: vec![ChatMessage::system("sys"), ChatMessage::user("text")],
            chunk_text: "text".into(),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["chunkText"], "text");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "text");
    }

    #[test]
    fn parses_a_well_formed_array() {
        let body = r#"[{
            "issue": "typo",
            "suggestion": "Fix 'Teh' to 'The'",
            "severity": "low",
            "quote": "Teh cat sat.",
            "start_para_idx": 0,
            "end_para_idx": 0
        }]"#;
        let suggestions = parse_suggestions(body).unwrap();
        assert_eq!(suggestions.len(), 1);
        let s = &suggestions[0];
        assert_eq!(s.issue, "typo");
        assert_eq!(s.severity, Severity::Low);
        assert_eq!(s.start_para_idx, 0);
        assert_eq!(s.hash, suggestion_hash("Fix 'Teh' to 'The'", "Teh cat sat."));
    }

    #[test]
    fn equal_content_hashes_equal_across_parses() {
        let body = r#"[{
            "issue": "x",
            "suggestion": "same fix",
            "severity": "medium",
            "quote": "same quote",
            "start_para_idx": 3,
            "end_para_idx": 4
        }]"#;
        let a = parse_suggestions(body).unwrap();
        let b = parse_suggestions(body).unwrap();
        assert_eq!(a[0].hash, b[0].hash);
    }

    #[test]
    fn empty_array_is_valid() {
        assert!(parse_suggestions("[]").unwrap().is_empty());
    }

    #[test]
    fn non_array_body_is_malformed() {
        assert_matches!(
            parse_suggestions(r#"{"choices": []}"#),
            Err(ClientError::MalformedResponse { .. })
        );
    }

    #[test]
    fn missing_field_is_malformed() {
        let body = r#"[{"issue": "typo", "suggestion": "fix"}]"#;
        assert_matches!(
            parse_suggestions(body),
            Err(ClientError::MalformedResponse { .. })
        );
    }

    #[test]
    fn unknown_severity_is_malformed() {
        let body = r#"[{
            "issue": "x",
            "suggestion": "y",
            "severity": "critical",
            "quote": "q",
            "start_para_idx": 0,
            "end_para_idx": 0
        }]"#;
        assert_matches!(
            parse_suggestions(body),
            Err(ClientError::MalformedResponse { .. })
        );
    }

    #[test]
    fn non_json_body_is_malformed() {
        assert_matches!(
            parse_suggestions("Bad Gateway"),
            Err(ClientError::MalformedResponse { .. })
        );
    }

    #[test]
    fn error_message_from_standard_envelope() {
        let body = r#"{"error":{"message":"over capacity","type":"overloaded"}}"#;
        assert_eq!(api_error_message(body, 529), "over capacity");
    }

    #[test]
    fn error_message_from_flat_envelope() {
        let body = r#"{"message":"invalid model"}"#;
        assert_eq!(api_error_message(body, 400), "invalid model");
    }

    #[test]
    fn error_message_falls_back_to_raw_body() {
        let msg = api_error_message("Service Unavailable", 503);
        assert!(msg.contains("503"));
        assert!(msg.contains("Service Unavailable"));
    }
}
