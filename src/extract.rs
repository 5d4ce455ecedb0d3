//! Output text extraction from Responses payloads.

use serde_json::Value;

use crate::models::responses::ResponsePayload;

/// Locate the generated text in a Responses payload.
///
/// Prefers the top-level `output_text` shortcut, then the first text part of the
/// first `message` item in `output`. Returns `None` (with a warning) when neither
/// yields non-empty text; callers decide how to degrade.
pub fn extract_output_text(payload: &Value) -> Option<String> {
    let parsed = ResponsePayload::from_value(payload);
    let shape = match &parsed {
        ResponsePayload::Shortcut(_) => "shortcut",
        ResponsePayload::Structured(_) => "structured",
        ResponsePayload::Empty => "empty",
    };

    let text = parsed.into_text();
    if text.is_none() {
        tracing::warn!(
            shape,
            response_id = payload.get("id").and_then(|v| v.as_str()).unwrap_or(""),
            status = payload.get("status").and_then(|v| v.as_str()).unwrap_or(""),
            "no output text found in Responses payload"
        );
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_plain_text_parts() {
        let v = json!({
            "output": [{"type": "message", "content": [{"type": "text", "text": "plain"}]}]
        });
        assert_eq!(extract_output_text(&v).as_deref(), Some("plain"));
    }

    #[test]
    fn skips_empty_parts_within_first_message() {
        let v = json!({
            "output": [{"type": "message", "content": [
                {"type": "output_text", "text": ""},
                {"type": "output_text", "text": "second"}
            ]}]
        });
        assert_eq!(extract_output_text(&v).as_deref(), Some("second"));
    }

    #[test]
    fn empty_shortcut_falls_through() {
        let v = json!({
            "output_text": "",
            "output": [{"type": "message", "content": [{"type": "output_text", "text": "nested"}]}]
        });
        assert_eq!(extract_output_text(&v).as_deref(), Some("nested"));
    }

    #[test]
    fn non_object_payload_is_absent() {
        assert_eq!(extract_output_text(&json!("just a string")), None);
        assert_eq!(extract_output_text(&json!(null)), None);
    }
}
