//! Lenient access to chat-completion response bodies
//!
//! Providers are only assumed to expose `choices[0].message.content`.
//! Anything else yields `None` and callers substitute their own placeholder.

use serde_json::Value;

/// Shown in place of converted Markdown when the reply has no content
pub const MISSING_MARKDOWN_FALLBACK: &str = "Error: Could not extract markdown from AI response.";

/// Shown as the AI chat bubble when the reply has no content
pub const MISSING_REPLY_FALLBACK: &str = "Sorry, I couldn't get a response.";

/// Text of the first choice's message, if present and non-empty
pub fn extract_reply(body: &Value) -> Option<String> {
    body.get("choices")?
        .get(0)?
        .get("message")?
        .get("content")?
        .as_str()
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extracts_first_choice() {
        let body = json!({"choices": [
            {"message": {"role": "assistant", "content": "X"}},
            {"message": {"content": "Y"}}
        ]});
        assert_eq!(extract_reply(&body).as_deref(), Some("X"));
    }

    #[test]
    fn test_missing_shapes_yield_none() {
        assert_eq!(extract_reply(&json!({})), None);
        assert_eq!(extract_reply(&json!({"choices": []})), None);
        assert_eq!(extract_reply(&json!({"choices": [{"message": {}}]})), None);
        assert_eq!(
            extract_reply(&json!({"choices": [{"message": {"content": 3}}]})),
            None
        );
        assert_eq!(
            extract_reply(&json!({"choices": [{"message": {"content": ""}}]})),
            None
        );
        assert_eq!(extract_reply(&json!("text")), None);
    }
}
