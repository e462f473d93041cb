use crate::inference::InferenceError;
use serde_json::Value;

/// Extracts the first text segment from `{output:{message:{content:[{text}]}}}`.
pub fn parse_reply(body: &str) -> Result<String, InferenceError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|err| InferenceError::MalformedResponse(format!("invalid json: {err}")))?;

    let content = value
        .get("output")
        .and_then(|output| output.get("message"))
        .and_then(|message| message.get("content"))
        .ok_or_else(|| {
            InferenceError::MalformedResponse("missing output.message.content".to_string())
        })?;
    let entries = content.as_array().ok_or_else(|| {
        InferenceError::MalformedResponse("output.message.content is not an array".to_string())
    })?;

    entries
        .iter()
        .find_map(|entry| entry.get("text").and_then(Value::as_str))
        .map(str::to_string)
        .ok_or_else(|| {
            InferenceError::MalformedResponse(
                "output.message.content has no text segment".to_string(),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::parse_reply;
    use crate::inference::InferenceError;

    #[test]
    fn takes_first_text_segment() {
        let body = r#"{
            "output": {"message": {"role": "assistant", "content": [
                {"text": "first"},
                {"text": "second"}
            ]}},
            "stopReason": "end_turn",
            "usage": {"inputTokens": 3, "outputTokens": 2}
        }"#;
        assert_eq!(parse_reply(body).expect("parse"), "first");
    }

    #[test]
    fn skips_leading_non_text_blocks() {
        let body = r#"{"output":{"message":{"content":[{"image":{}},{"text":"caption"}]}}}"#;
        assert_eq!(parse_reply(body).expect("parse"), "caption");
    }

    #[test]
    fn malformed_shapes_are_reported() {
        for body in [
            "not json",
            r#"{"output":{}}"#,
            r#"{"output":{"message":{"content":"text"}}}"#,
            r#"{"output":{"message":{"content":[]}}}"#,
        ] {
            let err = parse_reply(body).expect_err(body);
            assert!(
                matches!(err, InferenceError::MalformedResponse(_)),
                "unexpected error for {body}: {err}"
            );
        }
    }
}
