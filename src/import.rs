//! Chat transcript import
//!
//! Accepts the JSON most chat tools export: an array of `{role, content}`
//! messages. Only the user's turns become nodes.

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Invalid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid JSON: Input must be a JSON array.")]
    NotAnArray,

    #[error("Invalid JSON: No items with 'role: user' found in the JSON array.")]
    NoUserMessages,
}

/// Extract the `content` of every `role == "user"` entry, in array order
pub fn parse_user_messages(input: &str) -> Result<Vec<String>, ImportError> {
    let parsed: Value = serde_json::from_str(input)?;
    let items = parsed.as_array().ok_or(ImportError::NotAnArray)?;

    let contents: Vec<String> = items
        .iter()
        .filter(|item| item.get("role").and_then(Value::as_str) == Some("user"))
        .filter_map(|item| item.get("content").and_then(Value::as_str))
        .map(str::to_string)
        .collect();

    if contents.is_empty() {
        return Err(ImportError::NoUserMessages);
    }

    Ok(contents)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_user_turns_in_order() {
        let input = r#"[{"role":"user","content":"a"},{"role":"assistant","content":"b"},{"role":"user","content":"c"}]"#;
        let contents = parse_user_messages(input).unwrap();
        assert_eq!(contents, vec!["a".to_string(), "c".to_string()]);
    }

    #[test]
    fn test_no_user_turns_is_an_error() {
        let input = r#"[{"role":"assistant","content":"b"},{"role":"system","content":"s"}]"#;
        let err = parse_user_messages(input).unwrap_err();
        assert!(matches!(err, ImportError::NoUserMessages));
        assert_eq!(
            err.to_string(),
            "Invalid JSON: No items with 'role: user' found in the JSON array."
        );
    }

    #[test]
    fn test_empty_array_is_an_error() {
        assert!(matches!(
            parse_user_messages("[]"),
            Err(ImportError::NoUserMessages)
        ));
    }

    #[test]
    fn test_object_is_not_an_array() {
        let err = parse_user_messages(r#"{"role":"user","content":"a"}"#).unwrap_err();
        assert!(matches!(err, ImportError::NotAnArray));
    }

    #[test]
    fn test_malformed_json() {
        let err = parse_user_messages("[{\"role\": ").unwrap_err();
        assert!(matches!(err, ImportError::Parse(_)));
        assert!(err.to_string().starts_with("Invalid JSON: "));
    }

    #[test]
    fn test_skips_non_string_content_and_junk_entries() {
        let input = r#"[null, 3, {"role":"user","content":42}, {"role":"user"}, {"role":"user","content":"ok"}]"#;
        assert_eq!(parse_user_messages(input).unwrap(), vec!["ok".to_string()]);
    }
}
