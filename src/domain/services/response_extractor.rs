//! Response Extractor Service
//!
//! Recovers a JSON value from free-form model output.

use crate::domain::errors::RouterError;
use serde::de::DeserializeOwned;
use serde_json::Value;

const FENCE: &str = "```";

/// Extracts JSON from model text.
///
/// Steps:
/// 1. Trim surrounding whitespace
/// 2. Strip a leading code fence (with or without language tag), its closing
///    fence, and anything after the closing fence
/// 3. If the text does not start with `{` or `[`, slice from the first `{`/`[`
///    to the last `}`/`]`
/// 4. Parse
///
/// Step 3 is a boundary heuristic, not a balanced-bracket scan: a `}` or `]`
/// inside a string literal after the real closing bracket widens the span
/// and makes parsing fail.
pub struct ResponseExtractor;

impl ResponseExtractor {
    /// Extract a JSON value, failing with [`RouterError::JsonExtractionFailed`]
    /// carrying the original text.
    pub fn extract_json(text: &str) -> Result<Value, RouterError> {
        let candidate = Self::candidate_span(text);

        serde_json::from_str(candidate).map_err(|e| RouterError::JsonExtractionFailed {
            raw: text.to_string(),
            reason: e.to_string(),
        })
    }

    /// Extract and deserialize into a concrete type.
    pub fn extract_as<T: DeserializeOwned>(text: &str) -> Result<T, RouterError> {
        let value = Self::extract_json(text)?;

        serde_json::from_value(value).map_err(|e| RouterError::JsonExtractionFailed {
            raw: text.to_string(),
            reason: e.to_string(),
        })
    }

    fn candidate_span(text: &str) -> &str {
        let unfenced = Self::strip_fence(text.trim());

        if unfenced.starts_with('{') || unfenced.starts_with('[') {
            return unfenced;
        }

        let start = unfenced.find(['{', '[']);
        let end = unfenced.rfind(['}', ']']);

        match (start, end) {
            (Some(start), Some(end)) if end > start => &unfenced[start..=end],
            _ => unfenced,
        }
    }

    fn strip_fence(text: &str) -> &str {
        let Some(after_open) = text.strip_prefix(FENCE) else {
            return text;
        };

        // Drop the language tag, if any, up to the end of the opening line.
        let body = match after_open.find('\n') {
            Some(newline) => &after_open[newline + 1..],
            None => after_open.trim_start_matches(|c: char| c.is_ascii_alphanumeric()),
        };

        // Anything after the closing fence is not part of the block.
        let body = match body.find(FENCE) {
            Some(close) => &body[..close],
            None => body,
        };
        body.trim()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[test]
    fn test_extract_plain_object() {
        let value = ResponseExtractor::extract_json(r#"{"a":1}"#).unwrap();
        assert_eq!(value, json!({"a": 1}));
    }

    #[test]
    fn test_extract_fenced_with_language_tag() {
        let value = ResponseExtractor::extract_json("```json\n{\"a\":1}\n```").unwrap();
        assert_eq!(value, json!({"a": 1}));
    }

    #[test]
    fn test_extract_fenced_without_language_tag() {
        let value = ResponseExtractor::extract_json("```\n[1, 2, 3]\n```").unwrap();
        assert_eq!(value, json!([1, 2, 3]));
    }

    #[test]
    fn test_extract_single_line_fence() {
        let value = ResponseExtractor::extract_json("```json{\"ok\":true}```").unwrap();
        assert_eq!(value, json!({"ok": true}));
    }

    #[test]
    fn test_extract_fence_followed_by_prose() {
        let text = "```json\n{\"a\":1}\n```\nLet me know if you need anything else.";
        let value = ResponseExtractor::extract_json(text).unwrap();
        assert_eq!(value, json!({"a": 1}));
    }

    #[test]
    fn test_extract_prose_around_fence() {
        let text = "Here you go:\n```json\n{\"a\":1}\n```\nAnything else?";
        let value = ResponseExtractor::extract_json(text).unwrap();
        assert_eq!(value, json!({"a": 1}));
    }

    #[test]
    fn test_extract_surrounded_by_noise() {
        let value = ResponseExtractor::extract_json("noise {\"a\":1} trailing").unwrap();
        assert_eq!(value, json!({"a": 1}));
    }

    #[test]
    fn test_extract_array_surrounded_by_prose() {
        let text = "Here are the items:\n[{\"id\": 1}, {\"id\": 2}]\nLet me know!";
        let value = ResponseExtractor::extract_json(text).unwrap();
        assert_eq!(value, json!([{"id": 1}, {"id": 2}]));
    }

    #[test]
    fn test_extract_whitespace_padding() {
        let value = ResponseExtractor::extract_json("  \n {\"a\": \"b\"} \n\t").unwrap();
        assert_eq!(value, json!({"a": "b"}));
    }

    #[test]
    fn test_extract_not_json_fails_with_raw_text() {
        let err = ResponseExtractor::extract_json("not json at all").unwrap_err();
        match err {
            RouterError::JsonExtractionFailed { raw, .. } => assert_eq!(raw, "not json at all"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_extract_leading_json_with_trailing_text_is_not_sliced() {
        // Slicing only applies when the text does not already start with a bracket.
        assert!(ResponseExtractor::extract_json("{\"a\":1} trailing").is_err());
    }

    #[test]
    fn test_extract_trailing_brace_in_string_is_a_known_limitation() {
        let text = "result: {\"a\":1} note: \"}\"";
        assert!(ResponseExtractor::extract_json(text).is_err());
    }

    #[test]
    fn test_extract_empty_fails() {
        assert!(ResponseExtractor::extract_json("").is_err());
        assert!(ResponseExtractor::extract_json("```json\n```").is_err());
    }

    #[test]
    fn test_extract_as_typed() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct Summary {
            title: String,
            score: u32,
        }

        let summary: Summary =
            ResponseExtractor::extract_as("```json\n{\"title\":\"Q3\",\"score\":7}\n```").unwrap();
        assert_eq!(
            summary,
            Summary {
                title: "Q3".to_string(),
                score: 7
            }
        );
    }

    #[test]
    fn test_extract_as_type_mismatch_fails() {
        let result: Result<Vec<u32>, _> = ResponseExtractor::extract_as(r#"{"a":1}"#);
        assert!(matches!(result, Err(RouterError::JsonExtractionFailed { .. })));
    }
}
