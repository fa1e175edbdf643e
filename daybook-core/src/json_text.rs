//! Pull a JSON object out of model output.
//!
//! Models asked for "JSON only" still wrap answers in Markdown fences or add
//! a sentence before/after the object. We take the first object we can find.

use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum JsonTextError {
    #[error("no JSON object found in text")]
    NotFound,
}

pub fn extract_json_object(text: &str) -> Result<Map<String, Value>, JsonTextError> {
    let body = strip_fence(text.trim());

    leading_object(body)
        .or_else(|| body.find('{').and_then(|i| leading_object(&body[i..])))
        .ok_or(JsonTextError::NotFound)
}

/// Body of a leading ```` ```lang ```` fence, or `s` unchanged when there is
/// no complete fence.
fn strip_fence(s: &str) -> &str {
    let Some(rest) = s.strip_prefix("```") else {
        return s;
    };
    let rest = rest.trim_start_matches(|c: char| c.is_ascii_alphabetic());
    match rest.find("```") {
        Some(end) => rest[..end].trim(),
        None => s,
    }
}

/// Decode one value from the start of `s`, ignoring whatever follows it.
fn leading_object(s: &str) -> Option<Map<String, Value>> {
    let mut values = serde_json::Deserializer::from_str(s).into_iter::<Value>();
    match values.next() {
        Some(Ok(Value::Object(map))) => Some(map),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_object() {
        let m = extract_json_object(r#"  {"tags": ["coding"]}  "#).unwrap();
        assert_eq!(m["tags"][0], "coding");
    }

    #[test]
    fn fenced_object() {
        let m = extract_json_object("```json\n{\"ordered_tasks\": []}\n```").unwrap();
        assert!(m["ordered_tasks"].as_array().unwrap().is_empty());

        let m = extract_json_object("```\n{\"a\": 1}\n```").unwrap();
        assert_eq!(m["a"], 1);
    }

    #[test]
    fn fence_edges() {
        let m = extract_json_object("```json\n{\"a\": 1}").unwrap();
        assert_eq!(m["a"], 1);

        let m = extract_json_object("```json {\"a\": \"x\"} ``` trailing").unwrap();
        assert_eq!(m["a"], "x");

        assert_eq!(strip_fence("```JSON\n {} \n```"), "{}");
        assert_eq!(strip_fence("no fence"), "no fence");
        assert!(matches!(extract_json_object("```json\n```"), Err(JsonTextError::NotFound)));
    }

    #[test]
    fn trailing_and_leading_prose() {
        let m = extract_json_object("{\"a\": 1}\n以上です。").unwrap();
        assert_eq!(m["a"], 1);

        let m = extract_json_object("Here you go: {\"a\": {\"b\": 2}} hope it helps").unwrap();
        assert_eq!(m["a"]["b"], 2);
    }

    #[test]
    fn no_object() {
        assert!(matches!(extract_json_object(""), Err(JsonTextError::NotFound)));
        assert!(matches!(extract_json_object("[1, 2]"), Err(JsonTextError::NotFound)));
        assert!(matches!(extract_json_object("sorry, no"), Err(JsonTextError::NotFound)));
    }
}
