//! Defensive lookups into nested JSON documents.

use serde_json::{Map, Value};

use crate::record::FieldValue;

/// Parses an endpoint body. Anything that is not a JSON object (including
/// malformed JSON) becomes an empty document.
pub fn parse_document(body: &str) -> Value {
    match serde_json::from_str::<Value>(body) {
        Ok(value @ Value::Object(_)) => value,
        Ok(other) => {
            log::warn!("expected a JSON object, got {}", type_name(&other));
            Value::Object(Map::new())
        }
        Err(e) => {
            log::warn!("malformed JSON document: {}", e);
            Value::Object(Map::new())
        }
    }
}

pub fn is_empty_document(document: &Value) -> bool {
    document.as_object().map_or(true, Map::is_empty)
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

pub fn resolve_ref<'a>(document: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut current = document;
    for key in path {
        current = current.as_object()?.get(*key)?;
    }
    Some(current)
}

pub fn resolve(document: &Value, path: &[&str]) -> FieldValue {
    resolve_ref(document, path).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "vehicle": {
                "make": "Ford",
                "keyFacts": {"mileage": "12,000 miles", "doors": 0},
                "imported": false,
                "tax": null,
                "images": ["a.jpg", "b.jpg"]
            },
            "advert": "not an object"
        })
    }

    #[test]
    fn test_resolves_nested_value() {
        let doc = sample();
        assert_eq!(resolve(&doc, &["vehicle", "make"]), FieldValue::Present(json!("Ford")));
        assert_eq!(
            resolve(&doc, &["vehicle", "keyFacts", "mileage"]),
            FieldValue::Present(json!("12,000 miles"))
        );
    }

    #[test]
    fn test_absent_key_is_missing() {
        let doc = sample();
        assert!(resolve(&doc, &["vehicle", "model"]).is_missing());
        assert!(resolve(&doc, &["seller", "name"]).is_missing());
        assert!(resolve(&doc, &["vehicle", "keyFacts", "seats", "deeper"]).is_missing());
    }

    #[test]
    fn test_non_object_intermediate_is_missing() {
        let doc = sample();
        assert!(resolve(&doc, &["advert", "price"]).is_missing());
        assert!(resolve(&doc, &["vehicle", "images", "0"]).is_missing());
        assert!(resolve(&doc, &["vehicle", "make", "length"]).is_missing());
        assert!(resolve(&json!(42), &["anything"]).is_missing());
        assert!(resolve(&Value::Null, &["vehicle"]).is_missing());
    }

    #[test]
    fn test_falsy_values_are_present() {
        let doc = sample();
        assert_eq!(resolve(&doc, &["vehicle", "keyFacts", "doors"]), FieldValue::Present(json!(0)));
        assert_eq!(resolve(&doc, &["vehicle", "imported"]), FieldValue::Present(json!(false)));
        assert_eq!(resolve(&doc, &["vehicle", "tax"]), FieldValue::Present(Value::Null));
    }

    #[test]
    fn test_empty_path_returns_document() {
        let doc = sample();
        assert_eq!(resolve_ref(&doc, &[]), Some(&doc));
    }

    #[test]
    fn test_parse_document_degrades_to_empty() {
        assert!(is_empty_document(&parse_document("")));
        assert!(is_empty_document(&parse_document("{not json")));
        assert!(is_empty_document(&parse_document("[1, 2]")));
        assert!(is_empty_document(&parse_document("null")));
        assert!(!is_empty_document(&parse_document(r#"{"a": 1}"#)));
    }

    #[test]
    fn test_document_is_untouched() {
        let doc = sample();
        let before = doc.clone();
        let _ = resolve(&doc, &["vehicle", "keyFacts", "nope"]);
        let _ = resolve(&doc, &["advert", "x", "y"]);
        assert_eq!(doc, before);
    }
}
