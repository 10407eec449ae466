/// Response envelope helpers
///
/// The API wraps payloads as `{ code, message, data, success }`, and listing
/// endpoints sometimes nest a paginated `{ data: [...], totalPages }` inside
/// `data`. Call sites cannot rely on one shape, so every accessor here falls
/// back through the known layouts instead of failing.

use crate::types::Page;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    pub data: Option<T>,
    #[serde(default)]
    pub success: Option<bool>,
}

/// `v.data` when present and non-null, otherwise `v` itself
pub fn unwrap_payload(value: Value) -> Value {
    match value {
        Value::Object(mut map) => match map.remove("data") {
            Some(inner) if !inner.is_null() => inner,
            Some(inner) => {
                map.insert("data".to_string(), inner);
                Value::Object(map)
            }
            None => Value::Object(map),
        },
        other => other,
    }
}

/// First array found at `v`, `v.data` or `v.data.data`; empty otherwise
pub fn unwrap_list(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(items)) => items,
            Some(Value::Object(mut inner)) => match inner.remove("data") {
                Some(Value::Array(items)) => items,
                _ => Vec::new(),
            },
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

/// Page found at `v.data` (or `v` when the page is not wrapped)
pub fn unwrap_page<T: DeserializeOwned>(value: Value) -> Result<Page<T>, serde_json::Error> {
    let wrapped = matches!(value.get("data"), Some(Value::Object(_)));
    let inner = if wrapped { unwrap_payload(value) } else { value };
    serde_json::from_value(inner)
}

/// Decode every element of an unwrapped list
pub fn decode_list<T: DeserializeOwned>(value: Value) -> Result<Vec<T>, serde_json::Error> {
    unwrap_list(value)
        .into_iter()
        .map(serde_json::from_value)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LeaderboardEntry;
    use serde_json::json;

    #[test]
    fn test_unwrap_payload_prefers_data() {
        let v = json!({"code": "OK", "message": "fine", "data": {"id": "1"}, "success": true});
        assert_eq!(unwrap_payload(v), json!({"id": "1"}));
    }

    #[test]
    fn test_unwrap_payload_falls_back_to_whole_body() {
        assert_eq!(unwrap_payload(json!({"id": "1"})), json!({"id": "1"}));
        assert_eq!(
            unwrap_payload(json!({"id": "1", "data": null})),
            json!({"id": "1", "data": null})
        );
        assert_eq!(unwrap_payload(json!([1, 2])), json!([1, 2]));
    }

    #[test]
    fn test_unwrap_list_shapes() {
        assert_eq!(unwrap_list(json!([1, 2])), vec![json!(1), json!(2)]);
        assert_eq!(unwrap_list(json!({"data": [3]})), vec![json!(3)]);
        assert_eq!(
            unwrap_list(json!({"data": {"data": [4, 5], "totalPages": 2}})),
            vec![json!(4), json!(5)]
        );
        assert!(unwrap_list(json!({"data": {"items": []}})).is_empty());
        assert!(unwrap_list(json!("nope")).is_empty());
    }

    #[test]
    fn test_unwrap_page() {
        let body = json!({
            "code": "OK",
            "success": true,
            "data": {
                "page": 0,
                "totalPages": 3,
                "data": [{
                    "id": "e1",
                    "studentName": "Ada",
                    "totalScore": 300.0,
                    "rank": 1,
                    "problemsSolved": 3,
                    "lastSubmissionTime": "2026-01-01T10:00:00Z"
                }]
            }
        });
        let page: Page<LeaderboardEntry> = unwrap_page(body).unwrap();
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.data[0].student_name, "Ada");

        let bare: Page<LeaderboardEntry> = unwrap_page(json!({"data": []})).unwrap();
        assert_eq!(bare.total_pages, 1);
    }

    #[test]
    fn test_envelope_decode() {
        let env: Envelope<Value> =
            serde_json::from_value(json!({"code": "OK", "message": "m", "data": {"token": "t"}, "success": true}))
                .unwrap();
        assert_eq!(env.success, Some(true));
        assert_eq!(env.data.unwrap()["token"], "t");
    }
}
