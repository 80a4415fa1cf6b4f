//! Variant → response, with path-variable injection.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::definition::Variant;
use crate::routing::Captures;

/// Final response for a matched request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MockResponse {
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    /// `None` is served as an empty body.
    pub body: Option<Value>,
}

/// Build the response for `variant`, injecting `captures` into its body.
pub fn resolve(variant: &Variant, captures: &Captures) -> MockResponse {
    let body = variant.body().cloned().map(|mut body| {
        if !captures.is_empty() {
            inject(&mut body, captures);
        }
        body
    });

    MockResponse {
        status: variant.status_code,
        headers: variant.headers.clone(),
        body,
    }
}

/// Replace the value of every object key equal to a capture name, at any depth.
pub fn inject(value: &mut Value, captures: &Captures) {
    match value {
        Value::Object(map) => {
            for (key, child) in map.iter_mut() {
                match captures.get(key) {
                    Some(captured) => *child = Value::String(captured.clone()),
                    None => inject(child, captures),
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(|item| inject(item, captures)),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::Payload;
    use serde_json::json;

    fn captures(pairs: &[(&str, &str)]) -> Captures {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    fn variant(body: Option<Value>) -> Variant {
        Variant {
            status_code: 201,
            headers: BTreeMap::from([("x-name".to_string(), "name".to_string())]),
            content: String::new(),
            payload: Payload::Extended { body },
        }
    }

    #[test]
    fn test_deep_injection() {
        let mut body = json!({"id": "_", "friends": [{"name": "_"}]});
        inject(&mut body, &captures(&[("id", "42"), ("name", "toby")]));
        assert_eq!(body, json!({"id": "42", "friends": [{"name": "toby"}]}));
    }

    #[test]
    fn test_injection_replaces_non_string_values() {
        let mut body = json!([{"id": {"nested": true}, "tags": ["id", "name"]}, 3, null]);
        inject(&mut body, &captures(&[("id", "7")]));
        assert_eq!(body, json!([{"id": "7", "tags": ["id", "name"]}, 3, null]));
    }

    #[test]
    fn test_resolve_keeps_status_and_headers() {
        let response = resolve(&variant(Some(json!({"name": "x"}))), &captures(&[("name", "toby")]));
        assert_eq!(response.status, 201);
        assert_eq!(response.headers.get("x-name").map(String::as_str), Some("name"));
        assert_eq!(response.body, Some(json!({"name": "toby"})));
    }

    #[test]
    fn test_resolve_without_body() {
        let response = resolve(&variant(None), &captures(&[("name", "toby")]));
        assert_eq!(response.body, None);
    }

    #[test]
    fn test_resolve_does_not_mutate_variant() {
        let variant = variant(Some(json!({"name": "x"})));
        resolve(&variant, &captures(&[("name", "toby")]));
        assert_eq!(variant.body(), Some(&json!({"name": "x"})));
    }
}
