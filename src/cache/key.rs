// Cache key generation.
// Composes a deterministic key from HTTP method, URL, params, and body.

use serde_json::Value;

/// Delimiter between key segments.
const KEY_DELIMITER: &str = "|";

/// Generate a deterministic cache key for a request shape.
///
/// Segments are the uppercased method, the URL, the serialized params, and
/// the serialized body, in that order; empty segments are dropped. Object
/// keys serialize in sorted order (`serde_json::Map` is a BTreeMap), so two
/// maps with the same entries produce the same key regardless of the order
/// the caller inserted them in.
pub fn generate_key(url: &str, method: &str, params: Option<&Value>, body: Option<&Value>) -> String {
    let parts = [
        method.to_uppercase(),
        url.to_string(),
        serialize_segment(params),
        serialize_segment(body),
    ];

    parts
        .iter()
        .filter(|part| !part.is_empty())
        .cloned()
        .collect::<Vec<_>>()
        .join(KEY_DELIMITER)
}

/// Serialize an optional segment, treating absent and null as empty.
fn serialize_segment(value: Option<&Value>) -> String {
    match value {
        Some(Value::Null) | None => String::new(),
        Some(value) => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_key_is_deterministic() {
        let params = json!({"page": 1, "limit": 10});
        let a = generate_key("/users", "get", Some(&params), None);
        let b = generate_key("/users", "get", Some(&params), None);
        assert_eq!(a, b);
    }

    #[test]
    fn test_method_is_uppercased() {
        let key = generate_key("/users", "get", None, None);
        assert_eq!(key, "GET|/users");
    }

    #[test]
    fn test_empty_segments_are_dropped() {
        let key = generate_key("/users", "GET", None, None);
        assert!(!key.contains("||"));
        assert!(!key.ends_with('|'));
    }

    #[test]
    fn test_params_and_body_segments() {
        let params = json!({"page": 1});
        let body = json!({"name": "test"});
        let key = generate_key("/users", "POST", Some(&params), Some(&body));
        assert_eq!(key, r#"POST|/users|{"page":1}|{"name":"test"}"#);
    }

    #[test]
    fn test_object_key_order_is_canonicalized() {
        // Maps with the same entries inserted in different orders must
        // produce identical keys.
        let mut first = serde_json::Map::new();
        first.insert("page".into(), json!(1));
        first.insert("limit".into(), json!(10));

        let mut second = serde_json::Map::new();
        second.insert("limit".into(), json!(10));
        second.insert("page".into(), json!(1));

        let a = generate_key("/users", "GET", Some(&Value::Object(first)), None);
        let b = generate_key("/users", "GET", Some(&Value::Object(second)), None);
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_requests_differ() {
        let body = json!({"name": "test"});
        let base = generate_key("/users", "GET", None, None);
        assert_ne!(base, generate_key("/users", "POST", None, None));
        assert_ne!(base, generate_key("/posts", "GET", None, None));
        assert_ne!(base, generate_key("/users", "GET", None, Some(&body)));
    }

    #[test]
    fn test_null_segment_treated_as_absent() {
        let with_null = generate_key("/users", "GET", Some(&Value::Null), None);
        let without = generate_key("/users", "GET", None, None);
        assert_eq!(with_null, without);
    }
}
