//! Recursive merge of backend style objects.

use serde_json::{Map, Value};

/// Backend-shaped style object produced by the mapping table.
pub type BackendStyles = Map<String, Value>;

/// Merge `source` into `target` key by key.
///
/// Objects present on both sides merge recursively; any other value in
/// `source` replaces the one in `target`.
pub fn deep_merge(target: &mut BackendStyles, source: BackendStyles) {
    for (key, value) in source {
        let incoming = match value {
            Value::Object(incoming) => incoming,
            other => {
                target.insert(key, other);
                continue;
            }
        };
        if let Some(Value::Object(existing)) = target.get_mut(&key) {
            deep_merge(existing, incoming);
            continue;
        }
        target.insert(key, Value::Object(incoming));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(value: Value) -> BackendStyles {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_nested_objects_merge() {
        let mut target = obj(json!({"borders": {"top": {"size": 6}}}));
        deep_merge(
            &mut target,
            obj(json!({"borders": {"top": {"color": "FF0000"}, "left": {"size": 4}}})),
        );
        assert_eq!(
            Value::Object(target),
            json!({"borders": {"top": {"size": 6, "color": "FF0000"}, "left": {"size": 4}}})
        );
    }

    #[test]
    fn test_scalar_replaces() {
        let mut target = obj(json!({"bold": false, "spacing": {"before": 10}}));
        deep_merge(&mut target, obj(json!({"bold": true, "spacing": 5})));
        assert_eq!(Value::Object(target), json!({"bold": true, "spacing": 5}));
    }
}
