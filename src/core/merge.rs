use serde_json::{Map, Value};

/// Deep-merges `incoming` into `target`.
///
/// Nested objects combine field by field. Arrays, scalars and `null` in
/// `incoming` replace whatever `target` held.
pub fn deep_merge(target: &mut Map<String, Value>, incoming: Map<String, Value>) {
    for (name, value) in incoming {
        match (target.get_mut(&name), value) {
            (Some(Value::Object(existing)), Value::Object(nested)) => {
                deep_merge(existing, nested);
            }
            (_, value) => {
                target.insert(name, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn nested_objects_combine() {
        let mut target = object(json!({"profile": {"name": "Alice", "age": 30}}));
        deep_merge(&mut target, object(json!({"profile": {"age": 31, "city": "Oslo"}})));

        assert_eq!(
            Value::Object(target),
            json!({"profile": {"name": "Alice", "age": 31, "city": "Oslo"}})
        );
    }

    #[test]
    fn arrays_and_scalars_are_overwritten() {
        let mut target = object(json!({"tags": ["a", "b", "c"], "score": 1, "meta": {"x": 1}}));
        deep_merge(&mut target, object(json!({"tags": ["z"], "score": null, "meta": 5})));

        assert_eq!(Value::Object(target), json!({"tags": ["z"], "score": null, "meta": 5}));
    }

    #[test]
    fn sequential_merges_match_single_merge_for_disjoint_keys() {
        let mut stepwise = Map::new();
        deep_merge(&mut stepwise, object(json!({"a": 1})));
        deep_merge(&mut stepwise, object(json!({"b": 2})));

        let mut once = Map::new();
        deep_merge(&mut once, object(json!({"a": 1, "b": 2})));

        assert_eq!(stepwise, once);
    }
}
