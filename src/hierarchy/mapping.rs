use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::{ResolveError, ResolveResult};

/// Nested key/value structure produced by merging override tiers.
///
/// Top-level keys keep their first-seen position when overwritten, so a route
/// table loaded from several files preserves declaration order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MergedMapping(Map<String, Value>);

impl MergedMapping {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Accepts an object, or null for an empty document.
    pub fn from_value(value: Value) -> ResolveResult<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            Value::Null => Ok(Self::new()),
            other => Err(ResolveError::Validation(format!(
                "expected a mapping at the document root, found {}",
                kind_of(&other)
            ))),
        }
    }

    /// Shallow merge: each top-level key of `other` replaces ours wholesale.
    pub fn overlay(&mut self, other: MergedMapping) {
        for (key, value) in other.0 {
            self.0.insert(key, value);
        }
    }

    /// Dotted-path lookup, e.g. `session.time`. Numeric segments index arrays.
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut parts = path.split('.');
        let first = parts.next().filter(|p| !p.is_empty())?;
        let mut current = self.0.get(first)?;
        for part in parts {
            current = match current {
                Value::Object(map) => map.get(part)?,
                Value::Array(items) => items.get(part.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Portable encoding used for persistent cache entries
    pub fn to_bytes(&self) -> ResolveResult<Vec<u8>> {
        Ok(serde_json::to_vec(&self.0)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> ResolveResult<Self> {
        let value: Value = serde_json::from_slice(bytes)?;
        Self::from_value(value).map_err(|e| ResolveError::Cache(e.to_string()))
    }
}

impl From<Map<String, Value>> for MergedMapping {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn mapping(value: Value) -> MergedMapping {
        MergedMapping::from_value(value).unwrap()
    }

    #[test]
    fn test_dotted_lookup() {
        let m = mapping(json!({
            "url": "localhost",
            "session": {"name": "app", "time": 3600},
            "hosts": ["a", "b"]
        }));

        assert_eq!(m.get("url"), Some(&json!("localhost")));
        assert_eq!(m.get("session.time"), Some(&json!(3600)));
        assert_eq!(m.get("hosts.1"), Some(&json!("b")));
        assert_eq!(m.get("session.missing"), None);
        assert_eq!(m.get("url.deeper"), None);
        assert_eq!(m.get(""), None);
    }

    #[test]
    fn test_overlay_replaces_nested_blocks_wholesale() {
        let mut base = mapping(json!({
            "a": 1,
            "db": {"host": "localhost", "port": 5432}
        }));
        base.overlay(mapping(json!({"db": {"host": "db.internal"}, "b": 3})));

        assert_eq!(base.get("db.host"), Some(&json!("db.internal")));
        assert_eq!(base.get("db.port"), None);
        assert_eq!(base.get("a"), Some(&json!(1)));
        assert_eq!(base.get("b"), Some(&json!(3)));
    }

    #[test]
    fn test_overlay_keeps_first_seen_order() {
        let mut base = mapping(json!({"first": 1, "second": 2}));
        base.overlay(mapping(json!({"third": 3, "first": 10})));

        let keys: Vec<&str> = base.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["first", "second", "third"]);
        assert_eq!(base.get("first"), Some(&json!(10)));
    }

    #[test]
    fn test_non_mapping_root_is_rejected() {
        assert!(MergedMapping::from_value(json!([1, 2])).is_err());
        assert!(MergedMapping::from_value(Value::Null).unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_bytes_are_cache_errors() {
        let err = MergedMapping::from_bytes(b"{not json").unwrap_err();
        assert!(matches!(err, ResolveError::Cache(_)));
    }
}
