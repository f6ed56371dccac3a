use std::sync::Arc;

use dashmap::DashMap;
use log::debug;

use crate::{core::ProcessCache, hierarchy::MergedMapping};

/// In-process cache shared by every resolver of a worker.
///
/// Construct once per process and hand out clones of the `Arc`.
#[derive(Default)]
pub struct MemoryCache {
    entries: DashMap<String, Arc<MergedMapping>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ProcessCache for MemoryCache {
    fn exists(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    fn fetch(&self, key: &str) -> Option<Arc<MergedMapping>> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    fn add(&self, key: &str, value: Arc<MergedMapping>) -> Arc<MergedMapping> {
        self.entries
            .entry(key.to_string())
            .or_insert_with(|| {
                debug!("Caching mapping in process under {key}");
                value
            })
            .value()
            .clone()
    }

    fn invalidate(&self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    fn clear(&self) {
        debug!("Clearing {} process cache entries", self.entries.len());
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn mapping(value: serde_json::Value) -> Arc<MergedMapping> {
        Arc::new(MergedMapping::from_value(value).unwrap())
    }

    #[test]
    fn test_add_keeps_first_value() {
        let cache = MemoryCache::new();
        assert!(!cache.exists("k"));

        let first = cache.add("k", mapping(json!({"a": 1})));
        let second = cache.add("k", mapping(json!({"a": 2})));

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.fetch("k").unwrap().get("a"), Some(&json!(1)));
    }

    #[test]
    fn test_invalidate_and_clear() {
        let cache = MemoryCache::new();
        cache.add("a", mapping(json!({})));
        cache.add("b", mapping(json!({})));

        assert!(cache.invalidate("a"));
        assert!(!cache.invalidate("a"));
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
        assert!(cache.fetch("b").is_none());
    }
}
