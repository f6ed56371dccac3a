//! Request context management
//!
//! `DispatchContext` carries per-request state from route resolution through
//! middleware and controller execution.

use std::{any::Any, collections::HashMap, time::Instant};

use crate::routing::{ParamValue, ResolvedRoute};

/// Context that holds per-request state and metadata
pub struct DispatchContext {
    /// The route selected for this request (a true match or a fallback)
    pub route: ResolvedRoute,

    /// Whether `route` is a true match rather than a fallback
    pub matched: bool,

    /// Custom variables available to middleware and controllers (type-erased, thread-safe)
    vars: HashMap<String, Box<dyn Any + Send + Sync>>,
}

impl DispatchContext {
    pub fn new(route: ResolvedRoute, matched: bool) -> Self {
        let mut vars: HashMap<String, Box<dyn Any + Send + Sync>> = HashMap::new();
        vars.insert("request_start".to_string(), Box::new(Instant::now()));

        Self {
            route,
            matched,
            vars,
        }
    }

    /// Typed path parameter extracted during matching
    pub fn param(&self, name: &str) -> Option<&ParamValue> {
        self.route.params.get(name)
    }

    /// Store a typed value into the context
    pub fn set<T: Any + Send + Sync>(&mut self, key: impl Into<String>, value: T) {
        self.vars.insert(key.into(), Box::new(value));
    }

    /// Get a typed reference from the context
    pub fn get<T: Any>(&self, key: &str) -> Option<&T> {
        self.vars.get(key).and_then(|v| v.downcast_ref::<T>())
    }

    /// Get a string slice if the stored value is a `String`
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get::<String>(key).map(|s| s.as_str())
    }

    /// Check if a key exists in the context
    pub fn contains(&self, key: &str) -> bool {
        self.vars.contains_key(key)
    }
}
