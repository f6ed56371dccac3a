use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{
    core::{ResolveError, ResolveResult},
    hierarchy::{HierarchicalResolver, LayerSet, MergedMapping, SourceDomain},
};

/// Application configuration resolved from the `Config/Config.yml` tiers
pub struct AppConfig {
    resolver: Arc<HierarchicalResolver>,
    layers: LayerSet,
}

impl AppConfig {
    pub fn new(resolver: Arc<HierarchicalResolver>, layers: LayerSet) -> ResolveResult<Self> {
        if layers.domain() != &SourceDomain::Config {
            return Err(ResolveError::Configuration(format!(
                "application config needs the config layer set, got {}",
                layers.domain().namespace()
            )));
        }
        Ok(Self { resolver, layers })
    }

    /// Value at a dotted path such as `session.time`, `None` when absent
    pub fn get(&self, key: &str) -> ResolveResult<Option<Value>> {
        Ok(self.all()?.get(key).cloned())
    }

    /// Typed value at a dotted path
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> ResolveResult<Option<T>> {
        self.get(key)?
            .map(|value| {
                serde_json::from_value(value)
                    .map_err(|e| ResolveError::Validation(format!("config key '{key}': {e}")))
            })
            .transpose()
    }

    /// The whole merged configuration
    pub fn all(&self) -> ResolveResult<Arc<MergedMapping>> {
        self.resolver.resolve(&self.layers)
    }

    pub fn invalidate(&self) -> ResolveResult<bool> {
        self.resolver.invalidate(&self.layers)
    }
}
