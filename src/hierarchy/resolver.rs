use std::sync::{Arc, Mutex};

use dashmap::DashMap;
use log::{debug, info};

use super::{
    layer::{LayerSet, OverrideLayer, Tier, DIR_BUNDLE},
    mapping::MergedMapping,
};
use crate::{
    config::Scope,
    core::{PersistentCache, ProcessCache, ResolveResult, StructuredLoader},
    internal_error,
    source::discovery::discover_packages,
};

/// Resolves a `LayerSet` into one merged mapping.
///
/// In dev scope every call re-parses the sources. Otherwise lookups escalate
/// from the process cache to the persistent cache and finally to a full
/// parse and merge, whose result is written back to both tiers.
pub struct HierarchicalResolver {
    scope: Scope,
    loader: Arc<dyn StructuredLoader>,
    process_cache: Arc<dyn ProcessCache>,
    persistent_cache: Arc<dyn PersistentCache>,
    /// One lock per cache key with a build in progress
    in_flight: DashMap<String, Arc<Mutex<()>>>,
}

impl HierarchicalResolver {
    pub fn new(
        scope: Scope,
        loader: Arc<dyn StructuredLoader>,
        process_cache: Arc<dyn ProcessCache>,
        persistent_cache: Arc<dyn PersistentCache>,
    ) -> Self {
        Self {
            scope,
            loader,
            process_cache,
            persistent_cache,
            in_flight: DashMap::new(),
        }
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    pub fn resolve(&self, layers: &LayerSet) -> ResolveResult<Arc<MergedMapping>> {
        let selected = layers.select()?;

        if self.scope.is_dev() {
            debug!(
                "Building {} mapping from sources (scope {}, tier {})",
                layers.domain().namespace(),
                self.scope,
                selected.tier
            );
            return Ok(Arc::new(self.build(layers)?));
        }

        if let Some(mapping) = self.lookup_cached(selected)? {
            return Ok(mapping);
        }

        // Only one caller per key rebuilds; the rest wait and read the result.
        let slot = self
            .in_flight
            .entry(selected.cache_key.clone())
            .or_default()
            .value()
            .clone();
        let guard = slot
            .lock()
            .map_err(|_| internal_error!("build lock poisoned for {}", selected.cache_key))?;

        let result = self
            .lookup_cached(selected)
            .and_then(|cached| match cached {
                Some(mapping) => Ok(mapping),
                None => self.build_and_store(layers, selected),
            });

        drop(guard);
        self.in_flight.remove(&selected.cache_key);
        result
    }

    /// Drop both cache entries of the selected tier.
    ///
    /// Returns whether anything was removed.
    pub fn invalidate(&self, layers: &LayerSet) -> ResolveResult<bool> {
        let selected = layers.select()?;
        let mut removed = self.process_cache.invalidate(&selected.cache_key);
        if self.persistent_cache.has(&selected.cache_path) {
            self.persistent_cache.delete(&selected.cache_path)?;
            removed = true;
        }
        if removed {
            info!("Invalidated cached mapping {}", selected.cache_path);
        }
        Ok(removed)
    }

    fn lookup_cached(&self, layer: &OverrideLayer) -> ResolveResult<Option<Arc<MergedMapping>>> {
        if let Some(mapping) = self.process_cache.fetch(&layer.cache_key) {
            debug!("Process cache hit for {}", layer.cache_key);
            return Ok(Some(mapping));
        }

        if self.persistent_cache.has(&layer.cache_path) {
            debug!("Persistent cache hit for {}", layer.cache_path);
            let bytes = self.persistent_cache.get(&layer.cache_path)?;
            let mapping = MergedMapping::from_bytes(&bytes)?;
            return Ok(Some(
                self.process_cache.add(&layer.cache_key, Arc::new(mapping)),
            ));
        }

        Ok(None)
    }

    fn build_and_store(
        &self,
        layers: &LayerSet,
        selected: &OverrideLayer,
    ) -> ResolveResult<Arc<MergedMapping>> {
        let mapping = self.build(layers)?;
        info!(
            "Built {} mapping from {} tier, writing {}",
            layers.domain().namespace(),
            selected.tier,
            selected.cache_path
        );
        self.persistent_cache
            .set(&selected.cache_path, &mapping.to_bytes()?)?;
        Ok(self.process_cache.add(&selected.cache_key, Arc::new(mapping)))
    }

    /// Parse and shallow-merge every contributing tier, Global first.
    ///
    /// Domains that discover packages merge the discovered files right after
    /// Global so that the override tiers still win.
    fn build(&self, layers: &LayerSet) -> ResolveResult<MergedMapping> {
        let mut merged = MergedMapping::new();

        for layer in layers.contributing()? {
            if let Some(source) = &layer.source {
                merged.overlay(self.loader.load(source)?);
            }

            if layer.tier == Tier::Global && layers.domain().discovers_packages() {
                merged.overlay(discover_packages(
                    self.loader.as_ref(),
                    &layers.root().join(DIR_BUNDLE),
                    &layers.domain().relative_file(),
                )?);
            }
        }

        Ok(merged)
    }
}
