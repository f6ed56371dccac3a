//! Request routing over the hierarchical route table.
//!
//! The merged `Config/Routing.yml` mapping is compiled into a [`RouteTable`]
//! and a [`RouteRequest`] is resolved against it by [`RouteResolver`].
//! [`Router`] ties both to a [`HierarchicalResolver`] and keeps the compiled
//! table for as long as the resolver hands back the same cached mapping.

pub mod pattern;
pub mod resolver;
pub mod route;

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use log::info;

use crate::{
    core::{ResolveError, ResolveResult},
    hierarchy::{HierarchicalResolver, LayerSet, MergedMapping, SourceDomain},
};

pub use pattern::{ParamValue, PlaceholderType};
pub use resolver::{ResolvedRoute, RouteRequest, RouteResolver};
pub use route::{RouteDefinition, RouteTable, View};

struct CompiledSnapshot {
    source: Arc<MergedMapping>,
    table: Arc<RouteTable>,
}

pub struct Router {
    resolver: Arc<HierarchicalResolver>,
    layers: LayerSet,
    compiled: ArcSwapOption<CompiledSnapshot>,
}

impl Router {
    pub fn new(resolver: Arc<HierarchicalResolver>, layers: LayerSet) -> ResolveResult<Self> {
        if layers.domain() != &SourceDomain::Routes {
            return Err(ResolveError::Configuration(format!(
                "router needs the routes layer set, got {}",
                layers.domain().namespace()
            )));
        }

        Ok(Self {
            resolver,
            layers,
            compiled: ArcSwapOption::empty(),
        })
    }

    pub fn layers(&self) -> &LayerSet {
        &self.layers
    }

    /// Current route table, recompiled only when the merged mapping changed
    pub fn table(&self) -> ResolveResult<Arc<RouteTable>> {
        let mapping = self.resolver.resolve(&self.layers)?;

        if let Some(snapshot) = self.compiled.load_full() {
            if Arc::ptr_eq(&snapshot.source, &mapping) {
                return Ok(snapshot.table.clone());
            }
        }

        let table = Arc::new(RouteTable::from_mapping(&mapping)?);
        info!("Route table compiled: {} routes", table.len());
        self.compiled.store(Some(Arc::new(CompiledSnapshot {
            source: mapping,
            table: table.clone(),
        })));
        Ok(table)
    }

    pub fn resolve(&self, request: &RouteRequest) -> ResolveResult<(ResolvedRoute, bool)> {
        let table = self.table()?;
        RouteResolver::resolve(request, &table)
    }

    /// Drop the cached routing mapping and compiled table
    pub fn invalidate(&self) -> ResolveResult<bool> {
        self.compiled.store(None);
        self.resolver.invalidate(&self.layers)
    }
}
