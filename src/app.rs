//! Wiring of the resolver, caches and the three lookup domains for one
//! project.

use std::sync::Arc;

use log::info;
use validator::Validate;

use crate::{
    cache::{FileCache, MemoryCache},
    catalog::{AppConfig, Dictionary},
    config::Settings,
    core::ResolveResult,
    hierarchy::{HierarchicalResolver, SourceDomain},
    routing::Router,
    source::YamlLoader,
};

pub struct Strata {
    settings: Settings,
    resolver: Arc<HierarchicalResolver>,
    router: Router,
    config: AppConfig,
    dictionary: Dictionary,
}

impl Strata {
    pub fn new(settings: Settings) -> ResolveResult<Self> {
        settings.validate()?;

        let resolver = Arc::new(HierarchicalResolver::new(
            settings.scope,
            Arc::new(YamlLoader::new()),
            Arc::new(MemoryCache::new()),
            Arc::new(FileCache::new(settings.cache_base())),
        ));
        info!(
            "Project {} loaded in {} scope",
            settings.project_root.display(),
            settings.scope
        );

        let router = Router::new(resolver.clone(), settings.layer_set(SourceDomain::Routes))?;
        let config = AppConfig::new(resolver.clone(), settings.layer_set(SourceDomain::Config))?;
        let dictionary = Dictionary::new(
            resolver.clone(),
            &settings.project_root,
            settings.bundle.as_deref(),
            settings.project.as_deref(),
            settings.language.clone(),
        );

        Ok(Self {
            settings,
            resolver,
            router,
            config,
            dictionary,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn resolver(&self) -> &Arc<HierarchicalResolver> {
        &self.resolver
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    pub fn dictionary_mut(&mut self) -> &mut Dictionary {
        &mut self.dictionary
    }
}
