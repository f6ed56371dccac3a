use std::{collections::HashMap, sync::Arc};

use log::debug;

use crate::core::{ResolveError, ResolveResult};

use super::{Controller, Middleware};

pub type ControllerCreateFn = fn() -> ResolveResult<Arc<dyn Controller>>;
pub type MiddlewareCreateFn = fn() -> ResolveResult<Arc<dyn Middleware>>;

/// Maps controller and middleware identifiers used in route definitions to
/// their factories. Identifiers not registered here can never be built.
#[derive(Default)]
pub struct HandlerRegistry {
    controllers: HashMap<String, ControllerCreateFn>,
    middleware: HashMap<String, MiddlewareCreateFn>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_controller(&mut self, name: impl Into<String>, create: ControllerCreateFn) -> &mut Self {
        let name = name.into();
        debug!("Registering controller '{name}'");
        self.controllers.insert(name, create);
        self
    }

    pub fn register_middleware(&mut self, name: impl Into<String>, create: MiddlewareCreateFn) -> &mut Self {
        let name = name.into();
        debug!("Registering middleware '{name}'");
        self.middleware.insert(name, create);
        self
    }

    pub fn has_controller(&self, name: &str) -> bool {
        self.controllers.contains_key(name)
    }

    pub fn has_middleware(&self, name: &str) -> bool {
        self.middleware.contains_key(name)
    }

    pub fn build_controller(&self, name: &str) -> ResolveResult<Arc<dyn Controller>> {
        let builder = self
            .controllers
            .get(name)
            .ok_or_else(|| ResolveError::NotFound(format!("Unknown controller: {name}")))?;
        builder()
    }

    pub fn build_middleware(&self, name: &str) -> ResolveResult<Arc<dyn Middleware>> {
        let builder = self
            .middleware
            .get(name)
            .ok_or_else(|| ResolveError::NotFound(format!("Unknown middleware: {name}")))?;
        builder()
    }
}
