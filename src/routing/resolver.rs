use std::{collections::BTreeMap, sync::Arc};

use log::{debug, warn};

use crate::core::{ResolveError, ResolveResult};

use super::{pattern::ParamValue, route::RouteDefinition, RouteTable};

/// Incoming request descriptor
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouteRequest {
    pub path: String,
    /// Uppercased request method
    pub method: String,
    pub is_ajax: bool,
}

impl RouteRequest {
    /// A missing or empty path becomes `/`
    pub fn new(path: Option<&str>, method: &str, is_ajax: bool) -> Self {
        let path = match path {
            Some(p) if !p.is_empty() => p.to_string(),
            _ => "/".to_string(),
        };
        Self {
            path,
            method: method.to_ascii_uppercase(),
            is_ajax,
        }
    }

    pub fn get(path: &str) -> Self {
        Self::new(Some(path), "GET", false)
    }
}

/// A route definition with the parameters extracted for one request
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedRoute {
    pub route: Arc<RouteDefinition>,
    pub params: BTreeMap<String, ParamValue>,
}

impl ResolvedRoute {
    pub fn name(&self) -> &str {
        &self.route.name
    }

    pub fn param(&self, name: &str) -> Option<&ParamValue> {
        self.params.get(name)
    }
}

pub struct RouteResolver;

impl RouteResolver {
    /// Resolve `request` against `table`.
    ///
    /// Returns the first definition passing the method, AJAX and path checks
    /// with `matched = true`, or else the fallback route with
    /// `matched = false`.
    pub fn resolve(
        request: &RouteRequest,
        table: &RouteTable,
    ) -> ResolveResult<(ResolvedRoute, bool)> {
        for candidate in table.iter() {
            let definition = &candidate.definition;
            if !definition.accepts_method(&request.method) || !definition.accepts_ajax(request.is_ajax)
            {
                debug!(
                    "Route '{}' skipped by method/ajax filter for {} {}",
                    definition.name, request.method, request.path
                );
                continue;
            }

            if let Some(params) = candidate.pattern.match_path(&request.path) {
                debug!("Route '{}' matched {}", definition.name, request.path);
                let resolved = ResolvedRoute {
                    route: definition.clone(),
                    params,
                };
                return Ok((resolved, true));
            }
            debug!("Route '{}' did not match {}", definition.name, request.path);
        }

        let fallback = table.fallback().ok_or(ResolveError::NoFallbackRoute)?;
        warn!(
            "No route matched {} {}, falling back to '{}'",
            request.method, request.path, fallback.name
        );
        Ok((
            ResolvedRoute {
                route: fallback.clone(),
                params: BTreeMap::new(),
            },
            false,
        ))
    }
}
