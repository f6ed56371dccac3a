use std::sync::Arc;

use http::Method;
use log::{debug, error};
use serde::{Deserialize, Deserializer, Serialize};
use validator::{Validate, ValidationError};

use crate::{
    core::{ResolveError, ResolveResult},
    hierarchy::MergedMapping,
};

use super::pattern::Pattern;

/// Names consulted, in order, when no route matches
pub const FALLBACK_ROUTES: [&str; 3] = ["otherwise", "404", "index"];

/// View attached to a route: a bare name or `{template: name}`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum View {
    Name(String),
    Template { template: String },
}

impl View {
    pub fn template(&self) -> &str {
        match self {
            View::Name(name) => name,
            View::Template { template } => template,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Middleware {
    #[serde(default)]
    pub before: Vec<String>,
    #[serde(default)]
    pub after: Vec<String>,
}

/// One named entry of the route table
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "RouteDefinition::validate_definition"))]
pub struct RouteDefinition {
    /// Key of the entry in the routing file
    #[serde(skip)]
    pub name: String,

    #[validate(length(min = 1))]
    pub path: String,
    #[serde(default, rename = "method", deserialize_with = "one_or_many")]
    pub methods: Vec<String>,
    #[serde(rename = "ajax")]
    pub ajax_only: Option<bool>,

    pub controller: Option<String>,
    pub action: Option<String>,
    pub bundle: Option<String>,
    pub project: Option<String>,

    pub view: Option<View>,
    #[serde(default)]
    pub middleware: Middleware,
}

impl RouteDefinition {
    fn validate_definition(&self) -> Result<(), ValidationError> {
        if !self.path.starts_with('/') {
            return Err(ValidationError::new("path_must_start_with_slash"));
        }

        for method in &self.methods {
            if method.to_ascii_uppercase().parse::<Method>().is_err() {
                let mut err = ValidationError::new("invalid_http_method");
                err.add_param("method".into(), method);
                return Err(err);
            }
        }

        Ok(())
    }

    /// Whether a request with `method` passes the method filter
    pub fn accepts_method(&self, method: &str) -> bool {
        self.methods.is_empty() || self.methods.iter().any(|m| m.eq_ignore_ascii_case(method))
    }

    /// Whether a request with this AJAX flag passes the AJAX filter
    pub fn accepts_ajax(&self, is_ajax: bool) -> bool {
        self.ajax_only.map_or(true, |ajax| ajax == is_ajax)
    }

    pub fn controller(&self) -> Option<&str> {
        self.controller.as_deref()
    }

    pub fn action(&self) -> Option<&str> {
        self.action.as_deref()
    }

    pub fn bundle(&self) -> Option<&str> {
        self.bundle.as_deref()
    }

    pub fn project(&self) -> Option<&str> {
        self.project.as_deref()
    }

    pub fn view(&self) -> Option<&str> {
        self.view.as_ref().map(View::template)
    }

    pub fn middleware_before(&self) -> &[String] {
        &self.middleware.before
    }

    pub fn middleware_after(&self) -> &[String] {
        &self.middleware.after
    }
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(method) => vec![method],
        OneOrMany::Many(methods) => methods,
    })
}

/// A definition together with its compiled pattern
#[derive(Clone, Debug)]
pub struct CompiledRoute {
    pub definition: Arc<RouteDefinition>,
    pub pattern: Pattern,
}

/// Ordered, immutable route table
#[derive(Clone, Debug, Default)]
pub struct RouteTable {
    routes: Vec<CompiledRoute>,
}

impl RouteTable {
    /// Compile the merged routing mapping, keeping declaration order
    pub fn from_mapping(mapping: &MergedMapping) -> ResolveResult<Self> {
        let definitions = mapping
            .iter()
            .map(|(name, value)| {
                let mut definition: RouteDefinition = serde_json::from_value(value.clone())
                    .map_err(|e| ResolveError::Validation(format!("route '{name}': {e}")))?;
                definition.name = name.clone();
                Ok(definition)
            })
            .collect::<ResolveResult<Vec<_>>>()?;

        Self::compile(definitions)
    }

    pub fn compile(definitions: Vec<RouteDefinition>) -> ResolveResult<Self> {
        let mut routes = Vec::with_capacity(definitions.len());
        for definition in definitions {
            definition.validate().map_err(|e| {
                ResolveError::Validation(format!("route '{}': {}", definition.name, e))
            })?;
            let pattern = Pattern::compile(&definition.path).inspect_err(|e| {
                if let ResolveError::UnknownPlaceholderType(ty) = e {
                    error!(
                        "Route '{}' ({}) uses unknown placeholder type '{}'",
                        definition.name, definition.path, ty
                    );
                }
            })?;
            routes.push(CompiledRoute {
                definition: Arc::new(definition),
                pattern,
            });
        }

        debug!("Compiled route table with {} routes", routes.len());
        Ok(Self { routes })
    }

    pub fn iter(&self) -> impl Iterator<Item = &CompiledRoute> {
        self.routes.iter()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Arc<RouteDefinition>> {
        self.routes
            .iter()
            .map(|route| &route.definition)
            .find(|definition| definition.name == name)
    }

    /// First of `otherwise`, `404`, `index` present in the table
    pub fn fallback(&self) -> Option<&Arc<RouteDefinition>> {
        FALLBACK_ROUTES.iter().find_map(|name| self.get(name))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn mapping(value: serde_json::Value) -> MergedMapping {
        MergedMapping::from_value(value).unwrap()
    }

    #[test]
    fn test_definition_fields() {
        let table = RouteTable::from_mapping(&mapping(json!({
            "post": {
                "path": "/blog/{int:id}",
                "method": ["get", "HEAD"],
                "ajax": false,
                "controller": "Blog\\Post",
                "action": "show",
                "bundle": "Blog",
                "view": {"template": "post.html"},
                "middleware": {"before": ["auth"]}
            },
            "home": {"path": "/", "method": "POST", "view": "home.html"}
        })))
        .unwrap();

        let post = table.get("post").unwrap();
        assert_eq!(post.name, "post");
        assert_eq!(post.controller(), Some("Blog\\Post"));
        assert_eq!(post.action(), Some("show"));
        assert_eq!(post.bundle(), Some("Blog"));
        assert_eq!(post.project(), None);
        assert_eq!(post.view(), Some("post.html"));
        assert_eq!(post.middleware_before(), ["auth".to_string()]);
        assert!(post.middleware_after().is_empty());
        assert!(post.accepts_method("GET"));
        assert!(post.accepts_method("head"));
        assert!(!post.accepts_method("POST"));
        assert!(post.accepts_ajax(false));
        assert!(!post.accepts_ajax(true));

        let home = table.get("home").unwrap();
        assert_eq!(home.methods, vec!["POST".to_string()]);
        assert_eq!(home.view(), Some("home.html"));
        assert!(home.accepts_ajax(true));
    }

    #[test]
    fn test_declaration_order_and_fallback() {
        let table = RouteTable::from_mapping(&mapping(json!({
            "index": {"path": "/"},
            "a": {"path": "/a"},
            "404": {"path": "/not-found"},
            "b": {"path": "/b"}
        })))
        .unwrap();

        let names: Vec<_> = table.iter().map(|r| r.definition.name.as_str()).collect();
        assert_eq!(names, ["index", "a", "404", "b"]);
        assert_eq!(table.fallback().unwrap().name, "404");
    }

    #[test]
    fn test_invalid_definitions() {
        let missing_slash = RouteTable::from_mapping(&mapping(json!({"a": {"path": "a/b"}})));
        assert!(matches!(missing_slash, Err(ResolveError::Validation(_))));

        let empty_path = RouteTable::from_mapping(&mapping(json!({"a": {"path": ""}})));
        assert!(matches!(empty_path, Err(ResolveError::Validation(_))));

        let no_path = RouteTable::from_mapping(&mapping(json!({"a": {"method": "GET"}})));
        assert!(matches!(no_path, Err(ResolveError::Validation(_))));

        let bad_method =
            RouteTable::from_mapping(&mapping(json!({"a": {"path": "/a", "method": "G ET"}})));
        assert!(matches!(bad_method, Err(ResolveError::Validation(_))));

        let unknown_type = RouteTable::from_mapping(&mapping(json!({
            "ok": {"path": "/ok"},
            "item": {"path": "/item/{uuid:id}"}
        })));
        assert!(matches!(
            unknown_type,
            Err(ResolveError::UnknownPlaceholderType(t)) if t == "uuid"
        ));
    }

    #[test]
    fn test_unknown_type_in_later_route_rejects_table() {
        let _ = env_logger::builder().is_test(true).try_init();
        let result = RouteTable::from_mapping(&mapping(json!({
            "index": {"path": "/"},
            "post": {"path": "/blog/{int:id}"},
            "feed": {"path": "/blog/feed.{ext:format}", "bundle": "Blog"}
        })));

        assert!(matches!(
            result,
            Err(ResolveError::UnknownPlaceholderType(t)) if t == "ext"
        ));
    }
}
