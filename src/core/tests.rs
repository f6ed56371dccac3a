//! Tests for the core module
//!
//! Error conversions and the per-request dispatch context.

#[cfg(test)]
mod tests {
    use std::{collections::BTreeMap, error::Error, io, path::PathBuf, sync::Arc, time::Instant};

    use super::super::*;
    use crate::routing::{ParamValue, ResolvedRoute, RouteDefinition};

    fn resolved() -> ResolvedRoute {
        let mut params = BTreeMap::new();
        params.insert("id".to_string(), ParamValue::Int(7));
        ResolvedRoute {
            route: Arc::new(RouteDefinition {
                name: "user".into(),
                path: "/user/{int:id}".into(),
                ..Default::default()
            }),
            params,
        }
    }

    #[test]
    fn test_error_display() {
        let err = ResolveError::MissingGlobalSource(PathBuf::from("/srv/app/Config/Routing.yml"));
        assert_eq!(
            err.to_string(),
            "Global source not found: /srv/app/Config/Routing.yml"
        );

        let err = ResolveError::MalformedSource {
            path: PathBuf::from("a.yml"),
            message: "bad indent".into(),
        };
        assert_eq!(err.to_string(), "Malformed source a.yml: bad indent");
        assert_eq!(
            ResolveError::UnknownPlaceholderType("uuid".into()).to_string(),
            "Unknown placeholder type: uuid"
        );
    }

    #[test]
    fn test_error_conversions() {
        let err: ResolveError = io::Error::new(io::ErrorKind::NotFound, "gone").into();
        assert!(matches!(err, ResolveError::Io(_)));
        assert!(err.source().is_some());

        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: ResolveError = json_err.into();
        assert!(matches!(err, ResolveError::Cache(ref m) if m.starts_with("corrupt cache entry")));
        assert!(err.source().is_none());

        let result: Result<(), &str> = Err("boom");
        assert!(matches!(
            result.with_context("loading"),
            Err(ResolveError::Internal(m)) if m == "loading: boom"
        ));

        assert!(matches!(
            crate::config_error!("bad {}", "scope"),
            ResolveError::Configuration(m) if m == "bad scope"
        ));
        assert!(matches!(crate::internal_error!("oops"), ResolveError::Internal(_)));
    }

    #[test]
    fn test_dispatch_context_vars() {
        let mut ctx = DispatchContext::new(resolved(), true);
        assert!(ctx.matched);
        assert_eq!(ctx.param("id"), Some(&ParamValue::Int(7)));
        assert!(ctx.get::<Instant>("request_start").is_some());

        ctx.set("user", "ana".to_string());
        ctx.set("attempts", 3u32);
        assert_eq!(ctx.get_str("user"), Some("ana"));
        assert_eq!(ctx.get::<u32>("attempts"), Some(&3));
        assert!(ctx.get::<i64>("attempts").is_none());

        ctx.set("attempts", 4u32);
        assert_eq!(ctx.get::<u32>("attempts"), Some(&4));
        assert!(ctx.contains("user"));
        assert!(!ctx.contains("session"));
    }
}
