//! Dispatch of a resolved route to its middleware and controller.
//!
//! Route definitions only name their handlers. The names are looked up in a
//! [`HandlerRegistry`] and the built handlers run in the order
//! before-middleware, controller, after-middleware.

pub mod registry;

use std::sync::Arc;

use log::{debug, info};
use serde_json::Value;

use crate::{
    core::{DispatchContext, ResolveResult},
    routing::ResolvedRoute,
};

pub use registry::{ControllerCreateFn, HandlerRegistry, MiddlewareCreateFn};

pub trait Middleware: Send + Sync {
    fn name(&self) -> &str;

    /// Handle the request.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` if the chain should stop here
    /// * `Ok(false)` to continue with the next handler
    fn handle(&self, ctx: &mut DispatchContext) -> ResolveResult<bool>;
}

pub trait Controller: Send + Sync {
    /// Run `action`, or the controller's main entry point when `None`
    fn handle(&self, action: Option<&str>, ctx: &mut DispatchContext) -> ResolveResult<Value>;
}

/// Handlers built for one resolved route
pub struct DispatchPlan {
    pub before: Vec<Arc<dyn Middleware>>,
    pub controller: Option<Arc<dyn Controller>>,
    pub action: Option<String>,
    pub after: Vec<Arc<dyn Middleware>>,
    /// View location relative to the views root: `[project/]bundle/template`
    pub view: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum DispatchOutcome {
    /// Controller output (`Null` for view-only routes)
    Completed { output: Value, view: Option<String> },
    /// A before-middleware stopped the chain
    Halted { by: String },
}

pub struct Dispatcher {
    registry: Arc<HandlerRegistry>,
}

impl Dispatcher {
    pub fn new(registry: Arc<HandlerRegistry>) -> Self {
        Self { registry }
    }

    /// Build the handlers named by `route`. Unknown names fail with `NotFound`.
    pub fn plan(&self, route: &ResolvedRoute) -> ResolveResult<DispatchPlan> {
        let definition = &route.route;
        let build_all = |names: &[String]| {
            names
                .iter()
                .map(|name| self.registry.build_middleware(name))
                .collect::<ResolveResult<Vec<_>>>()
        };

        let controller = definition
            .controller()
            .map(|name| self.registry.build_controller(name))
            .transpose()?;

        let view = definition.view().map(|template| {
            [definition.project(), definition.bundle(), Some(template)]
                .into_iter()
                .flatten()
                .collect::<Vec<_>>()
                .join("/")
        });

        Ok(DispatchPlan {
            before: build_all(definition.middleware_before())?,
            controller,
            action: definition.action().map(str::to_string),
            after: build_all(definition.middleware_after())?,
            view,
        })
    }

    pub fn dispatch(
        &self,
        route: ResolvedRoute,
        matched: bool,
    ) -> ResolveResult<(DispatchContext, DispatchOutcome)> {
        let plan = self.plan(&route)?;
        let mut ctx = DispatchContext::new(route, matched);
        let outcome = Self::run(&plan, &mut ctx)?;
        Ok((ctx, outcome))
    }

    pub fn run(plan: &DispatchPlan, ctx: &mut DispatchContext) -> ResolveResult<DispatchOutcome> {
        for middleware in &plan.before {
            if middleware.handle(ctx)? {
                info!(
                    "Route '{}' halted by middleware '{}'",
                    ctx.route.name(),
                    middleware.name()
                );
                return Ok(DispatchOutcome::Halted {
                    by: middleware.name().to_string(),
                });
            }
        }

        let output = match &plan.controller {
            Some(controller) => controller.handle(plan.action.as_deref(), ctx)?,
            None => Value::Null,
        };

        for middleware in &plan.after {
            if middleware.handle(ctx)? {
                debug!("After-middleware '{}' stopped the chain", middleware.name());
                break;
            }
        }

        Ok(DispatchOutcome::Completed {
            output,
            view: plan.view.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use serde_json::json;

    use super::*;
    use crate::{
        core::ResolveError,
        routing::{ParamValue, RouteDefinition, View},
    };

    fn trace(ctx: &mut DispatchContext, step: &str) {
        let mut steps = ctx.get::<Vec<String>>("trace").cloned().unwrap_or_default();
        steps.push(step.to_string());
        ctx.set("trace", steps);
    }

    struct Auth;

    impl Middleware for Auth {
        fn name(&self) -> &str {
            "auth"
        }

        fn handle(&self, ctx: &mut DispatchContext) -> ResolveResult<bool> {
            trace(ctx, "auth");
            Ok(ctx.get_str("user").is_none() && ctx.contains("deny"))
        }
    }

    struct Audit;

    impl Middleware for Audit {
        fn name(&self) -> &str {
            "audit"
        }

        fn handle(&self, ctx: &mut DispatchContext) -> ResolveResult<bool> {
            trace(ctx, "audit");
            Ok(false)
        }
    }

    struct Posts;

    impl Controller for Posts {
        fn handle(&self, action: Option<&str>, ctx: &mut DispatchContext) -> ResolveResult<Value> {
            trace(ctx, action.unwrap_or("main"));
            let id = ctx.param("id").and_then(ParamValue::as_int);
            Ok(json!({ "id": id }))
        }
    }

    fn create_posts() -> ResolveResult<Arc<dyn Controller>> {
        Ok(Arc::new(Posts))
    }

    fn create_auth() -> ResolveResult<Arc<dyn Middleware>> {
        Ok(Arc::new(Auth))
    }

    fn create_audit() -> ResolveResult<Arc<dyn Middleware>> {
        Ok(Arc::new(Audit))
    }

    fn registry() -> Arc<HandlerRegistry> {
        let mut registry = HandlerRegistry::new();
        registry
            .register_controller("Posts", create_posts)
            .register_middleware("auth", create_auth)
            .register_middleware("audit", create_audit);
        Arc::new(registry)
    }

    fn resolved(definition: RouteDefinition, id: i64) -> ResolvedRoute {
        let mut params = BTreeMap::new();
        params.insert("id".to_string(), ParamValue::Int(id));
        ResolvedRoute {
            route: Arc::new(definition),
            params,
        }
    }

    fn post_route() -> RouteDefinition {
        let mut definition: RouteDefinition = serde_json::from_value(json!({
            "path": "/post/{int:id}",
            "controller": "Posts",
            "action": "show",
            "bundle": "Blog",
            "project": "Site",
            "view": {"template": "post.html"},
            "middleware": {"before": ["auth"], "after": ["audit"]}
        }))
        .unwrap();
        definition.name = "post".into();
        definition
    }

    #[test]
    fn test_runs_before_controller_after() {
        let _ = env_logger::builder().is_test(true).try_init();
        let dispatcher = Dispatcher::new(registry());

        let (ctx, outcome) = dispatcher.dispatch(resolved(post_route(), 5), true).unwrap();
        assert_eq!(
            outcome,
            DispatchOutcome::Completed {
                output: json!({"id": 5}),
                view: Some("Site/Blog/post.html".into()),
            }
        );
        assert!(ctx.matched);
        assert_eq!(
            ctx.get::<Vec<String>>("trace").unwrap(),
            &vec!["auth".to_string(), "show".into(), "audit".into()]
        );
    }

    #[test]
    fn test_before_middleware_can_halt() {
        let _ = env_logger::builder().is_test(true).try_init();
        let dispatcher = Dispatcher::new(registry());
        let plan = dispatcher.plan(&resolved(post_route(), 1)).unwrap();

        let mut ctx = DispatchContext::new(resolved(post_route(), 1), true);
        ctx.set("deny", true);
        let outcome = Dispatcher::run(&plan, &mut ctx).unwrap();

        assert_eq!(outcome, DispatchOutcome::Halted { by: "auth".into() });
        assert_eq!(ctx.get::<Vec<String>>("trace").unwrap(), &vec!["auth".to_string()]);
    }

    #[test]
    fn test_view_only_route() {
        let dispatcher = Dispatcher::new(registry());
        let definition = RouteDefinition {
            path: "/about".into(),
            bundle: Some("Pages".into()),
            view: Some(View::Name("about.html".into())),
            ..Default::default()
        };

        let (_, outcome) = dispatcher.dispatch(resolved(definition, 0), false).unwrap();
        assert_eq!(
            outcome,
            DispatchOutcome::Completed {
                output: Value::Null,
                view: Some("Pages/about.html".into()),
            }
        );
    }

    #[test]
    fn test_unknown_handlers_are_rejected() {
        let dispatcher = Dispatcher::new(registry());

        let mut definition = post_route();
        definition.controller = Some("Shell".into());
        assert!(matches!(
            dispatcher.plan(&resolved(definition, 1)),
            Err(ResolveError::NotFound(_))
        ));

        let mut definition = post_route();
        definition.middleware.after.push("eval".into());
        assert!(matches!(
            dispatcher.plan(&resolved(definition, 1)),
            Err(ResolveError::NotFound(_))
        ));
    }
}
