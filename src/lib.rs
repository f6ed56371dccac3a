//! Layered route, configuration and dictionary resolution.
//!
//! Declarative YAML sources are merged across the global, package, project
//! and project-package tiers and served through an in-process cache backed
//! by a persistent one. Routes resolved from the merged table are dispatched
//! through an explicit handler registry.

pub mod app;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod core;
pub mod dispatch;
pub mod hierarchy;
pub mod logging;
pub mod routing;
pub mod source;
