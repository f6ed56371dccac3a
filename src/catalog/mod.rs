//! Lookups over the configuration and dictionary domains.
//!
//! Both are thin views over [`HierarchicalResolver`](crate::hierarchy::HierarchicalResolver):
//! `Config/Config.yml` and `i18n/<lang>.yml` are resolved with the same tier
//! selection and caching as the route table, then addressed by dotted key.

pub mod config;
pub mod i18n;

pub use config::AppConfig;
pub use i18n::{format_message, Dictionary};
