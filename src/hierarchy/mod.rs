//! Hierarchical override resolution.
//!
//! # Data Flow
//! ```text
//! LayerSet (global, package, project, project-package)
//!     → select most specific present tier (cache identity)
//!     → dev:      parse + shallow merge every present tier
//!     → non-dev:  process cache → persistent cache → parse + merge, write back
//!     → MergedMapping
//! ```
//!
//! The same resolver serves route tables, application configuration and
//! translation dictionaries; only the `SourceDomain` differs.

pub mod layer;
pub mod mapping;
pub mod resolver;

pub use layer::{LayerSet, OverrideLayer, SourceDomain, Tier, DIR_BUNDLE};
pub use mapping::MergedMapping;
pub use resolver::HierarchicalResolver;
