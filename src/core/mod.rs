//! Core abstractions and interfaces for strata
//!
//! This module provides the error type, the collaborator traits and the
//! per-request context shared by the resolution and dispatch layers.

pub mod context;
pub mod error;
pub mod traits;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use context::DispatchContext;
pub use error::{ErrorContext, ResolveError, ResolveResult};
pub use traits::*;
