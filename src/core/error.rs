//! Unified error handling for strata
//!
//! Every fallible resolution path returns [`ResolveResult`]. Parser and
//! storage errors are folded into this enum at the module boundary so callers
//! never see a collaborator's native error type.

use std::{fmt, path::PathBuf};

/// Unified error types for route, configuration and dictionary resolution
#[derive(Debug)]
pub enum ResolveError {
    /// The Global tier source file does not exist
    MissingGlobalSource(PathBuf),

    /// A route pattern uses a placeholder type outside the supported set
    UnknownPlaceholderType(String),

    /// A structured source file failed to parse
    MalformedSource { path: PathBuf, message: String },

    /// Persistent or process cache failures, including corrupt entries
    Cache(String),

    /// No candidate matched and the table has no fallback route
    NoFallbackRoute,

    /// Schema validation errors for route entries or settings
    Validation(String),

    /// Runtime configuration errors
    Configuration(String),

    /// Lookup of a named resource failed
    NotFound(String),

    /// File system errors
    Io(std::io::Error),

    /// Internal system errors
    Internal(String),
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveError::MissingGlobalSource(path) => {
                write!(f, "Global source not found: {}", path.display())
            }
            ResolveError::UnknownPlaceholderType(ty) => {
                write!(f, "Unknown placeholder type: {ty}")
            }
            ResolveError::MalformedSource { path, message } => {
                write!(f, "Malformed source {}: {message}", path.display())
            }
            ResolveError::Cache(msg) => write!(f, "Cache error: {msg}"),
            ResolveError::NoFallbackRoute => {
                write!(f, "No route matched and no fallback route is defined")
            }
            ResolveError::Validation(msg) => write!(f, "Validation error: {msg}"),
            ResolveError::Configuration(msg) => write!(f, "Configuration error: {msg}"),
            ResolveError::NotFound(msg) => write!(f, "Resource not found: {msg}"),
            ResolveError::Io(err) => write!(f, "I/O error: {err}"),
            ResolveError::Internal(msg) => write!(f, "Internal error: {msg}"),
        }
    }
}

impl std::error::Error for ResolveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ResolveError::Io(err) => Some(err),
            _ => None,
        }
    }
}

// Error conversions
impl From<std::io::Error> for ResolveError {
    fn from(err: std::io::Error) -> Self {
        ResolveError::Io(err)
    }
}

impl From<serde_json::Error> for ResolveError {
    fn from(err: serde_json::Error) -> Self {
        ResolveError::Cache(format!("corrupt cache entry: {err}"))
    }
}

impl From<validator::ValidationErrors> for ResolveError {
    fn from(err: validator::ValidationErrors) -> Self {
        ResolveError::Validation(err.to_string())
    }
}

/// Result type alias for resolution operations
pub type ResolveResult<T> = std::result::Result<T, ResolveError>;

/// Helper trait for adding context to errors
pub trait ErrorContext<T> {
    fn with_context(self, context: &str) -> ResolveResult<T>;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: fmt::Display,
{
    fn with_context(self, context: &str) -> ResolveResult<T> {
        self.map_err(|e| ResolveError::Internal(format!("{context}: {e}")))
    }
}

/// Convenience macros for error creation
#[macro_export]
macro_rules! config_error {
    ($msg:expr) => {
        $crate::core::ResolveError::Configuration($msg.to_string())
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::core::ResolveError::Configuration(format!($fmt, $($arg)*))
    };
}

#[macro_export]
macro_rules! internal_error {
    ($msg:expr) => {
        $crate::core::ResolveError::Internal($msg.to_string())
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::core::ResolveError::Internal(format!($fmt, $($arg)*))
    };
}
