//! Core traits for strata components
//!
//! These are the seams to the collaborators the resolvers depend on: the
//! structured file parser, the persistent byte store and the process-lifetime
//! cache. Production implementations live in `source` and `cache`; tests swap
//! in counting or in-memory doubles.

use std::{path::Path, sync::Arc};

use super::error::ResolveResult;
use crate::hierarchy::MergedMapping;

/// Parses a declarative source file into a nested mapping
pub trait StructuredLoader: Send + Sync {
    /// Load and parse the file at `path`.
    ///
    /// Malformed content must be reported as `ResolveError::MalformedSource`.
    fn load(&self, path: &Path) -> ResolveResult<MergedMapping>;
}

/// Byte-string store keyed by logical path, surviving process restarts
pub trait PersistentCache: Send + Sync {
    /// Check whether an entry exists
    fn has(&self, key: &str) -> bool;

    /// Read an entry; fails if the entry does not exist
    fn get(&self, key: &str) -> ResolveResult<Vec<u8>>;

    /// Write an entry, replacing any previous content
    fn set(&self, key: &str, content: &[u8]) -> ResolveResult<()>;

    /// Remove an entry; fails if the entry does not exist
    fn delete(&self, key: &str) -> ResolveResult<()>;
}

/// Process-lifetime key/value store shared by every resolver in a worker
pub trait ProcessCache: Send + Sync {
    /// Check whether a value is cached under `key`
    fn exists(&self, key: &str) -> bool;

    /// Fetch the cached value
    fn fetch(&self, key: &str) -> Option<Arc<MergedMapping>>;

    /// Store a value. Existing entries are kept; the first writer wins.
    fn add(&self, key: &str, value: Arc<MergedMapping>) -> Arc<MergedMapping>;

    /// Drop a single entry
    fn invalidate(&self, key: &str) -> bool;

    /// Drop every entry
    fn clear(&self);
}
