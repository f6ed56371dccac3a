//! Cache tiers backing the hierarchical resolver.
//!
//! `MemoryCache` is the fast process-lifetime tier, `FileCache` the slower
//! persistent tier that survives restarts.

pub mod persistent;
pub mod process;

pub use persistent::FileCache;
pub use process::MemoryCache;
