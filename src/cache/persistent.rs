use std::{
    fs,
    path::{Path, PathBuf},
};

use log::debug;

use crate::core::{PersistentCache, ResolveError, ResolveResult};

/// Name of the cache directory under the configured location
const DIR: &str = ".cache";

/// Extension of every entry file
const EXTENSION: &str = "cache";

/// Persistent cache storing one file per entry under `<base>/.cache/`.
///
/// Keys are `/`-separated logical paths; intermediate directories are created
/// on write.
#[derive(Clone, Debug)]
pub struct FileCache {
    dir: PathBuf,
}

impl FileCache {
    pub fn new(base: impl AsRef<Path>) -> Self {
        Self {
            dir: base.as_ref().join(DIR),
        }
    }

    /// Directory holding the entries
    pub fn path(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, key: &str) -> ResolveResult<PathBuf> {
        let mut path = self.dir.clone();
        for part in key.split('/').filter(|p| !p.is_empty()) {
            if part == "." || part == ".." {
                return Err(ResolveError::Cache(format!("invalid cache key: {key}")));
            }
            path.push(part);
        }
        if path == self.dir {
            return Err(ResolveError::Cache("empty cache key".to_string()));
        }
        let mut file = path.into_os_string();
        file.push(".");
        file.push(EXTENSION);
        Ok(PathBuf::from(file))
    }

    fn missing(key: &str) -> ResolveError {
        ResolveError::Cache(format!("no cache entry for {key}"))
    }
}

impl PersistentCache for FileCache {
    fn has(&self, key: &str) -> bool {
        self.entry_path(key).is_ok_and(|path| path.is_file())
    }

    fn get(&self, key: &str) -> ResolveResult<Vec<u8>> {
        let path = self.entry_path(key)?;
        if !path.is_file() {
            return Err(Self::missing(key));
        }
        Ok(fs::read(path)?)
    }

    fn set(&self, key: &str, content: &[u8]) -> ResolveResult<()> {
        let path = self.entry_path(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        debug!("Writing cache entry {}", path.display());
        fs::write(path, content)?;
        Ok(())
    }

    fn delete(&self, key: &str) -> ResolveResult<()> {
        let path = self.entry_path(key)?;
        if !path.is_file() {
            return Err(Self::missing(key));
        }
        debug!("Deleting cache entry {}", path.display());
        fs::remove_file(path)?;
        Ok(())
    }
}
