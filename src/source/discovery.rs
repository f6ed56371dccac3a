//! Package discovery.
//!
//! Walks a package directory and merges the co-located source file of every
//! package it finds, so packages can contribute routes without a central
//! registry. A package that holds its own `Bundle/` directory is walked
//! recursively. Entries are visited in name order.

use std::{
    fs,
    path::{Path, PathBuf},
};

use log::{debug, info};

use crate::{
    core::{ResolveResult, StructuredLoader},
    hierarchy::{MergedMapping, DIR_BUNDLE},
};

/// Merge `<dir>/<package>/<relative_file>` for every package under `dir`.
///
/// Returns an empty mapping when `dir` does not exist.
pub fn discover_packages(
    loader: &dyn StructuredLoader,
    dir: &Path,
    relative_file: &Path,
) -> ResolveResult<MergedMapping> {
    let mut merged = MergedMapping::new();
    if !dir.is_dir() {
        debug!("No package directory at {}", dir.display());
        return Ok(merged);
    }

    for package in sorted_subdirs(dir)? {
        let source = package.join(relative_file);
        if source.is_file() {
            info!("Merging discovered source {}", source.display());
            merged.overlay(loader.load(&source)?);
        }

        let nested = package.join(DIR_BUNDLE);
        if nested.is_dir() {
            merged.overlay(discover_packages(loader, &nested, relative_file)?);
        }
    }

    Ok(merged)
}

fn sorted_subdirs(dir: &Path) -> ResolveResult<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            dirs.push(path);
        }
    }
    dirs.sort();
    Ok(dirs)
}
