//! Storage backend abstraction for workspace artifacts.
//!
//! The cache loaders take a [`DataStore`] explicitly so the backend can be
//! swapped (local disk in production, temp dirs in tests) without any
//! process-global state.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Minimal storage surface the cache and import layers need.
pub trait DataStore {
    /// Whether the resource exists. Missing resources are not errors.
    fn exists(&self, path: &Path) -> bool;

    fn read_to_string(&self, path: &Path) -> Result<String>;

    /// Write a resource, creating parent directories as needed.
    fn write_string(&self, path: &Path, contents: &str) -> Result<()>;
}

/// Local-filesystem backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalDataStore;

impl DataStore for LocalDataStore {
    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path).with_context(|| format!("reading '{}'", path.display()))
    }

    fn write_string(&self, path: &Path, contents: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating directory '{}'", parent.display()))?;
        }
        fs::write(path, contents).with_context(|| format!("writing '{}'", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("note.txt");
        let store = LocalDataStore;

        assert!(!store.exists(&path));
        store.write_string(&path, "hello").unwrap();
        assert!(store.exists(&path));
        assert_eq!(store.read_to_string(&path).unwrap(), "hello");
    }

    #[test]
    fn test_read_missing_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalDataStore;
        assert!(store.read_to_string(&dir.path().join("absent.json")).is_err());
    }
}
