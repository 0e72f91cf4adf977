//! Versioned cache documents for the greedy connection model.
//!
//! Each workspace holds up to two JSON documents, named by convention:
//! `fiber_cache.json` (one-to-one, connected-node cache) and
//! `school_cache.json` (one-to-many, unconnected-candidate cache). A missing
//! file is not an error; it simply forces full recomputation. A malformed
//! file surfaces to the caller.
//!
//! Documents carry a `schema_version` discriminator and a `written_at`
//! timestamp alongside the cache payload for forward compatibility.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sct_schemas::{GreedyConnectCache, MultiLookupDistanceCache, SingleLookupDistanceCache};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::storage::DataStore;

/// Current cache document schema version (semver)
pub const CACHE_SCHEMA_VERSION: &str = "1.0.0";

/// Conventional file name of the connected-node (one-to-one) cache
pub const CONNECTED_CACHE_FILE: &str = "fiber_cache.json";

/// Conventional file name of the unconnected-candidate (one-to-many) cache
pub const UNCONNECTED_CACHE_FILE: &str = "school_cache.json";

/// Envelope wrapping a cache payload with versioning metadata. The payload
/// flattens into the document root, so the wire shape stays
/// `{"lookup": {...}, "cache_type": ..., ...}` plus the metadata fields.
#[derive(Debug, Serialize, Deserialize)]
struct CacheDocument<T> {
    #[serde(default = "default_schema_version")]
    schema_version: String,
    #[serde(default)]
    written_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    cache: T,
}

fn default_schema_version() -> String {
    CACHE_SCHEMA_VERSION.to_string()
}

fn load_document<T: DeserializeOwned>(store: &dyn DataStore, path: &Path) -> Result<Option<T>> {
    if !store.exists(path) {
        return Ok(None);
    }
    let raw = store.read_to_string(path)?;
    let document: CacheDocument<T> = serde_json::from_str(&raw)
        .with_context(|| format!("parsing cache document '{}'", path.display()))?;
    Ok(Some(document.cache))
}

fn save_document<T: Serialize>(store: &dyn DataStore, path: &Path, cache: &T) -> Result<()> {
    let document = CacheDocument {
        schema_version: default_schema_version(),
        written_at: Some(Utc::now()),
        cache,
    };
    let raw = serde_json::to_string(&document)
        .with_context(|| format!("serializing cache document '{}'", path.display()))?;
    store.write_string(path, &raw)
}

/// Load both caches from a workspace by filename convention. Absent files
/// become absent caches.
pub fn load_greedy_cache(store: &dyn DataStore, workspace: &Path) -> Result<GreedyConnectCache> {
    let connected: Option<SingleLookupDistanceCache> =
        load_document(store, &workspace.join(CONNECTED_CACHE_FILE))?;
    let unconnected: Option<MultiLookupDistanceCache> =
        load_document(store, &workspace.join(UNCONNECTED_CACHE_FILE))?;
    Ok(GreedyConnectCache::new(connected, unconnected))
}

/// Persist both caches back to a workspace. Absent halves are skipped.
pub fn save_greedy_cache(
    store: &dyn DataStore,
    workspace: &Path,
    cache: &GreedyConnectCache,
) -> Result<()> {
    if let Some(connected) = &cache.connected_cache {
        save_document(store, &workspace.join(CONNECTED_CACHE_FILE), connected)?;
    }
    if let Some(unconnected) = &cache.unconnected_cache {
        save_document(store, &workspace.join(UNCONNECTED_CACHE_FILE), unconnected)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::LocalDataStore;
    use sct_core::{Coordinate, PairwiseDistance};

    fn pair(source: &str, target: &str, distance: f64) -> PairwiseDistance {
        PairwiseDistance::new(
            Coordinate::new(source, 0.0, 0.0),
            Coordinate::new(target, 1.0, 1.0),
            distance,
        )
    }

    #[test]
    fn test_missing_files_are_absent_caches() {
        let dir = tempfile::tempdir().unwrap();
        let cache = load_greedy_cache(&LocalDataStore, dir.path()).unwrap();
        assert!(cache.connected_cache.is_none());
        assert!(cache.unconnected_cache.is_none());
    }

    #[test]
    fn test_save_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalDataStore;
        let cache = GreedyConnectCache::new(
            Some(SingleLookupDistanceCache::from_distances(&[pair(
                "s-1", "n-a", 1_500.0,
            )])),
            Some(MultiLookupDistanceCache::from_distances(
                &[pair("s-2", "n-a", 900.0), pair("s-2", "n-b", 700.0)],
                10,
            )),
        );
        save_greedy_cache(&store, dir.path(), &cache).unwrap();
        assert!(store.exists(&dir.path().join(CONNECTED_CACHE_FILE)));
        assert!(store.exists(&dir.path().join(UNCONNECTED_CACHE_FILE)));

        let back = load_greedy_cache(&store, dir.path()).unwrap();
        assert_eq!(back, cache);
    }

    #[test]
    fn test_document_carries_version_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalDataStore;
        let cache = GreedyConnectCache::new(
            Some(SingleLookupDistanceCache::from_distances(&[pair(
                "s-1", "n-a", 1_500.0,
            )])),
            None,
        );
        save_greedy_cache(&store, dir.path(), &cache).unwrap();

        let raw = store
            .read_to_string(&dir.path().join(CONNECTED_CACHE_FILE))
            .unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["schema_version"], CACHE_SCHEMA_VERSION);
        assert!(json["written_at"].is_string());
        assert_eq!(json["cache_type"], "one-to-one");
    }

    #[test]
    fn test_unversioned_document_still_loads() {
        // Documents written before the envelope existed have no metadata.
        let dir = tempfile::tempdir().unwrap();
        let store = LocalDataStore;
        store
            .write_string(
                &dir.path().join(CONNECTED_CACHE_FILE),
                r#"{"lookup": {}, "cache_type": "one-to-one"}"#,
            )
            .unwrap();
        let cache = load_greedy_cache(&store, dir.path()).unwrap();
        assert!(cache.connected_cache.is_some());
    }

    #[test]
    fn test_malformed_document_surfaces_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalDataStore;
        store
            .write_string(&dir.path().join(CONNECTED_CACHE_FILE), "{not json")
            .unwrap();
        assert!(load_greedy_cache(&store, dir.path()).is_err());
    }
}
