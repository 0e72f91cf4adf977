//! Persisted nearest-neighbor caches for the greedy connection model.
//!
//! Two shapes exist. The single-lookup cache maps a source id to its one
//! closest pairwise distance (connected nodes have exactly one parent). The
//! multi-lookup cache maps a source id to its several closest options,
//! because the cheapest option for a still-unconnected school may turn out
//! infeasible.
//!
//! The caches are the long-lived, cross-run artifact of the model: loaded
//! once at start, mutated in place during the run, persisted at the end.
//! Missing lookups yield a caller-supplied default rather than an error.

use sct_core::{haversine_m, Coordinate, CoordinateId, PairwiseDistance};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Cache for existing distance data with a one-to-one mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SingleLookupDistanceCache {
    pub lookup: HashMap<CoordinateId, PairwiseDistance>,
    #[serde(default = "one_to_one")]
    pub cache_type: String,
}

fn one_to_one() -> String {
    "one-to-one".to_string()
}

impl Default for SingleLookupDistanceCache {
    fn default() -> Self {
        Self {
            lookup: HashMap::new(),
            cache_type: one_to_one(),
        }
    }
}

impl SingleLookupDistanceCache {
    /// Keep only the minimum-distance target per source id. Self-pairs are
    /// discarded; on equal distances the first record wins.
    pub fn from_distances(distances: &[PairwiseDistance]) -> Self {
        let mut lookup: HashMap<CoordinateId, PairwiseDistance> = HashMap::new();
        for d in distances {
            if d.is_self_pair() {
                continue;
            }
            match lookup.get(d.source_id()) {
                Some(existing) if existing.distance <= d.distance => {}
                _ => {
                    lookup.insert(d.source_id().clone(), d.clone());
                }
            }
        }
        Self {
            lookup,
            cache_type: one_to_one(),
        }
    }

    pub fn get(&self, key: &CoordinateId) -> Option<&PairwiseDistance> {
        self.lookup.get(key)
    }

    /// Distance for a key, or `default` (typically `+infinity`) when absent.
    pub fn get_distance(&self, key: &CoordinateId, default: f64) -> f64 {
        self.lookup.get(key).map(|d| d.distance).unwrap_or(default)
    }

    pub fn len(&self) -> usize {
        self.lookup.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lookup.is_empty()
    }
}

/// Cache for existing distance data with a one-to-many mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiLookupDistanceCache {
    pub lookup: HashMap<CoordinateId, Vec<PairwiseDistance>>,
    pub n_neighbors: usize,
    #[serde(default = "one_to_many")]
    pub cache_type: String,
}

fn one_to_many() -> String {
    "one-to-many".to_string()
}

impl MultiLookupDistanceCache {
    /// Group by source id, keeping up to `n_neighbors` closest targets in
    /// ascending distance order.
    ///
    /// Stored entries are orientation-reversed relative to the input: the
    /// target becomes `coordinate1` of the stored record, so each entry
    /// reads from the perspective of the candidate rather than the keyed
    /// node. Self-pairs are discarded.
    pub fn from_distances(distances: &[PairwiseDistance], n_neighbors: usize) -> Self {
        let mut lookup: HashMap<CoordinateId, Vec<PairwiseDistance>> = HashMap::new();
        for d in distances {
            if d.is_self_pair() {
                continue;
            }
            lookup
                .entry(d.source_id().clone())
                .or_default()
                .push(d.reversed());
        }
        for entries in lookup.values_mut() {
            entries.sort_by(|a, b| {
                a.distance
                    .partial_cmp(&b.distance)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
            entries.truncate(n_neighbors);
        }
        Self {
            lookup,
            n_neighbors,
            cache_type: one_to_many(),
        }
    }

    pub fn get(&self, key: &CoordinateId) -> Option<&[PairwiseDistance]> {
        self.lookup.get(key).map(|v| v.as_slice())
    }

    pub fn len(&self) -> usize {
        self.lookup.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lookup.is_empty()
    }
}

/// The pair of caches used by the greedy connection model: the one-to-one
/// cache over connected supply nodes and the one-to-many cache over
/// unconnected candidates. Either may be absent when the backing file does
/// not exist.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GreedyConnectCache {
    #[serde(default)]
    pub connected_cache: Option<SingleLookupDistanceCache>,
    #[serde(default)]
    pub unconnected_cache: Option<MultiLookupDistanceCache>,
}

impl GreedyConnectCache {
    pub fn new(
        connected_cache: Option<SingleLookupDistanceCache>,
        unconnected_cache: Option<MultiLookupDistanceCache>,
    ) -> Self {
        Self {
            connected_cache,
            unconnected_cache,
        }
    }

    /// Rebuild the connected-node lookup from scratch: for every unconnected
    /// school, its nearest node among the full connected set.
    pub fn reseed(&mut self, connected: &[Coordinate], unconnected: &[Coordinate]) {
        let cache = self.connected_cache.get_or_insert_with(Default::default);
        cache.lookup.clear();
        Self::update_lookup(&mut cache.lookup, connected, unconnected);
    }

    /// Incremental update: fold only the newly added connected nodes
    /// (indices `k..`) into the lookup, replacing an entry when the new
    /// distance beats the cached one.
    ///
    /// This is the hot path of the economies-of-scale loop; it avoids
    /// recomputing distances to supply nodes seen in earlier iterations.
    pub fn extend(&mut self, connected: &[Coordinate], k: usize, unconnected: &[Coordinate]) {
        let cache = self.connected_cache.get_or_insert_with(Default::default);
        let fresh = connected.get(k..).unwrap_or(&[]);
        Self::update_lookup(&mut cache.lookup, fresh, unconnected);
    }

    fn update_lookup(
        lookup: &mut HashMap<CoordinateId, PairwiseDistance>,
        nodes: &[Coordinate],
        unconnected: &[Coordinate],
    ) {
        for school in unconnected {
            for node in nodes {
                if school.coordinate_id == node.coordinate_id {
                    continue;
                }
                let d = haversine_m(school, node);
                let beats_cached = lookup
                    .get(&school.coordinate_id)
                    .map(|cached| d < cached.distance)
                    .unwrap_or(true);
                if beats_cached {
                    lookup.insert(
                        school.coordinate_id.clone(),
                        PairwiseDistance::new(school.clone(), node.clone(), d),
                    );
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.connected_cache.as_ref().map(|c| c.len()).unwrap_or(0)
            + self.unconnected_cache.as_ref().map(|c| c.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
