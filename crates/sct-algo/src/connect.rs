//! Greedy distance connector.
//!
//! Assigns each demand point (school) to the cheapest reachable supply
//! point. The greedy rule is nearest-first: among all unconnected schools,
//! the one with the globally smallest distance to its nearest supply point
//! connects next. With dynamic connection enabled (economies of scale),
//! every newly connected school joins the supply set, and the remaining
//! schools are updated incrementally against only that new supply point
//! through the cache.
//!
//! This approximates a minimum-spanning connection structure cheaply; an
//! exact minimum-cost Steiner tree is not attempted.

use sct_core::{Coordinate, CoordinateId, Meters, PairwiseDistance};
use sct_schemas::{GreedyConnectCache, MultiLookupDistanceCache, SingleLookupDistanceCache};
use std::collections::HashSet;
use tracing::{debug, info};

use crate::nearest::VectorizedDistanceModel;

/// Candidate options kept per unconnected school when the engine has to
/// fill a cache miss.
pub const DEFAULT_CACHE_NEIGHBORS: usize = 10;

/// Greedy nearest-first connection model.
#[derive(Debug, Clone)]
pub struct GreedyDistanceConnector {
    supply: Vec<Coordinate>,
    dynamic_connect: bool,
    maximum_connection_length_m: f64,
    cache: GreedyConnectCache,
    model: VectorizedDistanceModel,
}

impl GreedyDistanceConnector {
    pub fn new(supply: Vec<Coordinate>) -> Self {
        Self {
            supply,
            dynamic_connect: false,
            maximum_connection_length_m: f64::INFINITY,
            cache: GreedyConnectCache::default(),
            model: VectorizedDistanceModel::new(),
        }
    }

    /// Let schools connected during this run serve as supply points
    pub fn with_dynamic_connect(mut self, dynamic_connect: bool) -> Self {
        self.dynamic_connect = dynamic_connect;
        self
    }

    /// Maximum length of a single connection
    pub fn with_maximum_connection_length(mut self, cap: Meters) -> Self {
        self.maximum_connection_length_m = cap.value();
        self
    }

    /// Seed the run from previously persisted caches
    pub fn with_cache(mut self, cache: GreedyConnectCache) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_distance_model(mut self, model: VectorizedDistanceModel) -> Self {
        self.model = model;
        self
    }

    pub fn cache(&self) -> &GreedyConnectCache {
        &self.cache
    }

    /// Surrender the (updated) cache for persistence after the run.
    pub fn into_cache(self) -> GreedyConnectCache {
        self.cache
    }

    /// Connect as many demand points as the distance cap allows.
    ///
    /// Returns one record per successfully connected school, oriented
    /// school -> assigned supply point, in connection order. Schools absent
    /// from the output were unreachable within the cap.
    pub fn run(&mut self, demand: &[Coordinate]) -> Vec<PairwiseDistance> {
        let mut connected: Vec<Coordinate> = self.supply.clone();
        let supply_ids: HashSet<&CoordinateId> =
            connected.iter().map(|c| &c.coordinate_id).collect();
        let mut remaining: Vec<Coordinate> = demand
            .iter()
            .filter(|c| !supply_ids.contains(&c.coordinate_id))
            .cloned()
            .collect();
        if remaining.is_empty() || connected.is_empty() {
            info!(
                supply = connected.len(),
                demand = remaining.len(),
                "nothing to connect"
            );
            return Vec::new();
        }

        self.seed_lookup(&connected, &remaining);

        let mut results: Vec<PairwiseDistance> = Vec::new();
        loop {
            let best = self.cheapest_remaining(&remaining);
            let Some((distance, index)) = best else { break };
            if !(distance <= self.maximum_connection_length_m) {
                // Nothing left within reach; remaining schools stay absent
                // from the output.
                break;
            }
            let school = remaining.remove(index);
            let Some(entry) = self
                .cache
                .connected_cache
                .as_ref()
                .and_then(|c| c.get(&school.coordinate_id))
                .cloned()
            else {
                break;
            };
            debug!(
                school = %school.coordinate_id,
                supply = %entry.target_id(),
                distance,
                "connected school"
            );
            results.push(entry);
            if self.dynamic_connect {
                connected.push(school);
                let k = connected.len() - 1;
                self.cache.extend(&connected, k, &remaining);
            }
            if remaining.is_empty() {
                break;
            }
        }
        info!(
            connected = results.len(),
            unreached = remaining.len(),
            "greedy connection complete"
        );
        results
    }

    /// The unconnected school with the globally smallest nearest-supply
    /// distance; ties broken by id.
    fn cheapest_remaining(&self, remaining: &[Coordinate]) -> Option<(f64, usize)> {
        let cache = self.cache.connected_cache.as_ref()?;
        let mut best: Option<(f64, usize)> = None;
        for (i, school) in remaining.iter().enumerate() {
            let d = cache.get_distance(&school.coordinate_id, f64::INFINITY);
            let better = match best {
                None => true,
                Some((best_d, best_i)) => {
                    d < best_d
                        || (d == best_d && school.coordinate_id < remaining[best_i].coordinate_id)
                }
            };
            if better {
                best = Some((d, i));
            }
        }
        best
    }

    /// Ensure every remaining school has a nearest-supply entry in the
    /// connected-node cache, reusing prior distances where the cached
    /// target is still a member of the supply set and falling back to the
    /// distance engine for the rest.
    fn seed_lookup(&mut self, connected: &[Coordinate], remaining: &[Coordinate]) {
        let connected_ids: HashSet<&CoordinateId> =
            connected.iter().map(|c| &c.coordinate_id).collect();
        let neighbors = self
            .cache
            .unconnected_cache
            .as_ref()
            .map(|c| c.n_neighbors)
            .unwrap_or(DEFAULT_CACHE_NEIGHBORS);

        let mut missing: Vec<Coordinate> = Vec::new();
        for school in remaining {
            let cached_is_valid = self
                .cache
                .connected_cache
                .as_ref()
                .and_then(|c| c.get(&school.coordinate_id))
                .map(|entry| connected_ids.contains(entry.target_id()))
                .unwrap_or(false);
            if cached_is_valid {
                continue;
            }
            // The candidate list keeps several options because the cheapest
            // may no longer be a supply member; take the nearest one that is.
            let candidate = self
                .cache
                .unconnected_cache
                .as_ref()
                .and_then(|c| c.get(&school.coordinate_id))
                .and_then(|entries| {
                    entries
                        .iter()
                        .find(|e| connected_ids.contains(e.source_id()))
                })
                .cloned();
            if let Some(candidate) = candidate {
                // Stored candidates read from the supply point's perspective;
                // flip back to school -> supply.
                self.cache
                    .connected_cache
                    .get_or_insert_with(Default::default)
                    .lookup
                    .insert(school.coordinate_id.clone(), candidate.reversed());
            } else {
                missing.push(school.clone());
            }
        }

        if missing.is_empty() {
            return;
        }
        debug!(misses = missing.len(), "computing distances for cache misses");
        let pairs = self
            .model
            .clone()
            .with_nearest_neighbors(neighbors)
            .with_maximum_distance(Meters::INFINITE)
            .nearest(&missing, connected);

        // Refresh the candidate cache for the schools just computed.
        let fresh = MultiLookupDistanceCache::from_distances(&pairs, neighbors);
        match &mut self.cache.unconnected_cache {
            Some(cache) => {
                for (key, entries) in fresh.lookup {
                    cache.lookup.insert(key, entries);
                }
            }
            None => self.cache.unconnected_cache = Some(fresh),
        }

        // And the nearest of each batch seeds the connected-node lookup.
        let single = SingleLookupDistanceCache::from_distances(&pairs);
        let lookup = &mut self
            .cache
            .connected_cache
            .get_or_insert_with(Default::default)
            .lookup;
        for (key, entry) in single.lookup {
            lookup.insert(key, entry);
        }
    }
}
