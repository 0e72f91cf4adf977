//! Chunked vectorized nearest-neighbor engine.
//!
//! Computes, for each point in set A, its k nearest points in set B under
//! the haversine metric, with an optional distance cap. For large inputs
//! set A is partitioned into fixed-size chunks processed sequentially
//! against the full set B, bounding peak memory to one
//! `chunk_size x |set_b|` distance block at a time. Chunking is a memory
//! optimization only: the concatenated chunk results equal the unchunked
//! result.

use sct_core::{Coordinate, Meters, PairwiseDistance, EARTH_RADIUS_M};
use std::cmp::Ordering;

/// Default chunk size for partitioning set A; also the threshold above
/// which chunking kicks in.
pub const DEFAULT_CHUNK_SIZE: usize = 500;

/// A coordinate pre-converted to radians, with the cosine of its latitude
/// cached for the inner haversine loop.
#[derive(Debug, Clone, Copy)]
struct RadianPoint {
    lat: f64,
    lon: f64,
    cos_lat: f64,
}

impl RadianPoint {
    fn from_coordinate(c: &Coordinate) -> Self {
        let lat = c.lat().to_radians().value();
        let lon = c.lon().to_radians().value();
        Self {
            lat,
            lon,
            cos_lat: lat.cos(),
        }
    }

    fn haversine_to(&self, other: &RadianPoint) -> f64 {
        let dlat = other.lat - self.lat;
        let dlon = other.lon - self.lon;
        let h = (dlat / 2.0).sin().powi(2)
            + self.cos_lat * other.cos_lat * (dlon / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_M * h.sqrt().asin()
    }
}

/// Batched great-circle nearest-neighbor model.
#[derive(Debug, Clone)]
pub struct VectorizedDistanceModel {
    n_nearest_neighbors: usize,
    maximum_distance: Meters,
    chunk_size: usize,
}

impl Default for VectorizedDistanceModel {
    fn default() -> Self {
        Self {
            n_nearest_neighbors: usize::MAX,
            maximum_distance: Meters::INFINITE,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl VectorizedDistanceModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep only the n nearest targets per source
    pub fn with_nearest_neighbors(mut self, n: usize) -> Self {
        self.n_nearest_neighbors = n;
        self
    }

    /// Drop pairs farther apart than the cap
    pub fn with_maximum_distance(mut self, cap: Meters) -> Self {
        self.maximum_distance = cap;
        self
    }

    /// Set the chunk size used for large set A inputs
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// For each point in `set_a`, its k nearest points in `set_b` within
    /// the distance cap, in ascending distance order per source point.
    ///
    /// Returns an empty result when either set is empty. Self-pairs (same
    /// id on both sides) are skipped and do not count toward k. Ties are
    /// broken by the original index in `set_b`.
    pub fn nearest(&self, set_a: &[Coordinate], set_b: &[Coordinate]) -> Vec<PairwiseDistance> {
        if set_a.is_empty() || set_b.is_empty() {
            return Vec::new();
        }
        if set_a.len() > self.chunk_size {
            let mut pairs = Vec::new();
            for chunk in set_a.chunks(self.chunk_size) {
                pairs.extend(self.run_single(chunk, set_b));
            }
            return pairs;
        }
        self.run_single(set_a, set_b)
    }

    fn run_single(&self, set_a: &[Coordinate], set_b: &[Coordinate]) -> Vec<PairwiseDistance> {
        let b_points: Vec<RadianPoint> =
            set_b.iter().map(RadianPoint::from_coordinate).collect();
        let mut pairs = Vec::new();
        let mut distances = vec![0.0_f64; set_b.len()];
        let mut order: Vec<usize> = Vec::with_capacity(set_b.len());
        for a in set_a {
            let a_point = RadianPoint::from_coordinate(a);
            for (j, b_point) in b_points.iter().enumerate() {
                distances[j] = a_point.haversine_to(b_point);
            }
            order.clear();
            order.extend(0..set_b.len());
            // Stable sort on distance only keeps index order for ties.
            order.sort_by(|&i, &j| {
                distances[i]
                    .partial_cmp(&distances[j])
                    .unwrap_or(Ordering::Equal)
            });
            let mut taken = 0;
            for &j in &order {
                if taken >= self.n_nearest_neighbors {
                    break;
                }
                if distances[j] > self.maximum_distance.value() {
                    // Ascending order: everything past the cap is too far.
                    break;
                }
                if a.coordinate_id == set_b[j].coordinate_id {
                    continue;
                }
                pairs.push(PairwiseDistance::new(
                    a.clone(),
                    set_b[j].clone(),
                    distances[j],
                ));
                taken += 1;
            }
        }
        pairs
    }
}
