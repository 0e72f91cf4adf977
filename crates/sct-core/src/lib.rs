//! # sct-core: School Connectivity Modeling Core
//!
//! Provides the fundamental data structures for school connectivity cost
//! modeling: geospatial coordinates, pairwise distance records, and the
//! rooted cost forest used by the topology optimizers.
//!
//! ## Design Philosophy
//!
//! Connection topologies are modeled as **rooted forests** over a directed
//! graph where:
//! - **Nodes**: supply points (fiber nodes) and demand points (schools)
//! - **Edges**: `parent -> child` meaning "child connects through parent"
//!
//! This graph-based approach enables:
//! - Fast leaf queries during iterative cost pruning
//! - Type-safe element access with newtype IDs
//! - Deterministic traversal independent of input ordering
//!
//! ## Quick Start
//!
//! ```rust
//! use sct_core::*;
//!
//! let node = Coordinate::new("node-1", 0.0, 0.0);
//! let school = Coordinate::new("school-1", 0.018, 0.0);
//!
//! // Great-circle distance in meters
//! let d = haversine_m(&school, &node);
//! assert!(d > 0.0);
//!
//! let pair = PairwiseDistance::new(school, node, d);
//! assert_eq!(pair.source_id().as_str(), "school-1");
//! ```
//!
//! ## Core Data Structures
//!
//! - [`Coordinate`] - a uniquely identified (latitude, longitude) pair
//! - [`PairwiseDistance`] - a directed distance record between two coordinates
//! - [`ConnectedCostGraph`] - the rooted cost forest (petgraph `DiGraph`)
//! - Type-safe IDs: [`CoordinateId`]
//!
//! ## Modules
//!
//! - [`cost_graph`] - the connection cost forest and its pruning primitives
//! - [`error`] - unified error type for the SCT ecosystem
//! - [`units`] - compile-time unit safety for distances and angles

use serde::{Deserialize, Serialize};

pub mod cost_graph;
pub mod error;
pub mod units;

pub use cost_graph::{ConnectedCostGraph, CostNode};
pub use error::{SctError, SctResult};
pub use petgraph::graph::NodeIndex;
pub use units::{Degrees, Kilometers, Meters, Radians};

/// Mean Earth radius in meters; the haversine metric treats Earth as a
/// perfect sphere of this radius.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Distance-method tag attached to records produced by the haversine metric.
pub const DISTANCE_TYPE_HAVERSINE: &str = "haversine";

// Newtype wrapper for coordinate identifiers for type safety
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CoordinateId(String);

impl CoordinateId {
    #[inline]
    pub fn new(value: impl Into<String>) -> Self {
        CoordinateId(value.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CoordinateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CoordinateId {
    fn from(value: &str) -> Self {
        CoordinateId(value.to_string())
    }
}

impl From<String> for CoordinateId {
    fn from(value: String) -> Self {
        CoordinateId(value)
    }
}

/// A uniquely identified geographic point.
///
/// Identity is the id: two coordinates with the same id refer to the same
/// entity even if their geometry differs (last write wins in caches).
/// The lat/long pair is stored in degrees and serializes as a 2-element
/// array, which is the cache wire format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub coordinate_id: CoordinateId,
    /// Latitude and longitude in degrees, in that order.
    pub coordinate: [f64; 2],
}

impl Coordinate {
    pub fn new(id: impl Into<CoordinateId>, lat: f64, lon: f64) -> Self {
        Self {
            coordinate_id: id.into(),
            coordinate: [lat, lon],
        }
    }

    /// Latitude in degrees.
    #[inline]
    pub fn lat(&self) -> Degrees {
        Degrees(self.coordinate[0])
    }

    /// Longitude in degrees.
    #[inline]
    pub fn lon(&self) -> Degrees {
        Degrees(self.coordinate[1])
    }
}

/// A directed distance record between two coordinates.
///
/// Directionality matters: `(A, B)` and `(B, A)` are distinct records even
/// though the underlying metric is symmetric, because the coordinate1 and
/// coordinate2 roles are swapped. By convention `coordinate1` is the record's
/// source (`pair_ids.0`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairwiseDistance {
    pub pair_ids: (CoordinateId, CoordinateId),
    pub coordinate1: Coordinate,
    pub coordinate2: Coordinate,
    /// Great-circle distance in meters.
    pub distance: f64,
    #[serde(default = "default_distance_type")]
    pub distance_type: String,
}

fn default_distance_type() -> String {
    DISTANCE_TYPE_HAVERSINE.to_string()
}

impl PairwiseDistance {
    /// Create a haversine-tagged record oriented `coordinate1 -> coordinate2`.
    pub fn new(coordinate1: Coordinate, coordinate2: Coordinate, distance: f64) -> Self {
        Self {
            pair_ids: (
                coordinate1.coordinate_id.clone(),
                coordinate2.coordinate_id.clone(),
            ),
            coordinate1,
            coordinate2,
            distance,
            distance_type: default_distance_type(),
        }
    }

    #[inline]
    pub fn source_id(&self) -> &CoordinateId {
        &self.pair_ids.0
    }

    #[inline]
    pub fn target_id(&self) -> &CoordinateId {
        &self.pair_ids.1
    }

    /// True when source and target are the same entity.
    #[inline]
    pub fn is_self_pair(&self) -> bool {
        self.pair_ids.0 == self.pair_ids.1
    }

    /// The same measurement with the coordinate roles swapped.
    pub fn reversed(&self) -> Self {
        Self {
            pair_ids: (self.pair_ids.1.clone(), self.pair_ids.0.clone()),
            coordinate1: self.coordinate2.clone(),
            coordinate2: self.coordinate1.clone(),
            distance: self.distance,
            distance_type: self.distance_type.clone(),
        }
    }
}

/// Great-circle distance between two coordinates in meters.
///
/// Inputs are degrees; they are converted to radians before the haversine
/// evaluation on a sphere of radius [`EARTH_RADIUS_M`].
pub fn haversine_m(a: &Coordinate, b: &Coordinate) -> f64 {
    let lat1 = a.lat().to_radians();
    let lat2 = b.lat().to_radians();
    let dlat = (b.lat() - a.lat()).to_radians();
    let dlon = (b.lon() - a.lon()).to_radians();

    let h = (dlat.value() / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (dlon.value() / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().asin()
}
