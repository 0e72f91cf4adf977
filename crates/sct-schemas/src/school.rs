//! School entities and the model data space.

use crate::distance_cache::GreedyConnectCache;
use sct_core::{Coordinate, CoordinateId};
use serde::{Deserialize, Serialize};

/// A demand point: a school seeking connection.
///
/// Rows deserialize directly from the school table (CSV or JSON).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchoolEntity {
    pub school_id: CoordinateId,
    /// Latitude in degrees
    pub lat: f64,
    /// Longitude in degrees
    pub lon: f64,
    /// Bandwidth demand in Mbps
    #[serde(default)]
    pub bandwidth_demand_mbps: f64,
    /// Whether the school is already connected (eligible as a supply point
    /// when schools_as_fiber_nodes is enabled)
    #[serde(default)]
    pub connected: bool,
}

impl SchoolEntity {
    pub fn new(id: impl Into<CoordinateId>, lat: f64, lon: f64) -> Self {
        Self {
            school_id: id.into(),
            lat,
            lon,
            bandwidth_demand_mbps: 0.0,
            connected: false,
        }
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.school_id.clone(), self.lat, self.lon)
    }
}

/// Everything a technology cost model consumes: the school entities, the
/// supply-node coordinates, and the greedy connector's cache.
///
/// Pure data; the loaders that assemble one from a workspace live in sct-io.
#[derive(Debug, Clone, Default)]
pub struct ModelDataSpace {
    pub schools: Vec<SchoolEntity>,
    pub fiber_nodes: Vec<Coordinate>,
    pub cache: GreedyConnectCache,
}

impl ModelDataSpace {
    pub fn new(schools: Vec<SchoolEntity>, fiber_nodes: Vec<Coordinate>) -> Self {
        Self {
            schools,
            fiber_nodes,
            cache: GreedyConnectCache::default(),
        }
    }

    pub fn with_cache(mut self, cache: GreedyConnectCache) -> Self {
        self.cache = cache;
        self
    }

    /// Coordinates of schools that are already connected.
    pub fn connected_school_coordinates(&self) -> Vec<Coordinate> {
        self.schools
            .iter()
            .filter(|s| s.connected)
            .map(|s| s.coordinate())
            .collect()
    }

    /// Coordinates of schools still seeking connection.
    pub fn unconnected_school_coordinates(&self) -> Vec<Coordinate> {
        self.schools
            .iter()
            .filter(|s| !s.connected)
            .map(|s| s.coordinate())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_school_coordinate_roundtrip() {
        let school = SchoolEntity::new("s-1", -1.5, 36.8);
        let coord = school.coordinate();
        assert_eq!(coord.coordinate_id, CoordinateId::new("s-1"));
        assert_eq!(coord.coordinate, [-1.5, 36.8]);
    }

    #[test]
    fn test_data_space_partitions_by_connection_status() {
        let mut a = SchoolEntity::new("s-a", 0.0, 0.0);
        a.connected = true;
        let b = SchoolEntity::new("s-b", 1.0, 1.0);
        let space = ModelDataSpace::new(vec![a, b], vec![]);
        assert_eq!(space.connected_school_coordinates().len(), 1);
        assert_eq!(space.unconnected_school_coordinates().len(), 1);
    }

    #[test]
    fn test_school_row_defaults() {
        let school: SchoolEntity =
            serde_json::from_str(r#"{"school_id": "s-1", "lat": 0.5, "lon": 1.5}"#).unwrap();
        assert_eq!(school.bandwidth_demand_mbps, 0.0);
        assert!(!school.connected);
    }
}
