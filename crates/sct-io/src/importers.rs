//! CSV and config importers for workspace inputs.
//!
//! Schools and fiber nodes arrive as CSV tables; the technology cost
//! configuration arrives as YAML or JSON, dispatched on file extension with
//! a parse-either fallback for unknown extensions.

use anyhow::{Context, Result};
use sct_core::Coordinate;
use sct_schemas::{FiberCostConfig, ModelDataSpace, SchoolEntity};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::cache_io::load_greedy_cache;
use crate::storage::DataStore;

/// One row of the fiber node table.
#[derive(Debug, Deserialize)]
struct FiberNodeRow {
    node_id: String,
    lat: f64,
    lon: f64,
}

/// Read the school table. Expected columns: `school_id,lat,lon` plus the
/// optional `bandwidth_demand_mbps` and `connected` columns.
pub fn read_schools_csv(path: &Path) -> Result<Vec<SchoolEntity>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("opening school table '{}'", path.display()))?;
    let mut schools = Vec::new();
    for row in reader.deserialize() {
        let school: SchoolEntity =
            row.with_context(|| format!("parsing school table '{}'", path.display()))?;
        schools.push(school);
    }
    Ok(schools)
}

/// Read the fiber node table. Expected columns: `node_id,lat,lon`.
pub fn read_fiber_nodes_csv(path: &Path) -> Result<Vec<Coordinate>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("opening fiber node table '{}'", path.display()))?;
    let mut nodes = Vec::new();
    for row in reader.deserialize() {
        let node: FiberNodeRow =
            row.with_context(|| format!("parsing fiber node table '{}'", path.display()))?;
        nodes.push(Coordinate::new(node.node_id, node.lat, node.lon));
    }
    Ok(nodes)
}

/// Load the fiber cost configuration from YAML or JSON.
pub fn load_fiber_config(path: &Path) -> Result<FiberCostConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("reading fiber config '{}'", path.display()))?;
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
            serde_yaml::from_str(&data).context("parsing fiber config yaml")
        }
        Some(ext) if ext.eq_ignore_ascii_case("json") => {
            serde_json::from_str(&data).context("parsing fiber config json")
        }
        _ => serde_yaml::from_str(&data)
            .or_else(|_| serde_json::from_str(&data))
            .context("parsing fiber config"),
    }
}

/// Assemble a model data space from workspace inputs. When a workspace
/// directory is given, the distance caches are loaded from it; otherwise the
/// space starts with empty caches.
pub fn load_data_space(
    schools_csv: &Path,
    nodes_csv: &Path,
    workspace: Option<&Path>,
    store: &dyn DataStore,
) -> Result<ModelDataSpace> {
    let schools = read_schools_csv(schools_csv)?;
    let fiber_nodes = read_fiber_nodes_csv(nodes_csv)?;
    let mut space = ModelDataSpace::new(schools, fiber_nodes);
    if let Some(workspace) = workspace {
        space.cache = load_greedy_cache(store, workspace)?;
    }
    Ok(space)
}
