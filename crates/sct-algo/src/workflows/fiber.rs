//! Fiber connectivity cost model.
//!
//! Estimates the cost of connecting a collection of schools to the internet
//! with fiber. Can optionally consider economies of scale, which lets
//! schools connected during this run serve as fiber nodes for the schools
//! after them.
//!
//! Per school the model produces exactly one classification:
//! - bandwidth demand above the serviceable maximum: infeasible with
//!   `FIBER_BW_THRESHOLD`, never entered into distance computation;
//! - no reachable supply point within the connection cap: infeasible with
//!   `FIBER_DISTANCE_THRESHOLD` (absent from the connector output);
//! - otherwise feasible, with CapEx = build cost over the connection
//!   distance plus the consumer setup cost, and OpEx = maintenance over the
//!   distance plus bandwidth-proportional and fixed operation costs. The
//!   electricity annotation is filled in from the electricity collaborator
//!   after the record is assembled.

use sct_core::{Coordinate, CoordinateId, Kilometers, Meters, PairwiseDistance};
use sct_schemas::{
    CostResultSpace, FiberCostConfig, InfeasibleReason, ModelDataSpace, SchoolConnectionCosts,
    SchoolEntity, FIBER_TECHNOLOGY,
};
use std::collections::HashMap;
use tracing::info;

use crate::connect::GreedyDistanceConnector;
use crate::electricity::{ElectricityModel, FlatElectricityModel};
use crate::nearest::VectorizedDistanceModel;

/// Fiber technology cost model.
#[derive(Debug, Clone)]
pub struct FiberCostModel {
    config: FiberCostConfig,
}

impl FiberCostModel {
    pub fn new(config: FiberCostConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FiberCostConfig {
        &self.config
    }

    /// Provider-side build cost of laying fiber over a connection.
    fn cost_of_connection(&self, distance: Kilometers) -> f64 {
        distance.value() * self.config.capex.cost_per_km
    }

    /// Provider-side annual maintenance cost of a connection.
    fn cost_of_maintenance(&self, distance: Kilometers) -> f64 {
        distance.value() * self.config.opex.cost_per_km
    }

    /// Consumer-side setup cost (modem/terminal installation).
    fn cost_of_setup(&self) -> f64 {
        self.config.capex.fixed_costs
    }

    /// Consumer-side annual operating cost.
    fn cost_of_operation(&self, school: &SchoolEntity) -> f64 {
        school.bandwidth_demand_mbps * self.config.opex.annual_bandwidth_cost_per_mbps
            + self.config.opex.fixed_costs
    }

    /// Assemble one cost record per unconnected school, joining the
    /// connector's distance assignments by school id. A missing join means
    /// no supply point was reachable.
    pub fn compute_costs(
        &self,
        distances: &[PairwiseDistance],
        data_space: &ModelDataSpace,
        electricity: &dyn ElectricityModel,
    ) -> Vec<SchoolConnectionCosts> {
        let distance_by_school: HashMap<&CoordinateId, Meters> = distances
            .iter()
            .map(|d| (d.source_id(), Meters(d.distance)))
            .collect();
        let maximum_bandwidth = self.config.constraints.maximum_bandwidth_mbps;

        let mut costs = Vec::new();
        for school in data_space.schools.iter().filter(|s| !s.connected) {
            let school_id = school.school_id.clone();
            if school.bandwidth_demand_mbps > maximum_bandwidth {
                costs.push(SchoolConnectionCosts::infeasible(
                    school_id,
                    FIBER_TECHNOLOGY,
                    InfeasibleReason::FiberBwThreshold,
                ));
                continue;
            }
            let Some(distance) = distance_by_school.get(&school.school_id) else {
                costs.push(SchoolConnectionCosts::infeasible(
                    school_id,
                    FIBER_TECHNOLOGY,
                    InfeasibleReason::FiberDistanceThreshold,
                ));
                continue;
            };
            let distance_km = distance.to_kilometers();
            let capex_provider = self.cost_of_connection(distance_km);
            let capex_consumer = self.cost_of_setup();
            let opex_provider = self.cost_of_maintenance(distance_km);
            let opex_consumer = self.cost_of_operation(school);
            let mut record = SchoolConnectionCosts {
                school_id,
                capex: capex_provider + capex_consumer,
                capex_provider,
                capex_consumer,
                opex: opex_provider + opex_consumer,
                opex_provider,
                opex_consumer,
                electricity: 0.0,
                technology: FIBER_TECHNOLOGY.to_string(),
                feasible: true,
                reason: None,
            };
            record.electricity = electricity.compute_cost(school);
            costs.push(record);
        }
        costs
    }

    /// Run the model over a data space with the default distance engine.
    ///
    /// The data space's cache seeds the connector and receives the updated
    /// state back, ready for persistence.
    pub fn run(&self, data_space: &mut ModelDataSpace) -> CostResultSpace {
        self.run_with_model(data_space, VectorizedDistanceModel::new())
    }

    /// Run the model with a caller-configured distance engine.
    pub fn run_with_model(
        &self,
        data_space: &mut ModelDataSpace,
        distance_model: VectorizedDistanceModel,
    ) -> CostResultSpace {
        info!("starting fiber cost model");
        let mut supply = data_space.fiber_nodes.clone();
        if self.config.capex.schools_as_fiber_nodes {
            supply.extend(data_space.connected_school_coordinates());
        }
        let maximum_bandwidth = self.config.constraints.maximum_bandwidth_mbps;
        // Bandwidth-infeasible schools never enter distance computation.
        let demand: Vec<Coordinate> = data_space
            .schools
            .iter()
            .filter(|s| !s.connected && s.bandwidth_demand_mbps <= maximum_bandwidth)
            .map(|s| s.coordinate())
            .collect();

        let cache = std::mem::take(&mut data_space.cache);
        let mut connector = GreedyDistanceConnector::new(supply)
            .with_dynamic_connect(self.config.capex.economies_of_scale)
            .with_maximum_connection_length(Meters(
                self.config.constraints.maximum_connection_length_m,
            ))
            .with_cache(cache)
            .with_distance_model(distance_model);
        let distances = connector.run(&demand);
        data_space.cache = connector.into_cache();

        let electricity = FlatElectricityModel::from_config(&self.config);
        let costs = self.compute_costs(&distances, data_space, &electricity);
        info!(
            schools = costs.len(),
            connected = distances.len(),
            "fiber cost model complete"
        );
        CostResultSpace {
            technology: FIBER_TECHNOLOGY.to_string(),
            distances,
            cost_results: costs,
        }
    }
}
