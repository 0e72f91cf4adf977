//! Baseline cost minimizer.
//!
//! Selects the cheapest feasible technology for each school independently.
//! A school with no feasible technology at all yields a `"None"` record
//! carrying the joined reason codes of every rejected option.

use sct_core::CoordinateId;
use sct_schemas::{CostMinimizerConfig, OutputSpace, SchoolConnectionCosts};
use tracing::info;

/// Per-school cheapest-feasible-technology selector.
#[derive(Debug, Clone)]
pub struct BaselineMinimizer {
    config: CostMinimizerConfig,
}

impl BaselineMinimizer {
    pub fn new(config: CostMinimizerConfig) -> Self {
        Self { config }
    }

    /// The minimum-cost record for one school, given its cost record under
    /// each technology.
    ///
    /// Infeasible records cost `+infinity` in the comparison, so they can
    /// never win; a tie goes to the first record in the given order.
    pub fn single_school_minimum_cost(
        &self,
        school_id: &CoordinateId,
        costs: &[SchoolConnectionCosts],
    ) -> SchoolConnectionCosts {
        if !costs.iter().any(|c| c.feasible) {
            let reasons: Vec<&str> = costs.iter().filter_map(|c| c.reason.as_deref()).collect();
            return SchoolConnectionCosts {
                school_id: school_id.clone(),
                capex: 0.0,
                capex_provider: 0.0,
                capex_consumer: 0.0,
                opex: 0.0,
                opex_provider: 0.0,
                opex_consumer: 0.0,
                electricity: 0.0,
                technology: "None".to_string(),
                feasible: false,
                reason: Some(reasons.join(",")),
            };
        }
        // The early return above covered the empty and all-infeasible cases.
        let years = self.config.years_opex;
        let mut best = &costs[0];
        for cost in &costs[1..] {
            if cost.technology_connectivity_cost(years) < best.technology_connectivity_cost(years)
            {
                best = cost;
            }
        }
        best.clone()
    }

    /// Minimum costs for every school present in the output space, sorted
    /// by school id for deterministic output.
    pub fn run(&self, output: &OutputSpace) -> Vec<SchoolConnectionCosts> {
        let mut school_ids: Vec<CoordinateId> =
            output.aggregated_costs.keys().cloned().collect();
        school_ids.sort();
        let minimums: Vec<SchoolConnectionCosts> = school_ids
            .iter()
            .map(|school_id| {
                let by_technology = &output.aggregated_costs[school_id];
                let mut technologies: Vec<&String> = by_technology.keys().collect();
                technologies.sort();
                let costs: Vec<SchoolConnectionCosts> = technologies
                    .into_iter()
                    .map(|t| by_technology[t].clone())
                    .collect();
                self.single_school_minimum_cost(school_id, &costs)
            })
            .collect();
        info!(
            schools = minimums.len(),
            connected = minimums.iter().filter(|c| c.feasible).count(),
            "baseline minimization complete"
        );
        minimums
    }
}
