//! Per-school cost records and the aggregated output space.
//!
//! A [`SchoolConnectionCosts`] record is created once per school per
//! technology per model run and is immutable afterwards, except for the
//! electricity annotation which the orchestrator fills in post-hoc.
//!
//! Infeasible records never participate in arithmetic as NaN: every cost
//! query on an infeasible record yields `+infinity` so sums and minima stay
//! well-defined.

use sct_core::{CoordinateId, PairwiseDistance};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Technology name used by the fiber cost model.
pub const FIBER_TECHNOLOGY: &str = "Fiber";

/// Reason a school cannot be served by a technology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InfeasibleReason {
    /// Bandwidth demand exceeds the technology's serviceable maximum
    FiberBwThreshold,
    /// No reachable supply node within the connection length cap
    FiberDistanceThreshold,
    /// Dropped by the budget-constrained topology pruner
    BudgetExceeded,
}

impl InfeasibleReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            InfeasibleReason::FiberBwThreshold => "FIBER_BW_THRESHOLD",
            InfeasibleReason::FiberDistanceThreshold => "FIBER_DISTANCE_THRESHOLD",
            InfeasibleReason::BudgetExceeded => "BUDGET_EXCEEDED",
        }
    }
}

impl std::fmt::Display for InfeasibleReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Connection costs for a single school under a single technology.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchoolConnectionCosts {
    pub school_id: CoordinateId,
    /// Total one-time capital cost, USD
    pub capex: f64,
    /// Provider-side infrastructure share of capex
    #[serde(default)]
    pub capex_provider: f64,
    /// Consumer-side equipment share of capex
    #[serde(default)]
    pub capex_consumer: f64,
    /// Total recurring annual cost, USD
    pub opex: f64,
    /// Provider-side share of opex (infrastructure maintenance)
    #[serde(default)]
    pub opex_provider: f64,
    /// Consumer-side share of opex (connectivity and equipment operation)
    #[serde(default)]
    pub opex_consumer: f64,
    /// Annual electricity cost, filled in post-hoc by the orchestrator
    #[serde(default)]
    pub electricity: f64,
    pub technology: String,
    #[serde(default = "default_feasible")]
    pub feasible: bool,
    /// Reason code when infeasible; comma-joined when aggregated
    #[serde(default)]
    pub reason: Option<String>,
}

fn default_feasible() -> bool {
    true
}

impl SchoolConnectionCosts {
    /// An infeasible record carrying the given reason code.
    pub fn infeasible(
        school_id: CoordinateId,
        technology: impl Into<String>,
        reason: InfeasibleReason,
    ) -> Self {
        Self {
            school_id,
            capex: 0.0,
            capex_provider: 0.0,
            capex_consumer: 0.0,
            opex: 0.0,
            opex_provider: 0.0,
            opex_consumer: 0.0,
            electricity: 0.0,
            technology: technology.into(),
            feasible: false,
            reason: Some(reason.as_str().to_string()),
        }
    }

    /// Total cost of connecting with this technology over the project
    /// lifetime: capex plus `years` of opex.
    ///
    /// Infeasible records cost `+infinity` so they lose every min comparison
    /// and poison every sum they participate in.
    pub fn technology_connectivity_cost(&self, years: u32) -> f64 {
        if !self.feasible {
            return f64::INFINITY;
        }
        self.capex + f64::from(years) * self.opex
    }
}

/// Result of one technology cost model run: the connection assignments and
/// one cost record per school.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostResultSpace {
    pub technology: String,
    pub distances: Vec<PairwiseDistance>,
    pub cost_results: Vec<SchoolConnectionCosts>,
}

/// Aggregated costs across technologies, keyed by school then technology.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputSpace {
    pub aggregated_costs: HashMap<CoordinateId, HashMap<String, SchoolConnectionCosts>>,
}

impl OutputSpace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a technology run into the space. Last write wins per
    /// (school, technology) pair.
    pub fn push_results(&mut self, results: &CostResultSpace) {
        for cost in &results.cost_results {
            self.aggregated_costs
                .entry(cost.school_id.clone())
                .or_default()
                .insert(results.technology.clone(), cost.clone());
        }
    }

    pub fn get(&self, school_id: &CoordinateId, technology: &str) -> Option<&SchoolConnectionCosts> {
        self.aggregated_costs
            .get(school_id)?
            .get(technology)
    }

    /// Project lifetime cost of serving the given schools with a technology.
    ///
    /// Schools without a record, and schools whose record is infeasible,
    /// contribute `+infinity` rather than being silently skipped.
    pub fn project_lifetime_cost(
        &self,
        school_ids: &[CoordinateId],
        technology: &str,
        years: u32,
    ) -> f64 {
        school_ids
            .iter()
            .map(|id| match self.get(id, technology) {
                Some(cost) => cost.technology_connectivity_cost(years),
                None => f64::INFINITY,
            })
            .sum()
    }

    pub fn len(&self) -> usize {
        self.aggregated_costs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aggregated_costs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feasible_record(id: &str, capex: f64, opex: f64) -> SchoolConnectionCosts {
        SchoolConnectionCosts {
            school_id: CoordinateId::new(id),
            capex,
            capex_provider: capex,
            capex_consumer: 0.0,
            opex,
            opex_provider: opex,
            opex_consumer: 0.0,
            electricity: 0.0,
            technology: FIBER_TECHNOLOGY.to_string(),
            feasible: true,
            reason: None,
        }
    }

    #[test]
    fn test_connectivity_cost_over_horizon() {
        let record = feasible_record("s-1", 1_200.0, 100.0);
        assert_eq!(record.technology_connectivity_cost(5), 1_700.0);
        assert_eq!(record.technology_connectivity_cost(0), 1_200.0);
    }

    #[test]
    fn test_infeasible_costs_are_infinite() {
        let record = SchoolConnectionCosts::infeasible(
            CoordinateId::new("s-1"),
            FIBER_TECHNOLOGY,
            InfeasibleReason::FiberBwThreshold,
        );
        assert!(record.technology_connectivity_cost(5).is_infinite());
        assert_eq!(record.reason.as_deref(), Some("FIBER_BW_THRESHOLD"));
    }

    #[test]
    fn test_reason_codes_serialize_screaming_snake() {
        let json = serde_json::to_string(&InfeasibleReason::FiberDistanceThreshold).unwrap();
        assert_eq!(json, r#""FIBER_DISTANCE_THRESHOLD""#);
        let json = serde_json::to_string(&InfeasibleReason::BudgetExceeded).unwrap();
        assert_eq!(json, r#""BUDGET_EXCEEDED""#);
    }

    #[test]
    fn test_project_lifetime_cost_sums_records() {
        let mut space = OutputSpace::new();
        space.push_results(&CostResultSpace {
            technology: FIBER_TECHNOLOGY.to_string(),
            distances: vec![],
            cost_results: vec![
                feasible_record("s-1", 1_000.0, 100.0),
                feasible_record("s-2", 2_000.0, 200.0),
            ],
        });
        let ids = vec![CoordinateId::new("s-1"), CoordinateId::new("s-2")];
        assert_eq!(
            space.project_lifetime_cost(&ids, FIBER_TECHNOLOGY, 1),
            3_300.0
        );
    }

    #[test]
    fn test_project_lifetime_cost_missing_school_is_infinite() {
        let space = OutputSpace::new();
        let ids = vec![CoordinateId::new("ghost")];
        assert!(space
            .project_lifetime_cost(&ids, FIBER_TECHNOLOGY, 1)
            .is_infinite());
    }

    #[test]
    fn test_infeasible_member_poisons_sum() {
        let mut space = OutputSpace::new();
        space.push_results(&CostResultSpace {
            technology: FIBER_TECHNOLOGY.to_string(),
            distances: vec![],
            cost_results: vec![
                feasible_record("s-1", 1_000.0, 100.0),
                SchoolConnectionCosts::infeasible(
                    CoordinateId::new("s-2"),
                    FIBER_TECHNOLOGY,
                    InfeasibleReason::FiberDistanceThreshold,
                ),
            ],
        });
        let ids = vec![CoordinateId::new("s-1"), CoordinateId::new("s-2")];
        let total = space.project_lifetime_cost(&ids, FIBER_TECHNOLOGY, 5);
        assert!(total.is_infinite() && total > 0.0);
    }
}
