//! Budget-constrained cost-tree pruning.
//!
//! A pruner consumes a [`ConnectedCostGraph`] and removes nodes whose
//! inclusion is not justified against a budget or baseline constraint. The
//! three policies share one engine (step / evaluate / constraint / terminal
//! expressed as methods dispatched on [`PrunePolicy`]) but differ in their
//! stopping rule; the behaviors are deliberately distinct and downstream
//! consumers depend on each one, so none is folded into another.
//!
//! Nodes whose independent baseline is infeasible cost `+infinity` in every
//! comparison; NaN never enters the arithmetic.

use sct_core::{ConnectedCostGraph, CoordinateId, SctResult};
use sct_schemas::{OutputSpace, SchoolConnectionCosts};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Strategy for pruning the cost tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrunePolicy {
    /// Remove the largest-cost leaf while the subtree cost exceeds
    /// min(sum of independent baseline costs, static upper bound).
    GlobalThreshold,

    /// Per-node dominance check: discard the whole graph when its cost
    /// already exceeds the strict baseline (infinite if any member's
    /// baseline is infeasible); otherwise sweep the leaves, removing each
    /// feasible-baseline leaf whose independent cost beats its shared
    /// cost, until a sweep removes nothing.
    BaselineDominance,

    /// Remove the largest-cost leaf while the subtree cost exceeds the
    /// static upper bound alone.
    StaticBudget,
}

/// Iterative cost-tree minimizer.
pub struct CostTreePruner<'a> {
    policy: PrunePolicy,
    project_years: u32,
    /// Independent per-school connection cost under the comparison
    /// technology (the dynamic upper bound).
    baseline_lookup: &'a HashMap<CoordinateId, SchoolConnectionCosts>,
    output: &'a OutputSpace,
    root_nodes: HashSet<CoordinateId>,
    technology: String,
    static_upper_bound: f64,
}

impl<'a> CostTreePruner<'a> {
    pub fn new(
        policy: PrunePolicy,
        project_years: u32,
        baseline_lookup: &'a HashMap<CoordinateId, SchoolConnectionCosts>,
        output: &'a OutputSpace,
        root_nodes: &[CoordinateId],
        technology: impl Into<String>,
    ) -> Self {
        Self {
            policy,
            project_years,
            baseline_lookup,
            output,
            root_nodes: root_nodes.iter().cloned().collect(),
            technology: technology.into(),
            static_upper_bound: f64::INFINITY,
        }
    }

    /// Absolute budget ceiling used by the threshold policies.
    pub fn with_static_upper_bound(mut self, bound: f64) -> Self {
        self.static_upper_bound = bound;
        self
    }

    /// Prune the graph under the configured policy.
    pub fn run(&self, graph: ConnectedCostGraph) -> SctResult<ConnectedCostGraph> {
        match self.policy {
            PrunePolicy::GlobalThreshold | PrunePolicy::StaticBudget => {
                self.run_threshold(graph)
            }
            PrunePolicy::BaselineDominance => self.run_dominance(graph),
        }
    }

    fn non_root_ids(&self, graph: &ConnectedCostGraph) -> Vec<CoordinateId> {
        graph
            .node_ids()
            .into_iter()
            .filter(|id| !self.root_nodes.contains(id))
            .collect()
    }

    /// Cost of the graph: project lifetime cost of all non-root members.
    fn evaluate(&self, graph: &ConnectedCostGraph) -> f64 {
        self.output
            .project_lifetime_cost(&self.non_root_ids(graph), &self.technology, self.project_years)
    }

    /// Constraint value a minimum cost graph must stay below.
    fn constraint(&self, graph: &ConnectedCostGraph) -> f64 {
        match self.policy {
            PrunePolicy::StaticBudget => self.static_upper_bound,
            _ => self.baseline_cost(graph).min(self.static_upper_bound),
        }
    }

    fn terminal(&self, graph: &ConnectedCostGraph) -> bool {
        graph.node_count() <= 1
    }

    /// Sum of independent baseline costs over non-root members; a missing
    /// or infeasible record contributes `+infinity`.
    fn baseline_cost(&self, graph: &ConnectedCostGraph) -> f64 {
        self.non_root_ids(graph)
            .iter()
            .map(|id| match self.baseline_lookup.get(id) {
                Some(cost) => cost.technology_connectivity_cost(self.project_years),
                None => f64::INFINITY,
            })
            .sum()
    }

    /// Leaf with the highest cost among non-root leaves; ties go to the
    /// lexicographically smallest id.
    fn largest_cost_leaf(&self, graph: &ConnectedCostGraph) -> Option<CoordinateId> {
        let mut best: Option<(f64, CoordinateId)> = None;
        for id in graph.leaf_nodes() {
            if self.root_nodes.contains(&id) {
                continue;
            }
            let cost = match graph.node_cost(&id) {
                Some(c) => c,
                None => continue,
            };
            let better = match &best {
                None => true,
                Some((best_cost, best_id)) => {
                    cost > *best_cost || (cost == *best_cost && id < *best_id)
                }
            };
            if better {
                best = Some((cost, id));
            }
        }
        best.map(|(_, id)| id)
    }

    /// Greedy largest-leaf removal until the cost meets the constraint.
    /// Each step removes exactly one node, so the loop runs at most
    /// `initial_node_count - 1` times.
    fn run_threshold(&self, mut graph: ConnectedCostGraph) -> SctResult<ConnectedCostGraph> {
        while !self.terminal(&graph) && self.evaluate(&graph) > self.constraint(&graph) {
            let Some(leaf) = self.largest_cost_leaf(&graph) else {
                break;
            };
            debug!(node = %leaf, "pruning largest-cost leaf");
            graph.remove_node(&leaf)?;
        }
        Ok(graph)
    }

    /// Strict baseline for the dominance policy: infinite as soon as any
    /// member's baseline is missing or infeasible.
    fn strict_baseline_cost(&self, graph: &ConnectedCostGraph) -> f64 {
        let mut total = 0.0;
        for id in self.non_root_ids(graph) {
            match self.baseline_lookup.get(&id) {
                Some(cost) if cost.feasible => {
                    total += cost.technology_connectivity_cost(self.project_years);
                }
                _ => return f64::INFINITY,
            }
        }
        total
    }

    /// Full leaf sweeps removing every leaf that would be cheaper served
    /// independently, repeated until a sweep removes nothing.
    fn run_dominance(&self, mut graph: ConnectedCostGraph) -> SctResult<ConnectedCostGraph> {
        if self.evaluate(&graph) > self.strict_baseline_cost(&graph) {
            debug!("graph cost exceeds strict baseline; discarding whole graph");
            return Ok(ConnectedCostGraph::new());
        }
        loop {
            let mut removed_any = false;
            for id in graph.leaf_nodes() {
                if self.root_nodes.contains(&id) {
                    continue;
                }
                let Some(baseline) = self.baseline_lookup.get(&id) else {
                    continue;
                };
                if !baseline.feasible {
                    continue;
                }
                let independent = baseline.technology_connectivity_cost(self.project_years);
                let shared = self.output.project_lifetime_cost(
                    std::slice::from_ref(&id),
                    &self.technology,
                    self.project_years,
                );
                if independent < shared {
                    debug!(node = %id, independent, shared, "leaf dominated by its baseline");
                    graph.remove_node(&id)?;
                    removed_any = true;
                }
            }
            if !removed_any || self.terminal(&graph) {
                break;
            }
        }
        Ok(graph)
    }
}

/// Ids present in `original` but pruned from `pruned`; callers typically
/// mark these `BUDGET_EXCEEDED`.
pub fn removed_node_ids(
    original: &ConnectedCostGraph,
    pruned: &ConnectedCostGraph,
) -> Vec<CoordinateId> {
    original
        .node_ids()
        .into_iter()
        .filter(|id| !pruned.contains(id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sct_core::{Coordinate, PairwiseDistance};
    use sct_schemas::{CostResultSpace, InfeasibleReason, FIBER_TECHNOLOGY};

    const BASELINE_TECHNOLOGY: &str = "Satellite";
    const YEARS: u32 = 5;

    fn pair(source: &str, target: &str, distance: f64) -> PairwiseDistance {
        PairwiseDistance::new(
            Coordinate::new(source, 0.0, 0.0),
            Coordinate::new(target, 1.0, 1.0),
            distance,
        )
    }

    fn record(id: &str, technology: &str, capex: f64) -> SchoolConnectionCosts {
        SchoolConnectionCosts {
            school_id: CoordinateId::new(id),
            capex,
            capex_provider: capex,
            capex_consumer: 0.0,
            opex: 0.0,
            opex_provider: 0.0,
            opex_consumer: 0.0,
            electricity: 0.0,
            technology: technology.to_string(),
            feasible: true,
            reason: None,
        }
    }

    /// One root, three schools with fiber capex 1000/2000/3000.
    fn fixture() -> (ConnectedCostGraph, OutputSpace) {
        let distances = vec![
            pair("s-a", "node-1", 1_000.0),
            pair("s-b", "node-1", 2_000.0),
            pair("s-c", "node-1", 3_000.0),
        ];
        let graph = ConnectedCostGraph::from_distances(&distances, |d| d.distance).unwrap();
        let mut output = OutputSpace::new();
        output.push_results(&CostResultSpace {
            technology: FIBER_TECHNOLOGY.to_string(),
            distances,
            cost_results: vec![
                record("s-a", FIBER_TECHNOLOGY, 1_000.0),
                record("s-b", FIBER_TECHNOLOGY, 2_000.0),
                record("s-c", FIBER_TECHNOLOGY, 3_000.0),
            ],
        });
        (graph, output)
    }

    fn baseline(costs: &[(&str, f64)]) -> HashMap<CoordinateId, SchoolConnectionCosts> {
        costs
            .iter()
            .map(|(id, capex)| {
                (
                    CoordinateId::new(*id),
                    record(id, BASELINE_TECHNOLOGY, *capex),
                )
            })
            .collect()
    }

    fn roots() -> Vec<CoordinateId> {
        vec![CoordinateId::new("node-1")]
    }

    #[test]
    fn test_global_threshold_removes_largest_leaves_first() {
        let (graph, output) = fixture();
        // Fiber total 6000 vs baseline total 4500: prune until <= 4500.
        let baseline = baseline(&[("s-a", 1_500.0), ("s-b", 1_500.0), ("s-c", 1_500.0)]);
        let pruner = CostTreePruner::new(
            PrunePolicy::GlobalThreshold,
            YEARS,
            &baseline,
            &output,
            &roots(),
            FIBER_TECHNOLOGY,
        );
        let pruned = pruner.run(graph).unwrap();
        // s-c (3000) goes; remaining fiber cost 3000 beats the 3000
        // baseline of the survivors.
        assert!(!pruned.contains(&CoordinateId::new("s-c")));
        assert!(pruned.contains(&CoordinateId::new("s-a")));
        assert!(pruned.contains(&CoordinateId::new("s-b")));
    }

    #[test]
    fn test_global_threshold_keeps_graph_under_generous_baseline() {
        let (graph, output) = fixture();
        let baseline = baseline(&[("s-a", 9_000.0), ("s-b", 9_000.0), ("s-c", 9_000.0)]);
        let pruner = CostTreePruner::new(
            PrunePolicy::GlobalThreshold,
            YEARS,
            &baseline,
            &output,
            &roots(),
            FIBER_TECHNOLOGY,
        );
        let pruned = pruner.run(graph).unwrap();
        assert_eq!(pruned.node_count(), 4);
    }

    #[test]
    fn test_infeasible_baseline_relaxes_global_constraint_to_static_bound() {
        let (graph, output) = fixture();
        // One infeasible baseline makes the baseline sum infinite; with no
        // static bound the constraint is infinite and nothing is pruned.
        let mut baseline = baseline(&[("s-a", 100.0), ("s-b", 100.0)]);
        baseline.insert(
            CoordinateId::new("s-c"),
            SchoolConnectionCosts::infeasible(
                CoordinateId::new("s-c"),
                BASELINE_TECHNOLOGY,
                InfeasibleReason::FiberDistanceThreshold,
            ),
        );
        let pruner = CostTreePruner::new(
            PrunePolicy::GlobalThreshold,
            YEARS,
            &baseline,
            &output,
            &roots(),
            FIBER_TECHNOLOGY,
        );
        let pruned = pruner.run(graph).unwrap();
        assert_eq!(pruned.node_count(), 4);
    }

    #[test]
    fn test_static_budget_ignores_baseline() {
        let (graph, output) = fixture();
        // Baseline would forbid everything, but the static policy only
        // honors the absolute ceiling.
        let baseline = baseline(&[("s-a", 0.0), ("s-b", 0.0), ("s-c", 0.0)]);
        let pruner = CostTreePruner::new(
            PrunePolicy::StaticBudget,
            YEARS,
            &baseline,
            &output,
            &roots(),
            FIBER_TECHNOLOGY,
        )
        .with_static_upper_bound(3_500.0);
        let pruned = pruner.run(graph).unwrap();
        // 6000 -> remove s-c -> 3000 <= 3500, stop.
        assert!(!pruned.contains(&CoordinateId::new("s-c")));
        assert_eq!(pruned.node_count(), 3);
    }

    #[test]
    fn test_threshold_terminates_on_unsatisfiable_budget() {
        let (graph, output) = fixture();
        let baseline = baseline(&[("s-a", 0.0), ("s-b", 0.0), ("s-c", 0.0)]);
        let initial_nodes = graph.node_count();
        let pruner = CostTreePruner::new(
            PrunePolicy::StaticBudget,
            YEARS,
            &baseline,
            &output,
            &roots(),
            FIBER_TECHNOLOGY,
        )
        .with_static_upper_bound(0.0);
        let pruned = pruner.run(graph).unwrap();
        // Loop exits at the terminal single-node state after at most
        // initial_node_count - 1 removals.
        assert_eq!(pruned.node_count(), 1);
        assert!(initial_nodes - pruned.node_count() <= initial_nodes - 1);
    }

    #[test]
    fn test_dominance_discards_graph_costlier_than_strict_baseline() {
        let (graph, output) = fixture();
        // Strict baseline 4500 < fiber 6000: the whole graph goes.
        let baseline = baseline(&[("s-a", 1_500.0), ("s-b", 1_500.0), ("s-c", 1_500.0)]);
        let pruner = CostTreePruner::new(
            PrunePolicy::BaselineDominance,
            YEARS,
            &baseline,
            &output,
            &roots(),
            FIBER_TECHNOLOGY,
        );
        let pruned = pruner.run(graph).unwrap();
        assert!(pruned.is_empty());
    }

    #[test]
    fn test_dominance_infeasible_member_means_infinite_baseline() {
        let (graph, output) = fixture();
        // One infeasible member: strict baseline is infinite, so the graph
        // survives the short-circuit; the feasible cheap leaves then fall
        // to the per-node sweep.
        let mut baseline = baseline(&[("s-a", 500.0), ("s-b", 500.0)]);
        baseline.insert(
            CoordinateId::new("s-c"),
            SchoolConnectionCosts::infeasible(
                CoordinateId::new("s-c"),
                BASELINE_TECHNOLOGY,
                InfeasibleReason::FiberDistanceThreshold,
            ),
        );
        let pruner = CostTreePruner::new(
            PrunePolicy::BaselineDominance,
            YEARS,
            &baseline,
            &output,
            &roots(),
            FIBER_TECHNOLOGY,
        );
        let pruned = pruner.run(graph).unwrap();
        // s-a and s-b are cheaper independently (500 < 1000, 500 < 2000);
        // s-c has no feasible baseline and is never removed by the sweep.
        assert!(!pruned.contains(&CoordinateId::new("s-a")));
        assert!(!pruned.contains(&CoordinateId::new("s-b")));
        assert!(pruned.contains(&CoordinateId::new("s-c")));
    }

    #[test]
    fn test_dominance_keeps_leaves_cheaper_shared() {
        let (graph, output) = fixture();
        // Independent baselines all dearer than the shared costs: strict
        // baseline 15000 >= fiber 6000, and no leaf is dominated.
        let baseline = baseline(&[("s-a", 5_000.0), ("s-b", 5_000.0), ("s-c", 5_000.0)]);
        let pruner = CostTreePruner::new(
            PrunePolicy::BaselineDominance,
            YEARS,
            &baseline,
            &output,
            &roots(),
            FIBER_TECHNOLOGY,
        );
        let pruned = pruner.run(graph).unwrap();
        assert_eq!(pruned.node_count(), 4);
    }

    #[test]
    fn test_policies_diverge_on_same_input() {
        // The V2 short-circuit discards a graph that V1 merely trims; the
        // divergence is intentional and both behaviors are pinned here.
        let (graph_v1, output) = fixture();
        let graph_v2 = graph_v1.clone();
        let baseline = baseline(&[("s-a", 1_500.0), ("s-b", 1_500.0), ("s-c", 1_500.0)]);

        let v1 = CostTreePruner::new(
            PrunePolicy::GlobalThreshold,
            YEARS,
            &baseline,
            &output,
            &roots(),
            FIBER_TECHNOLOGY,
        )
        .run(graph_v1)
        .unwrap();
        let v2 = CostTreePruner::new(
            PrunePolicy::BaselineDominance,
            YEARS,
            &baseline,
            &output,
            &roots(),
            FIBER_TECHNOLOGY,
        )
        .run(graph_v2)
        .unwrap();

        assert_eq!(v1.node_count(), 3);
        assert!(v2.is_empty());
    }

    #[test]
    fn test_root_only_graph_is_terminal() {
        let graph = ConnectedCostGraph::new();
        let output = OutputSpace::new();
        let baseline = HashMap::new();
        let pruner = CostTreePruner::new(
            PrunePolicy::GlobalThreshold,
            YEARS,
            &baseline,
            &output,
            &roots(),
            FIBER_TECHNOLOGY,
        );
        let pruned = pruner.run(graph).unwrap();
        assert!(pruned.is_empty());
    }

    #[test]
    fn test_removed_node_ids_diff() {
        let (graph, output) = fixture();
        let original = graph.clone();
        let baseline = baseline(&[("s-a", 0.0), ("s-b", 0.0), ("s-c", 0.0)]);
        let pruned = CostTreePruner::new(
            PrunePolicy::StaticBudget,
            YEARS,
            &baseline,
            &output,
            &roots(),
            FIBER_TECHNOLOGY,
        )
        .with_static_upper_bound(3_500.0)
        .run(graph)
        .unwrap();
        assert_eq!(
            removed_node_ids(&original, &pruned),
            vec![CoordinateId::new("s-c")]
        );
    }
}
