//! The connection cost forest used by the topology optimizers.
//!
//! A [`ConnectedCostGraph`] is a directed graph where an edge
//! `parent -> child` encodes "child connects through parent". Supply points
//! are the roots (no incoming edge); every connected school has exactly one
//! parent, so the structure is a forest rooted at the supply nodes.
//!
//! Removal is single-node and leaf-only: callers prune leaf-to-root so
//! subtrees are never orphaned.

use crate::{CoordinateId, PairwiseDistance, SctError, SctResult};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use std::collections::{HashMap, HashSet};

/// Node payload: the coordinate id plus the cost of the node's own
/// connection (its parent edge). Roots carry zero cost.
#[derive(Debug, Clone, PartialEq)]
pub struct CostNode {
    pub id: CoordinateId,
    pub cost: f64,
}

/// A rooted cost forest over connection assignments.
///
/// Built from the greedy connector's output: each `PairwiseDistance` becomes
/// an edge from its target (the supply point, `coordinate2`) to its source
/// (the school, `coordinate1`), weighted by the connection distance.
#[derive(Debug, Clone, Default)]
pub struct ConnectedCostGraph {
    pub graph: DiGraph<CostNode, f64>,
    index: HashMap<CoordinateId, NodeIndex>,
    roots: HashSet<CoordinateId>,
}

impl ConnectedCostGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the forest from connection assignments.
    ///
    /// `node_cost` maps each assignment to the cost carried by the connected
    /// (child) node. Nodes that never appear as a child are the roots.
    pub fn from_distances<F>(distances: &[PairwiseDistance], node_cost: F) -> SctResult<Self>
    where
        F: Fn(&PairwiseDistance) -> f64,
    {
        let mut graph = Self::new();
        for d in distances {
            if d.is_self_pair() {
                continue;
            }
            let child = graph.ensure_node(d.source_id());
            let parent = graph.ensure_node(d.target_id());
            if graph
                .graph
                .edges_directed(child, Direction::Incoming)
                .next()
                .is_some()
            {
                return Err(SctError::Graph(format!(
                    "node '{}' already has a parent",
                    d.source_id()
                )));
            }
            graph.graph[child].cost = node_cost(d);
            graph.graph.add_edge(parent, child, d.distance);
        }
        graph.roots = graph
            .graph
            .externals(Direction::Incoming)
            .map(|idx| graph.graph[idx].id.clone())
            .collect();
        Ok(graph)
    }

    fn ensure_node(&mut self, id: &CoordinateId) -> NodeIndex {
        if let Some(&idx) = self.index.get(id) {
            return idx;
        }
        let idx = self.graph.add_node(CostNode {
            id: id.clone(),
            cost: 0.0,
        });
        self.index.insert(id.clone(), idx);
        idx
    }

    #[inline]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    #[inline]
    pub fn contains(&self, id: &CoordinateId) -> bool {
        self.index.contains_key(id)
    }

    /// The designated supply nodes; never removed, never reported as leaves.
    pub fn root_ids(&self) -> Vec<CoordinateId> {
        let mut ids: Vec<_> = self.roots.iter().cloned().collect();
        ids.sort();
        ids
    }

    #[inline]
    pub fn is_root(&self, id: &CoordinateId) -> bool {
        self.roots.contains(id)
    }

    /// All node ids, sorted for deterministic iteration.
    pub fn node_ids(&self) -> Vec<CoordinateId> {
        let mut ids: Vec<_> = self.graph.node_weights().map(|n| n.id.clone()).collect();
        ids.sort();
        ids
    }

    /// Node ids excluding the roots, sorted.
    pub fn non_root_ids(&self) -> Vec<CoordinateId> {
        let mut ids: Vec<_> = self
            .graph
            .node_weights()
            .map(|n| n.id.clone())
            .filter(|id| !self.roots.contains(id))
            .collect();
        ids.sort();
        ids
    }

    /// Connection cost of a node, if present.
    pub fn node_cost(&self, id: &CoordinateId) -> Option<f64> {
        self.index.get(id).map(|&idx| self.graph[idx].cost)
    }

    /// Sum of non-root node costs.
    pub fn total_node_cost(&self) -> f64 {
        self.graph
            .node_weights()
            .filter(|n| !self.roots.contains(&n.id))
            .map(|n| n.cost)
            .sum()
    }

    /// Non-root nodes with no children, sorted by id.
    pub fn leaf_nodes(&self) -> Vec<CoordinateId> {
        let mut leaves: Vec<_> = self
            .graph
            .externals(Direction::Outgoing)
            .map(|idx| self.graph[idx].id.clone())
            .filter(|id| !self.roots.contains(id))
            .collect();
        leaves.sort();
        leaves
    }

    /// The leaf with the highest cost; ties broken by lexicographically
    /// smallest id so pruning is deterministic across platforms.
    pub fn largest_cost_leaf(&self) -> Option<CoordinateId> {
        let mut best: Option<(f64, CoordinateId)> = None;
        for id in self.leaf_nodes() {
            let cost = match self.node_cost(&id) {
                Some(c) => c,
                None => continue,
            };
            match &best {
                Some((best_cost, best_id)) => {
                    if cost > *best_cost || (cost == *best_cost && id < *best_id) {
                        best = Some((cost, id));
                    }
                }
                None => best = Some((cost, id)),
            }
        }
        best.map(|(_, id)| id)
    }

    /// Remove a single non-root leaf node.
    ///
    /// Refuses to remove roots and nodes that still have children; callers
    /// prune leaf-to-root.
    pub fn remove_node(&mut self, id: &CoordinateId) -> SctResult<()> {
        let idx = *self
            .index
            .get(id)
            .ok_or_else(|| SctError::Graph(format!("unknown node '{id}'")))?;
        if self.roots.contains(id) {
            return Err(SctError::Graph(format!("cannot remove root node '{id}'")));
        }
        if self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .next()
            .is_some()
        {
            return Err(SctError::Graph(format!(
                "cannot remove node '{id}' while it has children"
            )));
        }
        self.index.remove(id);
        self.graph.remove_node(idx);
        // petgraph swaps the last node into the removed slot; repair the
        // id -> index mapping for the moved node.
        if let Some(moved) = self.graph.node_weight(idx) {
            self.index.insert(moved.id.clone(), idx);
        }
        Ok(())
    }
}
