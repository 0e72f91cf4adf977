//! # sct-algo: Connectivity Cost Algorithms
//!
//! The algorithmic core of the SCT workspace:
//!
//! - [`nearest`] - chunked vectorized nearest-neighbor distance engine
//! - [`connect`] - greedy distance connector with economies-of-scale growth
//! - [`prune`] - budget-constrained cost-tree pruning policies
//! - [`minimize`] - cheapest-feasible-technology baseline minimizer
//! - [`electricity`] - the electricity cost collaborator seam
//! - [`workflows`] - end-to-end cost model facades (fiber)
//!
//! Everything here is single-threaded and deterministic: chunking bounds
//! memory, not parallelism, and tie-breaks are resolved by id so repeated
//! runs over the same inputs produce identical output.

pub mod connect;
pub mod electricity;
pub mod minimize;
pub mod nearest;
pub mod prune;
pub mod workflows;

pub use connect::GreedyDistanceConnector;
pub use electricity::{ElectricityModel, FlatElectricityModel};
pub use minimize::BaselineMinimizer;
pub use nearest::{VectorizedDistanceModel, DEFAULT_CHUNK_SIZE};
pub use prune::{removed_node_ids, CostTreePruner, PrunePolicy};
pub use workflows::FiberCostModel;
