//! # sct-schemas: Schema Types for School Connectivity Costing
//!
//! Serde schema types shared across the SCT workspace: technology cost
//! configuration, per-school cost records, school entities, the persisted
//! distance caches, and the model data space consumed by the cost models.
//!
//! All types serialize with serde; the cache types reproduce the exact JSON
//! wire format of the workspace cache files.

pub mod config;
pub mod distance_cache;
pub mod output;
pub mod school;

pub use config::{
    CostMinimizerConfig, ElectricityConfig, FiberCapexConfig, FiberConstraintsConfig,
    FiberCostConfig, FiberOpexConfig,
};
pub use distance_cache::{
    GreedyConnectCache, MultiLookupDistanceCache, SingleLookupDistanceCache,
};
pub use output::{
    CostResultSpace, InfeasibleReason, OutputSpace, SchoolConnectionCosts, FIBER_TECHNOLOGY,
};
pub use school::{ModelDataSpace, SchoolEntity};
