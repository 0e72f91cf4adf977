//! End-to-end cost model facades.

pub mod fiber;

pub use fiber::FiberCostModel;
