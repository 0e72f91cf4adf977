//! Technology cost configuration.
//!
//! Field defaults follow the standard fiber parameter set (USD): 8,900 per
//! km of trench, 1,000 setup per school, 100 per km annual maintenance,
//! 2,000 Mbps serviceable ceiling, 20 km maximum connection length.

use serde::{Deserialize, Serialize};

/// Complete fiber technology cost configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FiberCostConfig {
    #[serde(default)]
    pub capex: FiberCapexConfig,
    #[serde(default)]
    pub opex: FiberOpexConfig,
    #[serde(default)]
    pub constraints: FiberConstraintsConfig,
    #[serde(default)]
    pub electricity: ElectricityConfig,
}

impl Default for FiberCostConfig {
    fn default() -> Self {
        Self {
            capex: FiberCapexConfig::default(),
            opex: FiberOpexConfig::default(),
            constraints: FiberConstraintsConfig::default(),
            electricity: ElectricityConfig::default(),
        }
    }
}

/// One-time capital costs of a fiber connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FiberCapexConfig {
    /// Cost of laying fiber, USD per km of connection length
    #[serde(default = "default_capex_cost_per_km")]
    pub cost_per_km: f64,
    /// Fixed consumer-side setup cost per school (modem/terminal install), USD
    #[serde(default = "default_fixed_costs")]
    pub fixed_costs: f64,
    /// Allow schools connected during this run to serve as supply points
    #[serde(default = "default_true")]
    pub economies_of_scale: bool,
    /// Seed schools that are already connected into the supply set
    #[serde(default = "default_true")]
    pub schools_as_fiber_nodes: bool,
}

fn default_capex_cost_per_km() -> f64 {
    8_900.0
}

fn default_fixed_costs() -> f64 {
    1_000.0
}

fn default_true() -> bool {
    true
}

impl Default for FiberCapexConfig {
    fn default() -> Self {
        Self {
            cost_per_km: default_capex_cost_per_km(),
            fixed_costs: default_fixed_costs(),
            economies_of_scale: true,
            schools_as_fiber_nodes: true,
        }
    }
}

/// Recurring annual costs of a fiber connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FiberOpexConfig {
    /// Maintenance cost, USD per km of connection length per year
    #[serde(default = "default_opex_cost_per_km")]
    pub cost_per_km: f64,
    /// Fixed consumer-side operating cost per school per year, USD
    #[serde(default)]
    pub fixed_costs: f64,
    /// Connectivity cost, USD per Mbps of bandwidth demand per year
    #[serde(default = "default_annual_bandwidth_cost")]
    pub annual_bandwidth_cost_per_mbps: f64,
}

fn default_opex_cost_per_km() -> f64 {
    100.0
}

fn default_annual_bandwidth_cost() -> f64 {
    1.0
}

impl Default for FiberOpexConfig {
    fn default() -> Self {
        Self {
            cost_per_km: default_opex_cost_per_km(),
            fixed_costs: 0.0,
            annual_bandwidth_cost_per_mbps: default_annual_bandwidth_cost(),
        }
    }
}

/// Feasibility constraints of the fiber technology.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FiberConstraintsConfig {
    /// Maximum serviceable bandwidth demand, Mbps
    #[serde(default = "default_maximum_bandwidth")]
    pub maximum_bandwidth_mbps: f64,
    /// Maximum connection length between a school and its supply point, meters
    #[serde(default = "default_maximum_connection_length")]
    pub maximum_connection_length_m: f64,
    /// Annual power required to operate the connection, kWh
    #[serde(default = "default_required_power")]
    pub required_power_kwh: f64,
}

fn default_maximum_bandwidth() -> f64 {
    2_000.0
}

fn default_maximum_connection_length() -> f64 {
    20_000.0
}

fn default_required_power() -> f64 {
    500.0
}

impl Default for FiberConstraintsConfig {
    fn default() -> Self {
        Self {
            maximum_bandwidth_mbps: default_maximum_bandwidth(),
            maximum_connection_length_m: default_maximum_connection_length(),
            required_power_kwh: default_required_power(),
        }
    }
}

/// Parameters consumed by the electricity cost collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElectricityConfig {
    /// Grid electricity cost, USD per kWh per year
    #[serde(default = "default_cost_per_kwh")]
    pub annual_cost_per_kwh: f64,
}

fn default_cost_per_kwh() -> f64 {
    0.1
}

impl Default for ElectricityConfig {
    fn default() -> Self {
        Self {
            annual_cost_per_kwh: default_cost_per_kwh(),
        }
    }
}

/// Configuration of the baseline cost minimizer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostMinimizerConfig {
    /// OpEx horizon in years used when comparing technologies
    #[serde(default = "default_years_opex")]
    pub years_opex: u32,
}

fn default_years_opex() -> u32 {
    5
}

impl Default for CostMinimizerConfig {
    fn default() -> Self {
        Self {
            years_opex: default_years_opex(),
        }
    }
}
