//! Electricity cost collaborator seam.
//!
//! The full electricity/solar sub-model lives outside this crate; the cost
//! workflows only need the annual figure per school, so the seam is a
//! single-method trait. [`FlatElectricityModel`] is the default
//! implementation: grid price times the technology's required power.

use sct_schemas::{FiberCostConfig, SchoolEntity};

/// Computes the annual electricity cost of operating a connection at a
/// school.
pub trait ElectricityModel {
    fn compute_cost(&self, school: &SchoolEntity) -> f64;
}

/// Flat-rate electricity model: every school pays the grid rate for the
/// technology's required annual power.
#[derive(Debug, Clone)]
pub struct FlatElectricityModel {
    annual_cost_per_kwh: f64,
    required_power_kwh: f64,
}

impl FlatElectricityModel {
    pub fn new(annual_cost_per_kwh: f64, required_power_kwh: f64) -> Self {
        Self {
            annual_cost_per_kwh,
            required_power_kwh,
        }
    }

    pub fn from_config(config: &FiberCostConfig) -> Self {
        Self::new(
            config.electricity.annual_cost_per_kwh,
            config.constraints.required_power_kwh,
        )
    }
}

impl ElectricityModel for FlatElectricityModel {
    fn compute_cost(&self, _school: &SchoolEntity) -> f64 {
        self.annual_cost_per_kwh * self.required_power_kwh
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_model_rate_times_power() {
        let model = FlatElectricityModel::new(0.2, 500.0);
        let school = SchoolEntity::new("s-1", 0.0, 0.0);
        assert_eq!(model.compute_cost(&school), 100.0);
    }

    #[test]
    fn test_from_config_reads_constraints() {
        let config = FiberCostConfig::default();
        let model = FlatElectricityModel::from_config(&config);
        let school = SchoolEntity::new("s-1", 0.0, 0.0);
        assert_eq!(model.compute_cost(&school), 0.1 * 500.0);
    }
}
