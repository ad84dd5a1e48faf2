use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

/// Physical and contractual parameters of the on-site battery installation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema, TS)]
#[ts(export, export_to = "./battery.ts")]
pub struct BatteryConfig {
    /// Storage capacity (kWh, > 0).
    pub capacity_kwh: f64,
    /// Symmetric charge/discharge power limit (kW, >= 0; 0 leaves the battery inert).
    pub max_power_kw: f64,
    /// Grid connection limit on import and export power (kW, > 0).
    pub contracted_power_kw: f64,
    /// Charging efficiency, in (0, 1].
    pub charge_efficiency: f64,
    /// Discharging efficiency, in (0, 1].
    pub discharge_efficiency: f64,
    /// State of charge at hour 0 (kWh).
    pub initial_state_kwh: f64,
    /// Half-width of the end-of-horizon band around half capacity (kWh).
    ///
    /// Keeps successive re-optimizations well conditioned; a heuristic,
    /// not a physical requirement, so it stays configurable.
    pub terminal_band_kwh: f64,
}

impl Default for BatteryConfig {
    fn default() -> Self {
        Self {
            capacity_kwh: 10.0,
            max_power_kw: 5.0,
            contracted_power_kw: 5.0,
            charge_efficiency: 0.95,
            discharge_efficiency: 0.95,
            initial_state_kwh: 5.0,
            terminal_band_kwh: 0.5,
        }
    }
}
