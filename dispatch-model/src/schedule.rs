use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

/// Per-hour dispatch result bundle, aligned one-to-one with the input series.
///
/// Consumed by the external billing aggregator and the CO2 accounting step.
/// Price and carbon columns are echoed from the input untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema, TS)]
#[ts(export, export_to = "./schedule.ts")]
pub struct DispatchSchedule {
    /// Start of each hourly bucket, passed through from the input series.
    pub timestamps: Vec<DateTime<Utc>>,
    /// Optimized battery energy per hour (kWh, positive = charging).
    pub battery_energy_kwh: Vec<f64>,
    /// State of charge at the start of each hour (kWh).
    pub state_of_charge_kwh: Vec<f64>,
    /// Household consumption per hour (kWh).
    pub consumption_kwh: Vec<f64>,
    /// On-site generation per hour (kWh).
    pub generation_kwh: Vec<f64>,
    /// Grid purchase price per hour (currency/kWh).
    pub price_buy: Vec<f64>,
    /// Surplus feed-in price per hour (currency/kWh).
    pub price_sell: Vec<f64>,
    /// Grid carbon intensity per hour (kg CO2/kWh).
    pub carbon_intensity: Vec<f64>,
    /// Energy bought from the grid per hour (kWh).
    pub grid_purchase_kwh: Vec<f64>,
    /// Energy sold to the grid per hour (kWh).
    pub grid_sale_kwh: Vec<f64>,
}

impl DispatchSchedule {
    /// Number of hours in the schedule.
    pub fn len(&self) -> usize {
        self.battery_energy_kwh.len()
    }

    pub fn is_empty(&self) -> bool {
        self.battery_energy_kwh.is_empty()
    }
}
