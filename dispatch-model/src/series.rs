use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

/// Hour-aligned input series for one optimization horizon.
///
/// Produced by the upstream data-preparation stage: all columns share the same
/// length and hour alignment, hours are UTC-consistent with duplicates and
/// gaps already resolved, and invalid readings already coerced to zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema, TS)]
#[ts(export, export_to = "./series.ts")]
pub struct HourlySeries {
    /// Start of each hourly bucket.
    pub timestamps: Vec<DateTime<Utc>>,
    /// Household consumption per hour (kWh, >= 0).
    pub consumption_kwh: Vec<f64>,
    /// On-site generation per hour (kWh, >= 0), already scaled by installed nominal power.
    pub generation_kwh: Vec<f64>,
    /// Grid purchase price per hour (currency/kWh).
    pub price_buy: Vec<f64>,
    /// Surplus feed-in price per hour (currency/kWh).
    pub price_sell: Vec<f64>,
    /// Grid carbon intensity per hour (kg CO2/kWh), pass-through for downstream reporting.
    pub carbon_intensity: Vec<f64>,
}

impl HourlySeries {
    /// Number of hours in the horizon.
    pub fn len(&self) -> usize {
        self.consumption_kwh.len()
    }

    pub fn is_empty(&self) -> bool {
        self.consumption_kwh.is_empty()
    }
}
