use dispatch_model::battery::BatteryConfig;
use dispatch_model::schedule::DispatchSchedule;
use dispatch_model::series::HourlySeries;

use crate::general::energy::{grid_flows, state_trajectory};

/// Projects a solved decision vector into the per-hour dispatch schedule.
///
/// Pure data transform: state of charge via the prefix-sum recurrence, grid
/// purchase/sale via the net-balance split, everything else echoed from the
/// input series untouched. No re-optimization happens here, so projecting the
/// same vector twice yields identical output.
pub fn project_dispatch(
    series: &HourlySeries,
    battery: &BatteryConfig,
    e_bat: &[f64],
) -> DispatchSchedule {
    let state_of_charge_kwh = state_trajectory(
        e_bat,
        battery.initial_state_kwh,
        battery.charge_efficiency,
        battery.discharge_efficiency,
    );
    let (grid_purchase_kwh, grid_sale_kwh) =
        grid_flows(&series.consumption_kwh, &series.generation_kwh, e_bat);

    DispatchSchedule {
        timestamps: series.timestamps.clone(),
        battery_energy_kwh: e_bat.to_vec(),
        state_of_charge_kwh,
        consumption_kwh: series.consumption_kwh.clone(),
        generation_kwh: series.generation_kwh.clone(),
        price_buy: series.price_buy.clone(),
        price_sell: series.price_sell.clone(),
        carbon_intensity: series.carbon_intensity.clone(),
        grid_purchase_kwh,
        grid_sale_kwh,
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::*;

    fn series() -> HourlySeries {
        let start = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        HourlySeries {
            timestamps: (0..3).map(|h| start + Duration::hours(h)).collect(),
            consumption_kwh: vec![2.0, 1.0, 2.0],
            generation_kwh: vec![0.0, 3.0, 0.0],
            price_buy: vec![0.2, 0.25, 0.3],
            price_sell: vec![0.05, 0.06, 0.07],
            carbon_intensity: vec![0.11, 0.12, 0.13],
        }
    }

    fn battery() -> BatteryConfig {
        BatteryConfig {
            capacity_kwh: 2.0,
            max_power_kw: 2.0,
            contracted_power_kw: 5.0,
            charge_efficiency: 0.9,
            discharge_efficiency: 0.8,
            initial_state_kwh: 0.0,
            terminal_band_kwh: 0.5,
        }
    }

    #[test]
    fn test_echoes_input_columns_untouched() {
        let series = series();
        let schedule = project_dispatch(&series, &battery(), &[0.5, 1.0, -1.0]);

        assert_eq!(schedule.len(), 3);
        assert_eq!(schedule.timestamps, series.timestamps);
        assert_eq!(schedule.consumption_kwh, series.consumption_kwh);
        assert_eq!(schedule.generation_kwh, series.generation_kwh);
        assert_eq!(schedule.price_buy, series.price_buy);
        assert_eq!(schedule.price_sell, series.price_sell);
        assert_eq!(schedule.carbon_intensity, series.carbon_intensity);
    }

    #[test]
    fn test_derived_columns() {
        let schedule = project_dispatch(&series(), &battery(), &[0.5, 1.0, -1.0]);

        // 0.0, then +0.5 * 0.9, then +1.0 * 0.9.
        for (state, expected) in schedule.state_of_charge_kwh.iter().zip([0.0, 0.45, 1.35]) {
            approx::assert_abs_diff_eq!(*state, expected, epsilon = 1e-12);
        }
        // net = [2.5, -1.0, 1.0]
        assert_eq!(schedule.grid_purchase_kwh, vec![2.5, 0.0, 1.0]);
        assert_eq!(schedule.grid_sale_kwh, vec![0.0, 1.0, 0.0]);
        for t in 0..3 {
            assert_eq!(
                schedule.grid_purchase_kwh[t] * schedule.grid_sale_kwh[t],
                0.0
            );
        }
    }

    #[test]
    fn test_projection_is_idempotent() {
        let series = series();
        let battery = battery();
        let decision = [0.5, 1.0, -1.0];
        let first = project_dispatch(&series, &battery, &decision);
        let second = project_dispatch(&series, &battery, &decision);
        assert_eq!(first, second);
    }
}
