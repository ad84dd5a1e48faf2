use dispatch_model::series::HourlySeries;

/// Energy actually added to or drawn from storage after efficiency losses.
///
/// Positive `e_bat` is charging, negative is discharging. Charging loses
/// energy on the way in, discharging draws more than is delivered.
pub fn effective_energy(e_bat: f64, charge_efficiency: f64, discharge_efficiency: f64) -> f64 {
    if e_bat >= 0.0 {
        e_bat * charge_efficiency
    } else {
        e_bat / discharge_efficiency
    }
}

/// State of charge at the start of each hour, as a prefix sum over the
/// decision vector.
///
/// The state at hour `t` reflects all dispatch decisions strictly before `t`;
/// the decision of hour `t` itself only shows up in hour `t + 1`.
pub fn state_trajectory(
    e_bat: &[f64],
    initial_state: f64,
    charge_efficiency: f64,
    discharge_efficiency: f64,
) -> Vec<f64> {
    e_bat
        .iter()
        .scan(initial_state, |state, &e| {
            let current = *state;
            *state += effective_energy(e, charge_efficiency, discharge_efficiency);
            Some(current)
        })
        .collect()
}

/// Splits the hourly net balance `consumption + e_bat - generation` into grid
/// purchase and grid sale series.
///
/// At most one of the two is nonzero for any hour.
pub fn grid_flows(
    consumption_kwh: &[f64],
    generation_kwh: &[f64],
    e_bat: &[f64],
) -> (Vec<f64>, Vec<f64>) {
    let mut purchase = Vec::with_capacity(e_bat.len());
    let mut sale = Vec::with_capacity(e_bat.len());
    for t in 0..e_bat.len() {
        let net = consumption_kwh[t] + e_bat[t] - generation_kwh[t];
        purchase.push(net.max(0.0));
        sale.push((-net).max(0.0));
    }
    (purchase, sale)
}

/// Annual cost with the battery inert: every deficit is bought, every surplus
/// is sold. Reference value the optimizer must not exceed.
pub fn no_battery_baseline(series: &HourlySeries) -> f64 {
    let mut cost = 0.0;
    for t in 0..series.len() {
        let net = series.consumption_kwh[t] - series.generation_kwh[t];
        cost += net.max(0.0) * series.price_buy[t] - (-net).max(0.0) * series.price_sell[t];
    }
    cost
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use chrono::{Duration, TimeZone, Utc};

    use super::*;

    fn series(consumption: &[f64], generation: &[f64], buy: f64, sell: f64) -> HourlySeries {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        HourlySeries {
            timestamps: (0..consumption.len() as i64)
                .map(|h| start + Duration::hours(h))
                .collect(),
            consumption_kwh: consumption.to_vec(),
            generation_kwh: generation.to_vec(),
            price_buy: vec![buy; consumption.len()],
            price_sell: vec![sell; consumption.len()],
            carbon_intensity: vec![0.15; consumption.len()],
        }
    }

    #[test]
    fn test_effective_energy_applies_losses_by_direction() {
        assert_abs_diff_eq!(effective_energy(2.0, 0.9, 0.8), 1.8);
        assert_abs_diff_eq!(effective_energy(-2.0, 0.9, 0.8), -2.5);
        assert_abs_diff_eq!(effective_energy(0.0, 0.9, 0.8), 0.0);
    }

    #[test]
    fn test_state_trajectory_recurrence() {
        let e_bat = [1.0, -0.5, 2.0, 0.0];
        let states = state_trajectory(&e_bat, 3.0, 0.9, 0.8);
        assert_eq!(states.len(), e_bat.len());
        assert_abs_diff_eq!(states[0], 3.0);
        for t in 1..states.len() {
            assert_abs_diff_eq!(
                states[t],
                states[t - 1] + effective_energy(e_bat[t - 1], 0.9, 0.8),
                epsilon = 1e-12
            );
        }
    }

    #[test]
    fn test_grid_flows_are_complementary() {
        let consumption = [2.0, 1.0, 2.0];
        let generation = [0.0, 3.0, 0.0];
        let e_bat = [0.5, 2.0, -2.0];
        let (purchase, sale) = grid_flows(&consumption, &generation, &e_bat);
        assert_abs_diff_eq!(purchase[0], 2.5);
        assert_abs_diff_eq!(sale[1], 0.0);
        assert_abs_diff_eq!(purchase[1], 0.0);
        assert_abs_diff_eq!(sale[2], 0.0);
        for t in 0..3 {
            assert_eq!(purchase[t] * sale[t], 0.0);
            assert!(purchase[t] >= 0.0 && sale[t] >= 0.0);
        }
    }

    #[test]
    fn test_no_battery_baseline_matches_hand_computation() {
        let series = series(&[2.0, 1.0, 2.0], &[0.0, 3.0, 0.0], 0.2, 0.05);
        // (2 + 2) * 0.2 - 2 * 0.05
        assert_abs_diff_eq!(no_battery_baseline(&series), 0.7, epsilon = 1e-12);
    }
}
