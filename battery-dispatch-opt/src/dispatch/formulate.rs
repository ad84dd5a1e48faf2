use dispatch_model::battery::BatteryConfig;
use dispatch_model::series::HourlySeries;
use tracing::warn;

use crate::error::DispatchError;
use crate::general::energy::{effective_energy, grid_flows, state_trajectory};

/// Constrained formulation of one dispatch horizon.
///
/// Borrows the input series and battery parameters for the lifetime of one
/// optimization run and exposes the three solver inputs: objective,
/// concatenated inequality constraints and box bounds, plus the analytic
/// subgradients the solver consumes.
///
/// The objective and the grid-power constraints are piecewise linear with
/// kinks where the hourly net balance crosses zero. At a kink the buy-side
/// branch of the subgradient is taken; this is a subgradient choice, not a
/// change of problem semantics.
#[derive(Debug)]
pub struct DispatchProblem<'a> {
    series: &'a HourlySeries,
    battery: &'a BatteryConfig,
}

impl<'a> DispatchProblem<'a> {
    /// Validates the inputs and builds the formulation.
    ///
    /// Only shape and parameter-range errors are fatal here. An initial state
    /// outside `[0, capacity]` is accepted: feasibility is the solver's
    /// concern, and it will report the infeasibility instead.
    pub fn new(
        series: &'a HourlySeries,
        battery: &'a BatteryConfig,
    ) -> Result<Self, DispatchError> {
        validate(series, battery)?;
        if series
            .price_buy
            .iter()
            .chain(series.price_sell.iter())
            .all(|&price| price == 0.0)
        {
            // Reported, not corrected: the solve still runs.
            warn!("all buy and sell prices are zero; the objective is degenerate");
        }
        Ok(Self { series, battery })
    }

    /// Number of hourly decision variables.
    pub fn horizon(&self) -> usize {
        self.series.len()
    }

    /// Box bounds on the decision variable, identical for every hour.
    pub fn bounds(&self) -> (f64, f64) {
        (-self.battery.max_power_kw, self.battery.max_power_kw)
    }

    /// Billing cost of a candidate decision vector: purchases at the buy
    /// price minus sales at the sell price, summed over the horizon.
    pub fn objective(&self, e_bat: &[f64]) -> f64 {
        let s = self.series;
        let mut cost = 0.0;
        for t in 0..e_bat.len() {
            let net = s.consumption_kwh[t] + e_bat[t] - s.generation_kwh[t];
            cost += net.max(0.0) * s.price_buy[t] - (-net).max(0.0) * s.price_sell[t];
        }
        cost
    }

    /// Concatenated inequality constraints, all in `value >= 0` form:
    ///
    /// 1. `state_of_charge[t]` for every hour,
    /// 2. `capacity - state_of_charge[t]` for every hour,
    /// 3. `contracted_power - grid_purchase[t]` for every hour,
    /// 4. `contracted_power - grid_sale[t]` for every hour,
    /// 5. two scalars pinning the projected end-of-horizon state inside
    ///    `capacity / 2 ± terminal_band`.
    pub fn constraints(&self, e_bat: &[f64]) -> Vec<f64> {
        let b = self.battery;
        let s = self.series;
        let states = state_trajectory(
            e_bat,
            b.initial_state_kwh,
            b.charge_efficiency,
            b.discharge_efficiency,
        );
        let (purchase, sale) = grid_flows(&s.consumption_kwh, &s.generation_kwh, e_bat);

        let mut values = Vec::with_capacity(self.constraint_count());
        values.extend(states.iter().copied());
        values.extend(states.iter().map(|&state| b.capacity_kwh - state));
        values.extend(purchase.iter().map(|&p| b.contracted_power_kw - p));
        values.extend(sale.iter().map(|&v| b.contracted_power_kw - v));

        let last = e_bat.len() - 1;
        let end_state = states[last]
            + effective_energy(e_bat[last], b.charge_efficiency, b.discharge_efficiency);
        let target = b.capacity_kwh / 2.0;
        values.push(end_state - (target - b.terminal_band_kwh));
        values.push((target + b.terminal_band_kwh) - end_state);
        values
    }

    /// Length of the vector returned by [`Self::constraints`].
    pub fn constraint_count(&self) -> usize {
        4 * self.horizon() + 2
    }

    /// Writes the objective subgradient into `grad`, overwriting it.
    pub(crate) fn objective_subgradient(&self, e_bat: &[f64], grad: &mut [f64]) {
        let s = self.series;
        for t in 0..e_bat.len() {
            let net = s.consumption_kwh[t] + e_bat[t] - s.generation_kwh[t];
            grad[t] = if net >= 0.0 {
                s.price_buy[t]
            } else {
                s.price_sell[t]
            };
        }
    }

    /// Adds `-Σ alpha[i] * ∇constraints[i]` into `grad`.
    ///
    /// `alpha` holds one non-negative multiplier per constraint, in the same
    /// order as [`Self::constraints`]. The state-of-charge rows are handled
    /// with a single suffix-sum pass, keeping the whole accumulation O(T).
    pub(crate) fn accumulate_constraint_subgradient(
        &self,
        e_bat: &[f64],
        alpha: &[f64],
        grad: &mut [f64],
    ) {
        let b = self.battery;
        let s = self.series;
        let t_len = e_bat.len();
        let alpha_terminal_low = alpha[4 * t_len];
        let alpha_terminal_high = alpha[4 * t_len + 1];

        // Running sum of (upper - lower) state multipliers over hours > k.
        let mut suffix = 0.0;
        for k in (0..t_len).rev() {
            let weight = if e_bat[k] >= 0.0 {
                b.charge_efficiency
            } else {
                1.0 / b.discharge_efficiency
            };
            // State rows for hours after k, plus both terminal rows which see
            // the full trajectory including hour k.
            grad[k] += weight * (suffix - alpha_terminal_low + alpha_terminal_high);
            suffix += alpha[t_len + k] - alpha[k];

            // Grid power limits act on hour k alone.
            let net = s.consumption_kwh[k] + e_bat[k] - s.generation_kwh[k];
            if net > 0.0 {
                grad[k] += alpha[2 * t_len + k];
            } else if net < 0.0 {
                grad[k] -= alpha[3 * t_len + k];
            }
        }
    }
}

fn validate(series: &HourlySeries, battery: &BatteryConfig) -> Result<(), DispatchError> {
    let expected = series.len();
    if expected == 0 {
        return Err(DispatchError::EmptyHorizon);
    }
    let columns = [
        ("timestamps", series.timestamps.len()),
        ("generation_kwh", series.generation_kwh.len()),
        ("price_buy", series.price_buy.len()),
        ("price_sell", series.price_sell.len()),
        ("carbon_intensity", series.carbon_intensity.len()),
    ];
    for (name, len) in columns {
        if len != expected {
            return Err(DispatchError::MismatchedSeries {
                name,
                len,
                expected,
            });
        }
    }
    if !(battery.capacity_kwh > 0.0) {
        return Err(DispatchError::NonPositiveCapacity(battery.capacity_kwh));
    }
    if !(battery.max_power_kw >= 0.0) {
        return Err(DispatchError::NegativeMaxPower(battery.max_power_kw));
    }
    if !(battery.contracted_power_kw > 0.0) {
        return Err(DispatchError::NonPositiveContractedPower(
            battery.contracted_power_kw,
        ));
    }
    let efficiencies = [
        ("charge_efficiency", battery.charge_efficiency),
        ("discharge_efficiency", battery.discharge_efficiency),
    ];
    for (name, value) in efficiencies {
        if !(value > 0.0 && value <= 1.0) {
            return Err(DispatchError::EfficiencyOutOfRange { name, value });
        }
    }
    Ok(())
}
