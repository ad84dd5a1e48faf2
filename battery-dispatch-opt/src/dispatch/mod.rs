pub mod formulate;
pub mod project;
pub mod solver;

use dispatch_model::battery::BatteryConfig;
use dispatch_model::schedule::DispatchSchedule;
use dispatch_model::series::HourlySeries;

use crate::dispatch::formulate::DispatchProblem;
use crate::dispatch::project::project_dispatch;
use crate::dispatch::solver::{SolveReport, SolverOptions, solve};
use crate::error::DispatchError;

/// Full result of one optimization run: the per-hour schedule for the billing
/// and CO2 collaborators, the solver report, and annual totals.
#[derive(Debug, Clone)]
pub struct DispatchOutcome {
    pub schedule: DispatchSchedule,
    pub report: SolveReport,
    /// Total energy bought from the grid over the horizon (kWh).
    pub annual_purchase_kwh: f64,
    /// Total energy sold to the grid over the horizon (kWh).
    pub annual_sale_kwh: f64,
    /// Total energy pushed into the battery over the horizon (kWh).
    pub annual_battery_in_kwh: f64,
    /// Total energy drawn from the battery over the horizon (kWh).
    pub annual_battery_out_kwh: f64,
    /// Purchases minus sales at the hourly tariff (currency).
    pub annual_cost: f64,
}

/// Runs one full dispatch optimization: validate, formulate, solve, project.
///
/// The run is a pure function of its arguments; there is no cached solver
/// state, so callers can run capacity or initial-guess sweeps in parallel.
/// `initial_guess` defaults to the all-zero schedule when absent.
pub fn run_dispatch_opt(
    series: &HourlySeries,
    battery: &BatteryConfig,
    initial_guess: Option<Vec<f64>>,
    options: &SolverOptions,
) -> Result<DispatchOutcome, DispatchError> {
    let problem = DispatchProblem::new(series, battery)?;
    let report = solve(&problem, initial_guess, options)?;
    let schedule = project_dispatch(series, battery, &report.decision);

    let annual_purchase_kwh = schedule.grid_purchase_kwh.iter().sum();
    let annual_sale_kwh = schedule.grid_sale_kwh.iter().sum();
    let annual_battery_in_kwh = schedule
        .battery_energy_kwh
        .iter()
        .filter(|&&e| e > 0.0)
        .sum();
    let annual_battery_out_kwh = -schedule
        .battery_energy_kwh
        .iter()
        .filter(|&&e| e < 0.0)
        .sum::<f64>();
    let annual_cost = (0..schedule.len())
        .map(|t| {
            schedule.grid_purchase_kwh[t] * schedule.price_buy[t]
                - schedule.grid_sale_kwh[t] * schedule.price_sell[t]
        })
        .sum();

    Ok(DispatchOutcome {
        schedule,
        report,
        annual_purchase_kwh,
        annual_sale_kwh,
        annual_battery_in_kwh,
        annual_battery_out_kwh,
        annual_cost,
    })
}
