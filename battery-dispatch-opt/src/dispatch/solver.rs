use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::dispatch::formulate::DispatchProblem;
use crate::error::DispatchError;

/// Penalty weight is capped so a structurally infeasible run degrades into a
/// best-effort answer instead of overflowing.
const MAX_PENALTY: f64 = 1e8;
const MAX_STEP: f64 = 1e3;
const STATIONARITY_TOLERANCE: f64 = 1e-8;

/// Stopping controls and tuning for one solver run.
///
/// Passed explicitly into [`solve`]; there is no process-global solver state,
/// so independent runs stay re-entrant for caller-side sensitivity sweeps.
/// The defaults keep per-run cost bounded for a full year of hourly data
/// (T ≈ 8760, constraint count O(T)).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverOptions {
    /// Maximum outer (multiplier-update) iterations.
    pub max_iterations: usize,
    /// Objective-change tolerance between outer iterations.
    pub tolerance: f64,
    /// Largest constraint violation admissible for a converged run.
    pub constraint_tolerance: f64,
    /// Projected-gradient steps per outer iteration.
    pub inner_iterations: usize,
    /// Armijo sufficient-decrease coefficient for the line search.
    pub armijo_c1: f64,
    /// Step shrink factor when the line search backtracks.
    pub backtrack_beta: f64,
    /// Line-search trials before an inner iteration gives up.
    pub max_line_search_trials: usize,
    /// Initial quadratic penalty weight.
    pub penalty_initial: f64,
    /// Penalty growth factor applied when infeasibility stalls.
    pub penalty_growth: f64,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            max_iterations: 50,
            tolerance: 0.01,
            constraint_tolerance: 1e-3,
            inner_iterations: 200,
            armijo_c1: 1e-4,
            backtrack_beta: 0.5,
            max_line_search_trials: 40,
            penalty_initial: 10.0,
            penalty_growth: 5.0,
        }
    }
}

/// Outcome of one solver run.
#[derive(Debug, Clone)]
pub struct SolveReport {
    /// Optimized hourly battery energy (kWh), positive = charging.
    pub decision: Vec<f64>,
    /// Billing cost of `decision`.
    pub objective: f64,
    /// False when the iteration limit was reached before both tolerances were
    /// met. `decision` is then still the best vector found, not a failure.
    pub converged: bool,
    /// Outer iterations performed.
    pub iterations: usize,
    /// Largest remaining constraint violation of `decision`.
    pub max_violation: f64,
    /// Wall-clock time of the run.
    pub elapsed: Duration,
}

/// Minimizes the dispatch cost subject to the formulated constraints.
///
/// Augmented-Lagrangian outer loop around a projected-subgradient inner loop
/// with Armijo backtracking. The objective keeps its piecewise kinks; the
/// line search simply stops descending when a kink leaves no progress, which
/// the multiplier update then absorbs.
///
/// A missing initial guess starts from the all-zero vector. A guess of the
/// wrong length is a fatal input error; everything past that point returns a
/// report, converged or not.
pub fn solve(
    problem: &DispatchProblem<'_>,
    initial_guess: Option<Vec<f64>>,
    options: &SolverOptions,
) -> Result<SolveReport, DispatchError> {
    let t_len = problem.horizon();
    let mut x = match initial_guess {
        Some(guess) => {
            if guess.len() != t_len {
                return Err(DispatchError::InitialGuessLength {
                    len: guess.len(),
                    expected: t_len,
                });
            }
            guess
        }
        None => vec![0.0; t_len],
    };
    let (lower, upper) = problem.bounds();
    for value in &mut x {
        *value = value.clamp(lower, upper);
    }

    let start = Instant::now();
    info!(
        horizon = t_len,
        constraints = problem.constraint_count(),
        "optimizing dispatch schedule"
    );

    let mut lambda = vec![0.0; problem.constraint_count()];
    let mut mu = options.penalty_initial;
    let mut objective = problem.objective(&x);
    let mut violation = max_violation(&problem.constraints(&x));

    let mut best_x = x.clone();
    let mut best_objective = objective;
    let mut best_violation = violation;

    let mut iterations = 0;
    let mut converged = false;
    for _ in 0..options.max_iterations {
        iterations += 1;
        minimize_penalized(problem, &mut x, &lambda, mu, options, lower, upper);

        let constraints = problem.constraints(&x);
        let current_violation = max_violation(&constraints);
        let current_objective = problem.objective(&x);

        let current_feasible = current_violation <= options.constraint_tolerance;
        let best_feasible = best_violation <= options.constraint_tolerance;
        let improved = if current_feasible && best_feasible {
            current_objective < best_objective
        } else {
            current_violation < best_violation
        };
        if improved {
            best_x.copy_from_slice(&x);
            best_objective = current_objective;
            best_violation = current_violation;
        }

        if current_feasible && (current_objective - objective).abs() <= options.tolerance {
            converged = true;
            break;
        }

        for (multiplier, value) in lambda.iter_mut().zip(&constraints) {
            *multiplier = (*multiplier - mu * value).max(0.0);
        }
        if current_violation > 0.25 * violation {
            mu = (mu * options.penalty_growth).min(MAX_PENALTY);
        }
        objective = current_objective;
        violation = current_violation;
    }

    let elapsed = start.elapsed();
    if converged {
        info!(
            ?elapsed,
            iterations,
            objective = best_objective,
            "dispatch optimization converged"
        );
    } else {
        warn!(
            ?elapsed,
            iterations,
            max_violation = best_violation,
            "iteration limit reached; returning best-effort schedule"
        );
    }

    Ok(SolveReport {
        decision: best_x,
        objective: best_objective,
        converged,
        iterations,
        max_violation: best_violation,
        elapsed,
    })
}

fn max_violation(constraints: &[f64]) -> f64 {
    constraints.iter().fold(0.0_f64, |acc, &value| acc.max(-value))
}

/// Augmented-Lagrangian value for inequality constraints `g >= 0` with
/// multipliers `lambda` and penalty weight `mu`.
fn penalized_value(problem: &DispatchProblem<'_>, x: &[f64], lambda: &[f64], mu: f64) -> f64 {
    let mut value = problem.objective(x);
    for (&multiplier, &g) in lambda.iter().zip(&problem.constraints(x)) {
        let shifted = (multiplier - mu * g).max(0.0);
        value += (shifted * shifted - multiplier * multiplier) / (2.0 * mu);
    }
    value
}

fn penalized_gradient(
    problem: &DispatchProblem<'_>,
    x: &[f64],
    lambda: &[f64],
    mu: f64,
    grad: &mut [f64],
) {
    problem.objective_subgradient(x, grad);
    let alpha: Vec<f64> = lambda
        .iter()
        .zip(&problem.constraints(x))
        .map(|(&multiplier, &g)| (multiplier - mu * g).max(0.0))
        .collect();
    problem.accumulate_constraint_subgradient(x, &alpha, grad);
}

/// Projected-subgradient descent on the augmented Lagrangian, `x` clamped to
/// the box bounds after every step.
fn minimize_penalized(
    problem: &DispatchProblem<'_>,
    x: &mut Vec<f64>,
    lambda: &[f64],
    mu: f64,
    options: &SolverOptions,
    lower: f64,
    upper: f64,
) {
    let mut grad = vec![0.0; x.len()];
    let mut value = penalized_value(problem, x, lambda, mu);
    let mut step = 1.0;

    for _ in 0..options.inner_iterations {
        penalized_gradient(problem, x, lambda, mu, &mut grad);

        let stationarity = x
            .iter()
            .zip(&grad)
            .map(|(&xi, &gi)| (xi - (xi - gi).clamp(lower, upper)).abs())
            .fold(0.0_f64, f64::max);
        if stationarity <= STATIONARITY_TOLERANCE {
            break;
        }

        let mut accepted = false;
        let mut trial = step;
        for _ in 0..options.max_line_search_trials {
            let candidate: Vec<f64> = x
                .iter()
                .zip(&grad)
                .map(|(&xi, &gi)| (xi - trial * gi).clamp(lower, upper))
                .collect();
            let decrease: f64 = grad
                .iter()
                .zip(&candidate)
                .zip(x.iter())
                .map(|((&gi, &ci), &xi)| gi * (ci - xi))
                .sum();
            let candidate_value = penalized_value(problem, &candidate, lambda, mu);
            if candidate_value <= value + options.armijo_c1 * decrease {
                *x = candidate;
                value = candidate_value;
                step = (trial * 2.0).min(MAX_STEP);
                accepted = true;
                break;
            }
            trial *= options.backtrack_beta;
        }
        if !accepted {
            break;
        }
    }
}
