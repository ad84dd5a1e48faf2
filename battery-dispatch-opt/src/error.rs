use thiserror::Error;

/// Fatal input errors raised before the solver is invoked.
///
/// Non-convergence is deliberately absent: an iteration-limit exit still
/// returns a best-effort schedule with the convergence flag cleared on
/// [`crate::dispatch::solver::SolveReport`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DispatchError {
    #[error("hourly series is empty; at least one hour is required")]
    EmptyHorizon,
    #[error("series column `{name}` has length {len}, expected {expected}")]
    MismatchedSeries {
        name: &'static str,
        len: usize,
        expected: usize,
    },
    #[error("battery capacity must be positive, got {0} kWh")]
    NonPositiveCapacity(f64),
    #[error("battery max power must not be negative, got {0} kW")]
    NegativeMaxPower(f64),
    #[error("contracted power must be positive, got {0} kW")]
    NonPositiveContractedPower(f64),
    #[error("{name} must lie in (0, 1], got {value}")]
    EfficiencyOutOfRange { name: &'static str, value: f64 },
    #[error("initial guess has length {len}, expected horizon length {expected}")]
    InitialGuessLength { len: usize, expected: usize },
}
