pub mod dispatch;
pub mod error;
pub mod general;

// Re-export commonly used items for convenience
pub use dispatch::{DispatchOutcome, run_dispatch_opt};
pub use dispatch::solver::{SolveReport, SolverOptions};
pub use error::DispatchError;
