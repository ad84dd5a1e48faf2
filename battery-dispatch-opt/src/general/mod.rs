pub mod energy;

pub use energy::{effective_energy, grid_flows, no_battery_baseline, state_trajectory};
