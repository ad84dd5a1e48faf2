pub mod battery;
pub mod schedule;
pub mod series;

pub use battery::BatteryConfig;
pub use schedule::DispatchSchedule;
pub use series::HourlySeries;
