mod report;
mod signal;

pub use report::StatusReport;
pub use signal::HealthSignal;
