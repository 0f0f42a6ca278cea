mod api;
mod client;
mod helpers;
mod models;

pub use client::{StepdClient, STATUS_PATH};
pub use helpers::format_relative_time;
pub use models::{HealthSignal, StatusReport};
