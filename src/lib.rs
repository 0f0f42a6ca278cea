pub mod config;
pub mod logging;
pub mod poller;
pub mod stepd_client;
pub mod types;

pub use config::{Config, Protocol};
pub use poller::{PollOutcome, PollState, PollerConfig, StatusPoller, StatusSource};
pub use stepd_client::{HealthSignal, StatusReport, StepdClient};
pub use types::PollerError;
