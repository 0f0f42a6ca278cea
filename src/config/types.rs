use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for the stepd status poller
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    #[serde(default)]
    pub protocol: Protocol,
}

/// Which response field carries the secondary health signal.
///
/// Older plugin builds report `running`, newer ones `success`. `Auto` accepts
/// whichever is present.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Protocol {
    #[default]
    Auto,
    Running,
    Success,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            poll_interval_ms: default_poll_interval_ms(),
            request_timeout_ms: default_request_timeout_ms(),
            protocol: Protocol::default(),
        }
    }
}

impl Config {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms.max(1))
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:5000/api".to_string()
}

fn default_poll_interval_ms() -> u64 {
    3000
}

fn default_request_timeout_ms() -> u64 {
    10_000
}
