use std::env;
use std::path::Path;

use tokio::fs;
use tracing::{info, warn};

use crate::types::PollerError;

use super::{paths, Config};

pub const API_URL_ENV: &str = "STEPD_API_URL";
pub const API_KEY_ENV: &str = "STEPD_API_KEY";

impl Config {
    /// Load configuration from config.json in the app directory, then apply
    /// environment overrides.
    /// Falls back to defaults if the file doesn't exist or can't be parsed
    pub async fn load() -> Self {
        let config_path = paths::get_config_path();
        let mut config = match Self::load_from(&config_path).await {
            Ok(config) => config,
            Err(err) => {
                warn!(error = ?err, "Failed to load config.json, using defaults");
                Self::default()
            }
        };
        config.apply_env_overrides(|key| env::var(key).ok());

        info!(
            base_url = %config.base_url,
            interval_ms = config.poll_interval_ms,
            protocol = ?config.protocol,
            "Loaded configuration"
        );
        config
    }

    pub async fn load_from(config_path: &Path) -> Result<Self, PollerError> {
        if !config_path.exists() {
            warn!(path = %config_path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(config_path)
            .await
            .map_err(|err| PollerError::Config(format!("Failed to read config file: {err}")))?;

        serde_json::from_str(&contents)
            .map_err(|err| PollerError::Config(format!("Failed to parse config.json: {err}")))
    }

    /// Blank values are ignored so an exported-but-empty variable doesn't wipe the file setting.
    fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(API_URL_ENV) {
            let trimmed = url.trim();
            if !trimmed.is_empty() {
                self.base_url = trimmed.to_string();
            }
        }
        if let Some(key) = lookup(API_KEY_ENV) {
            let trimmed = key.trim();
            if !trimmed.is_empty() {
                self.api_key = Some(trimmed.to_string());
            }
        }
    }
}
