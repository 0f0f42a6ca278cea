use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::{Config, Protocol};
use crate::poller::StatusSource;
use crate::types::PollerError;

use super::helpers::join_url;
use super::models::StatusReport;

/// Status endpoint the stepd plugin registers under the server's API root.
pub const STATUS_PATH: &str = "/plugin/stepd";

const API_KEY_HEADER: &str = "X-Api-Key";

#[derive(Clone)]
pub struct StepdClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
    protocol: Protocol,
}

impl StepdClient {
    pub fn new(config: &Config) -> Result<Self, PollerError> {
        let http = Client::builder()
            .timeout(config.request_timeout())
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(PollerError::Http)?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            protocol: config.protocol,
        })
    }

    pub fn status_url(&self) -> String {
        join_url(&self.base_url, STATUS_PATH)
    }

    /// Fetch and normalize the current daemon status.
    pub async fn fetch_status(&self) -> Result<StatusReport, PollerError> {
        let value: Value = self.get_json(STATUS_PATH).await?;
        StatusReport::from_value(&value, self.protocol)
    }

    async fn get_json<T>(&self, path: &str) -> Result<T, PollerError>
    where
        T: DeserializeOwned,
    {
        let mut request = self.http.get(join_url(&self.base_url, path));
        if let Some(api_key) = &self.api_key {
            request = request.header(API_KEY_HEADER, api_key);
        }
        let response = request.send().await.map_err(PollerError::Http)?;

        if !response.status().is_success() {
            return Err(PollerError::Status {
                path: path.to_string(),
                status: response.status(),
            });
        }

        // Decode separately so a bad body is reported as malformed rather than a transport failure.
        let body = response.bytes().await.map_err(PollerError::Http)?;
        serde_json::from_slice(&body)
            .map_err(|err| PollerError::Malformed(format!("{path} returned invalid JSON: {err}")))
    }
}

#[async_trait]
impl StatusSource for StepdClient {
    async fn fetch(&self) -> Result<StatusReport, PollerError> {
        self.fetch_status().await
    }
}
