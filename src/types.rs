use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PollerError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{path} returned {status}")]
    Status {
        path: String,
        status: reqwest::StatusCode,
    },

    #[error("malformed status response: {0}")]
    Malformed(String),

    #[error("status request timed out after {0:?}")]
    Timeout(Duration),

    #[error("configuration error: {0}")]
    Config(String),
}
