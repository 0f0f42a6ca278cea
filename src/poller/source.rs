use async_trait::async_trait;

use crate::stepd_client::StatusReport;
use crate::types::PollerError;

/// Anything that can produce one status report per call.
#[async_trait]
pub trait StatusSource: Send + Sync {
    async fn fetch(&self) -> Result<StatusReport, PollerError>;
}
