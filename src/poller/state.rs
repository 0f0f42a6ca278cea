use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::stepd_client::{HealthSignal, StatusReport};

pub const AWAITING_STATUS: &str = "Waiting for status update";

/// Last known daemon state as seen by the poller.
///
/// Replaced as a whole from each successful response. `updating` starts out
/// `true` so nothing reads as failed before the first response arrives.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct PollState {
    pub status: String,
    pub updating: bool,
    pub signal: HealthSignal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_update: Option<DateTime<Utc>>,
}

impl Default for PollState {
    fn default() -> Self {
        Self {
            status: AWAITING_STATUS.to_string(),
            updating: true,
            signal: HealthSignal::default(),
            settings: None,
            last_update: None,
        }
    }
}

impl PollState {
    pub(crate) fn from_report(report: StatusReport, received_at: DateTime<Utc>) -> Self {
        Self {
            status: report.status,
            updating: report.updating,
            signal: report.signal,
            settings: report.settings,
            last_update: Some(received_at),
        }
    }

    /// Neither updating nor reporting healthy.
    pub fn failed(&self) -> bool {
        !self.updating && !self.signal.is_set()
    }

    /// Whether the displayed fields differ, ignoring settings and timestamps.
    pub fn display_differs(&self, other: &PollState) -> bool {
        self.status != other.status
            || self.updating != other.updating
            || self.signal != other.signal
    }
}
