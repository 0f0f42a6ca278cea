use serde::Serialize;
use serde_json::Value;

use crate::config::Protocol;
use crate::stepd_client::api::{nullable_bool, required_str, SETTINGS_FIELD, SIGNAL_FIELDS};
use crate::types::PollerError;

use super::HealthSignal;

/// One normalized status response from the stepd plugin endpoint.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct StatusReport {
    pub status: String,
    pub updating: bool,
    pub signal: HealthSignal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings: Option<Value>,
}

impl StatusReport {
    /// Normalizes a raw payload. Either secondary field name is folded into
    /// [`HealthSignal`] here so nothing downstream cares which one was sent.
    pub fn from_value(value: &Value, protocol: Protocol) -> Result<Self, PollerError> {
        let object = value
            .as_object()
            .ok_or_else(|| PollerError::Malformed(format!("expected a JSON object, got {value}")))?;

        let status = required_str(object, "status")?.to_string();
        let updating = nullable_bool(object, "updating")?
            .ok_or_else(|| PollerError::Malformed("missing `updating` field".to_string()))?;

        let candidates: &[&str] = match protocol {
            Protocol::Auto => &SIGNAL_FIELDS,
            Protocol::Running => &["running"],
            Protocol::Success => &["success"],
        };
        let mut signal = None;
        for field in candidates {
            if let Some(flag) = nullable_bool(object, field)? {
                signal = HealthSignal::from_field(field, flag);
                break;
            }
        }
        let signal = signal.ok_or_else(|| {
            PollerError::Malformed(format!(
                "missing secondary signal (expected one of {})",
                candidates.join(", ")
            ))
        })?;

        let settings = object
            .get(SETTINGS_FIELD)
            .filter(|settings| !settings.is_null())
            .cloned();

        Ok(Self {
            status,
            updating,
            signal,
            settings,
        })
    }
}
