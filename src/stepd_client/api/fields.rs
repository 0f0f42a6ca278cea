use serde_json::{Map, Value};

use crate::types::PollerError;

pub const SETTINGS_FIELD: &str = "settings";

/// Field names that have carried the secondary signal, in sniffing order.
pub const SIGNAL_FIELDS: [&str; 2] = ["running", "success"];

pub fn required_str<'a>(object: &'a Map<String, Value>, key: &str) -> Result<&'a str, PollerError> {
    match object.get(key) {
        Some(Value::String(text)) => Ok(text.as_str()),
        Some(other) => Err(PollerError::Malformed(format!(
            "`{key}` must be a string, got {other}"
        ))),
        None => Err(PollerError::Malformed(format!("missing `{key}` field"))),
    }
}

/// Reads a boolean the plugin may report as `null` before its worker thread
/// exists. `null` counts as false; an absent key is `None`.
pub fn nullable_bool(object: &Map<String, Value>, key: &str) -> Result<Option<bool>, PollerError> {
    match object.get(key) {
        Some(Value::Bool(flag)) => Ok(Some(*flag)),
        Some(Value::Null) => Ok(Some(false)),
        Some(other) => Err(PollerError::Malformed(format!(
            "`{key}` must be a boolean, got {other}"
        ))),
        None => Ok(None),
    }
}
