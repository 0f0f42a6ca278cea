use serde::Serialize;

/// Secondary health signal reported next to `updating`.
///
/// The meaning depends on the plugin build: `Running` means the daemon process
/// is up, `Success` means its last build/update finished cleanly. Both are
/// read the same way when deriving failure.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HealthSignal {
    Running(bool),
    Success(bool),
}

impl Default for HealthSignal {
    fn default() -> Self {
        HealthSignal::Running(false)
    }
}

impl HealthSignal {
    pub fn is_set(self) -> bool {
        match self {
            HealthSignal::Running(flag) | HealthSignal::Success(flag) => flag,
        }
    }

    /// Wire name of the field the signal came from.
    pub fn field(self) -> &'static str {
        match self {
            HealthSignal::Running(_) => "running",
            HealthSignal::Success(_) => "success",
        }
    }

    pub(crate) fn from_field(field: &str, flag: bool) -> Option<Self> {
        match field {
            "running" => Some(HealthSignal::Running(flag)),
            "success" => Some(HealthSignal::Success(flag)),
            _ => None,
        }
    }
}
