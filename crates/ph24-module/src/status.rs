//! Server power status classification

use serde::{Deserialize, Serialize};

/// Simplified power status shown to customers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerStatus {
    Running,
    Off,
    Unknown,
}

impl PowerStatus {
    /// Classify from the provider's `status`, falling back to `powerState`
    /// when no status was reported.
    ///
    /// Case-insensitive substring match: "run"/"active" → running,
    /// "stop"/"off" → off, anything else → unknown.
    pub fn classify(status: Option<&str>, power_state: Option<&str>) -> Self {
        let text = status.or(power_state).unwrap_or_default().to_lowercase();

        if text.contains("run") || text.contains("active") {
            PowerStatus::Running
        } else if text.contains("stop") || text.contains("off") {
            PowerStatus::Off
        } else {
            PowerStatus::Unknown
        }
    }
}

impl std::fmt::Display for PowerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PowerStatus::Running => write!(f, "running"),
            PowerStatus::Off => write!(f, "off"),
            PowerStatus::Unknown => write!(f, "unknown"),
        }
    }
}
