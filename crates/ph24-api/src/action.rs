//! Server power and lifecycle actions

use crate::error::ApiError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Action accepted by the `/server/{id}/action` endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServerAction {
    Start,
    Stop,
    Reboot,
    ForceReboot,
    /// Requires a target flavor id
    Rescale,
    Rebuild,
}

impl ServerAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServerAction::Start => "START",
            ServerAction::Stop => "STOP",
            ServerAction::Reboot => "REBOOT",
            ServerAction::ForceReboot => "FORCE_REBOOT",
            ServerAction::Rescale => "RESCALE",
            ServerAction::Rebuild => "REBUILD",
        }
    }

    /// Slug used in host log endpoints, e.g. `server-action-stop`
    pub fn log_slug(&self) -> String {
        format!("server-action-{}", self.as_str().to_lowercase().replace('_', "-"))
    }
}

impl std::fmt::Display for ServerAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ServerAction {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "START" => Ok(ServerAction::Start),
            "STOP" => Ok(ServerAction::Stop),
            "REBOOT" => Ok(ServerAction::Reboot),
            "FORCE_REBOOT" => Ok(ServerAction::ForceReboot),
            "RESCALE" => Ok(ServerAction::Rescale),
            "REBUILD" => Ok(ServerAction::Rebuild),
            other => Err(ApiError::UnknownAction(other.to_string())),
        }
    }
}
