//! Host platform contract
//!
//! The billing platform owns metadata storage and the module log. The module
//! only talks to it through this trait.

use crate::error::HostError;
use crate::model::MetaField;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Per-customer metadata key holding the customer's project id
pub const CLIENT_PROJECT_KEY: &str = "ph24_project_id";

/// Direction of a module log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogDirection {
    Input,
    Output,
}

impl std::fmt::Display for LogDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogDirection::Input => write!(f, "input"),
            LogDirection::Output => write!(f, "output"),
        }
    }
}

/// Storage and logging services provided by the billing platform
#[async_trait]
pub trait Host: Send + Sync {
    /// Read a per-customer metadata value
    async fn client_meta(&self, client_id: &str, key: &str) -> Result<Option<String>, HostError>;

    /// Write per-customer metadata
    async fn set_client_meta(&self, client_id: &str, fields: &[MetaField])
    -> Result<(), HostError>;

    /// Merge fields into a service's stored metadata
    async fn set_service_fields(
        &self,
        service_id: &str,
        fields: &[MetaField],
    ) -> Result<(), HostError>;

    /// Record a module log entry keyed by `(endpoint, direction, success)`
    fn log(&self, endpoint: &str, payload: &str, direction: LogDirection, success: bool);
}
