//! Provisioning module error types
//!
//! Display strings are the messages shown to administrators and customers.

use ph24_api::{ApiError, ApiResponse};
use thiserror::Error;

/// Error reported by a [`crate::Host`] collaborator
#[derive(Error, Debug)]
pub enum HostError {
    #[error("Metadata storage failed: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Broad class of a [`ModuleError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Network/TLS failure, no HTTP status received
    Transport,
    /// Remote answered with a non-2xx status
    Protocol,
    /// Remote answered 2xx but without an expected field
    Contract,
    /// Missing or malformed user input
    Validation,
    /// Local failure (client construction, host storage)
    Internal,
}

/// Remote failure details: status plus the text appended to the headline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFailure {
    pub code: u16,
    pub detail: String,
}

impl RemoteFailure {
    pub fn from_response(response: &ApiResponse) -> Self {
        Self {
            code: response.code,
            detail: response.failure_detail(),
        }
    }
}

impl std::fmt::Display for RemoteFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.detail)
    }
}

#[derive(Error, Debug)]
pub enum ModuleError {
    // ===== module row =====
    #[error("Please enter an account name.")]
    AccountNameEmpty,

    #[error("Please enter an API URL.")]
    ApiUrlEmpty,

    #[error("The API URL is not valid.")]
    ApiUrlInvalid,

    #[error("Please enter an API key.")]
    ApiKeyEmpty,

    #[error("The API connection could not be established. Please verify your API key and URL.")]
    ApiKeyInvalid,

    #[error("Please enter a project name template.")]
    ProjectNameTemplateEmpty,

    // ===== package / order input =====
    #[error("Please select a plan/flavor.")]
    FlavorMissing,

    #[error("The hostname must be a valid domain name or IP address.")]
    HostnameFormat,

    #[error("Please enter a hostname.")]
    HostnameRequired,

    #[error("No OS template selected. Please select an operating system.")]
    ImageMissing,

    #[error("A client ID is required to provision a service.")]
    ClientIdMissing,

    // ===== remote =====
    #[error("Failed to create project{0}")]
    ProjectCreate(RemoteFailure),

    #[error("Project was created but no project ID was returned.")]
    ProjectIdMissing,

    #[error("Failed to retrieve networks from the project{0}")]
    NetworksFetch(RemoteFailure),

    #[error("Failed to retrieve firewalls from the project{0}")]
    FirewallsFetch(RemoteFailure),

    #[error(
        "No networks or firewalls are available in the project. Please configure these resources in the PH24 Cloud dashboard first."
    )]
    NoResources,

    #[error("Failed to create server{0}")]
    ServerCreate(RemoteFailure),

    #[error("Server was created but no server ID was returned.")]
    ServerIdMissing,

    #[error("Failed to delete server{0}")]
    ServerDelete(RemoteFailure),

    #[error("Failed to suspend server{0}")]
    ServerSuspend(RemoteFailure),

    #[error("Failed to unsuspend server{0}")]
    ServerUnsuspend(RemoteFailure),

    // ===== local =====
    #[error("API client error: {0}")]
    Client(#[from] ApiError),

    #[error("Host error: {0}")]
    Host(#[from] HostError),
}

impl ModuleError {
    /// Input field the host should attach this error to
    pub fn field(&self) -> &'static str {
        match self {
            ModuleError::AccountNameEmpty => "account_name",
            ModuleError::ApiUrlEmpty | ModuleError::ApiUrlInvalid => "api_url",
            ModuleError::ApiKeyEmpty | ModuleError::ApiKeyInvalid => "api_key",
            ModuleError::ProjectNameTemplateEmpty => "project_name_template",
            ModuleError::FlavorMissing => "flavor_id",
            ModuleError::HostnameFormat | ModuleError::HostnameRequired => "hostname",
            _ => "api",
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ModuleError::ProjectCreate(failure)
            | ModuleError::NetworksFetch(failure)
            | ModuleError::FirewallsFetch(failure)
            | ModuleError::ServerCreate(failure)
            | ModuleError::ServerDelete(failure)
            | ModuleError::ServerSuspend(failure)
            | ModuleError::ServerUnsuspend(failure) => {
                if failure.code == 0 {
                    ErrorKind::Transport
                } else {
                    ErrorKind::Protocol
                }
            }
            ModuleError::ProjectIdMissing
            | ModuleError::ServerIdMissing
            | ModuleError::NoResources => ErrorKind::Contract,
            ModuleError::Client(_) | ModuleError::Host(_) => ErrorKind::Internal,
            _ => ErrorKind::Validation,
        }
    }
}

pub type Result<T> = std::result::Result<T, ModuleError>;
