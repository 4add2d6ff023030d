//! PH24 Cloud provisioning module
//!
//! Translates billing-host lifecycle events into PH24 API calls:
//!
//! - [`ProvisioningModule::add_service`]: resolve or create the customer's
//!   project, attach a network and firewall, create the server
//! - cancel / suspend / unsuspend: delete, stop and start the stored server
//! - [`ProvisioningModule::client_actions`]: power actions, hostname changes
//!   and the live status overview
//!
//! The billing platform is reached only through the [`Host`] trait
//! (metadata storage and the module log).

pub mod catalog;
pub mod error;
pub mod fields;
pub mod host;
mod lifecycle;
pub mod model;
pub mod module;
pub mod overview;
pub mod password;
pub mod provision;
pub mod status;

pub use catalog::validate_hostname;
pub use error::{ErrorKind, HostError, ModuleError, RemoteFailure, Result};
pub use fields::{Field, FieldKind, ModuleFields, SelectOption};
pub use host::{CLIENT_PROJECT_KEY, Host, LogDirection};
pub use model::{
    ClientActionRequest, ConnectionConfig, MetaField, ModuleRow, OrderRequest, Package,
    PackageInput, PackageMeta, Service, ServiceFields, ServiceStatus,
};
pub use module::{Ph24Module, ProvisioningModule, Tab};
pub use overview::{ServerDetails, ServerOverview, ServerSpecs};
pub use status::PowerStatus;
