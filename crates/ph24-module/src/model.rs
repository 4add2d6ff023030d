//! Module rows, packages, services and their metadata

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

pub const DEFAULT_PROJECT_NAME_TEMPLATE: &str = "cust-{id}";

/// Key/value metadata triple persisted by the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaField {
    pub key: String,
    pub value: String,
    #[serde(default)]
    pub encrypted: bool,
}

impl MetaField {
    pub fn plain(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            encrypted: false,
        }
    }

    pub fn encrypted(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            encrypted: true,
        }
    }
}

/// Ordered set of service metadata fields
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceFields(Vec<MetaField>);

impl ServiceFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of the first field named `key`; empty values count as absent
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|f| f.key == key)
            .map(|f| f.value.as_str())
            .filter(|v| !v.is_empty())
    }

    pub fn push(&mut self, field: MetaField) {
        self.0.push(field);
    }

    /// Insert or replace fields by key, updating the field `get` reads
    pub fn merge(&mut self, fields: &[MetaField]) {
        for field in fields {
            match self.0.iter_mut().find(|f| f.key == field.key) {
                Some(existing) => *existing = field.clone(),
                None => self.0.push(field.clone()),
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &MetaField> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_vec(self) -> Vec<MetaField> {
        self.0
    }
}

impl From<Vec<MetaField>> for ServiceFields {
    fn from(fields: Vec<MetaField>) -> Self {
        Self(fields)
    }
}

/// API connection profile configured by an administrator
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    pub account_name: String,
    pub api_url: String,
    pub api_key: String,
    pub project_name_template: String,
    pub master_project_id: Option<String>,
    pub use_master_project: bool,
    /// Skip the live credentials check when saving; never persisted
    #[serde(skip_serializing)]
    pub skip_validation: bool,
}

impl ConnectionConfig {
    /// Shared project id when master-project mode is enabled and configured
    pub fn master_project(&self) -> Option<&str> {
        if !self.use_master_project {
            return None;
        }
        self.master_project_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }

    /// Project name for a customer: `{id}` in the template is replaced by the
    /// customer id
    pub fn project_name(&self, client_id: &str) -> String {
        let template = if self.project_name_template.trim().is_empty() {
            DEFAULT_PROJECT_NAME_TEMPLATE
        } else {
            self.project_name_template.as_str()
        };
        template.replace("{id}", client_id)
    }

    /// Metadata triples stored for the row
    pub fn to_meta(&self) -> Vec<MetaField> {
        vec![
            MetaField::plain("account_name", &self.account_name),
            MetaField::plain("api_url", &self.api_url),
            MetaField::encrypted("api_key", &self.api_key),
            MetaField::plain("project_name_template", &self.project_name_template),
            MetaField::plain(
                "master_project_id",
                self.master_project_id.clone().unwrap_or_default(),
            ),
            MetaField::plain(
                "use_master_project",
                if self.use_master_project { "1" } else { "0" },
            ),
        ]
    }

    /// Rebuild a config from stored metadata
    pub fn from_meta(fields: &[MetaField]) -> Self {
        let mut config = Self::default();
        for field in fields {
            match field.key.as_str() {
                "account_name" => config.account_name = field.value.clone(),
                "api_url" => config.api_url = field.value.clone(),
                "api_key" => config.api_key = field.value.clone(),
                "project_name_template" => config.project_name_template = field.value.clone(),
                "master_project_id" => {
                    config.master_project_id =
                        Some(field.value.clone()).filter(|v| !v.is_empty())
                }
                "use_master_project" => config.use_master_project = is_truthy(&field.value),
                _ => {}
            }
        }
        config
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// A configured connection row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleRow {
    pub id: String,
    pub meta: ConnectionConfig,
}

/// Package-level defaults
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageMeta {
    pub flavor_id: String,
    pub availability_zone: Option<String>,
    pub facility_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    pub id: String,
    pub meta: PackageMeta,
}

/// Posted package form. Values may arrive under `meta` or at the top level;
/// `meta` wins.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageInput {
    pub meta: BTreeMap<String, String>,
    #[serde(flatten)]
    pub fields: BTreeMap<String, String>,
}

impl PackageInput {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.meta
            .get(key)
            .or_else(|| self.fields.get(key))
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }
}

/// Service status as decided by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceStatus {
    Pending,
    Active,
    Suspended,
    Canceled,
}

impl std::fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceStatus::Pending => write!(f, "pending"),
            ServiceStatus::Active => write!(f, "active"),
            ServiceStatus::Suspended => write!(f, "suspended"),
            ServiceStatus::Canceled => write!(f, "canceled"),
        }
    }
}

impl FromStr for ServiceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(ServiceStatus::Pending),
            "active" => Ok(ServiceStatus::Active),
            "suspended" => Ok(ServiceStatus::Suspended),
            "canceled" | "cancelled" => Ok(ServiceStatus::Canceled),
            other => Err(format!("unknown service status: {}", other)),
        }
    }
}

/// A provisioned (or pending) service
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    pub id: String,
    pub client_id: String,
    #[serde(default)]
    pub fields: ServiceFields,
}

impl Service {
    /// Stored `(project_id, server_id)`; a server id without its project is
    /// treated as absent
    pub fn server_ref(&self) -> Option<(&str, &str)> {
        Some((self.fields.get("project_id")?, self.fields.get("server_id")?))
    }
}

/// Order-time input for adding a service
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderRequest {
    pub client_id: String,
    pub hostname: String,
    /// Configurable options keyed by option name
    pub configoptions: BTreeMap<String, String>,
    #[serde(rename = "ph24_operating_system")]
    pub operating_system: Option<String>,
    #[serde(rename = "ph24_facility")]
    pub facility: Option<String>,
    pub facility_id: Option<String>,
    pub availability_zone: Option<String>,
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl OrderRequest {
    fn config_option(&self, needle: &str) -> Option<String> {
        self.configoptions
            .iter()
            .filter(|(name, _)| name.to_lowercase().contains(needle))
            .filter_map(|(_, value)| non_empty(Some(value)))
            .last()
    }

    /// OS image: configurable option first, then the posted field
    pub fn image_id(&self) -> Option<String> {
        self.config_option("operating_system")
            .or_else(|| non_empty(self.operating_system.as_ref()))
    }

    /// Facility: configurable option, posted fields, then the package default
    pub fn facility_id(&self, package: &PackageMeta) -> Option<String> {
        self.config_option("facility")
            .or_else(|| non_empty(self.facility.as_ref()))
            .or_else(|| non_empty(self.facility_id.as_ref()))
            .or_else(|| non_empty(package.facility_id.as_ref()))
    }

    /// Availability zone: order-time choice, then the package default
    pub fn availability_zone(&self, package: &PackageMeta) -> Option<String> {
        non_empty(self.availability_zone.as_ref())
            .or_else(|| non_empty(package.availability_zone.as_ref()))
    }
}

/// Posted interactive action from the service overview
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientActionRequest {
    #[serde(rename = "ph24_action")]
    pub action: String,
    pub new_hostname: Option<String>,
}
