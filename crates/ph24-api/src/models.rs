//! Typed views over PH24 response bodies
//!
//! The API is inconsistent about identifier keys (`id` vs `uuid`, `flavorId`
//! vs `id`, ...) and about whether ids are strings or numbers, so identifiers
//! are kept as raw JSON values and resolved through accessor methods.

use crate::action::ServerAction;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Render a JSON scalar identifier as a string; empty strings count as absent
pub(crate) fn id_string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn first_id(candidates: &[&Option<Value>]) -> Option<String> {
    candidates.iter().find_map(|v| id_string(v.as_ref()))
}

/// A project, network or firewall: anything identified by `id` or `uuid`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Resource {
    id: Option<Value>,
    uuid: Option<Value>,
    pub name: Option<String>,
}

impl Resource {
    pub fn id(&self) -> Option<String> {
        first_id(&[&self.id, &self.uuid])
    }
}

pub type Project = Resource;
pub type Network = Resource;
pub type Firewall = Resource;

/// Instance flavor (hardware template)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Flavor {
    flavor_id: Option<Value>,
    id: Option<Value>,
    pub name: Option<String>,
    pub label: Option<String>,
    pub meta: Option<FlavorMeta>,
}

impl Flavor {
    pub fn id(&self) -> Option<String> {
        first_id(&[&self.flavor_id, &self.id])
    }

    pub fn display_name(&self) -> Option<String> {
        self.name
            .clone()
            .or_else(|| self.label.clone())
            .or_else(|| self.id())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FlavorMeta {
    pub cores: Option<Value>,
    pub memory: Option<Value>,
    pub swap: Option<Value>,
    pub disk: Option<Value>,
}

/// Data-center location
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AvailabilityZone {
    identifier: Option<Value>,
    id: Option<Value>,
    pub name: Option<String>,
    pub available: Option<bool>,
}

impl AvailabilityZone {
    pub fn id(&self) -> Option<String> {
        first_id(&[&self.identifier, &self.id])
    }
}

/// OS image of a project
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Image {
    id: Option<Value>,
    image_id: Option<Value>,
    pub name: Option<String>,
    pub label: Option<String>,
    pub distro: Option<String>,
    pub architecture: Option<String>,
}

impl Image {
    pub fn id(&self) -> Option<String> {
        first_id(&[&self.id, &self.image_id])
    }

    pub fn display_name(&self) -> Option<String> {
        self.name
            .clone()
            .or_else(|| self.label.clone())
            .or_else(|| self.id())
    }
}

/// Virtual server as returned by the server endpoints
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Server {
    id: Option<Value>,
    uuid: Option<Value>,
    pub name: Option<String>,
    pub status: Option<String>,
    pub power_state: Option<String>,
    pub ip_addresses: Option<Vec<Value>>,
    flavor_id: Option<Value>,
    pub flavor: Option<Flavor>,
    pub image: Option<Image>,
    pub availability_zone: Option<String>,
    pub created_at: Option<Value>,
}

impl Server {
    pub fn id(&self) -> Option<String> {
        first_id(&[&self.id, &self.uuid])
    }

    pub fn flavor_id(&self) -> Option<String> {
        first_id(&[&self.flavor_id])
    }

    /// IP addresses that are plain strings
    pub fn ip_address_strings(&self) -> Vec<String> {
        self.ip_addresses
            .iter()
            .flatten()
            .filter_map(|ip| ip.as_str().map(str::to_string))
            .collect()
    }

    /// `ipAddresses` re-encoded as a JSON array string (`[]` when absent)
    pub fn ip_addresses_json(&self) -> String {
        let ips = self.ip_addresses.clone().unwrap_or_default();
        Value::Array(ips).to_string()
    }

    /// `createdAt` as a unix timestamp when the API sent a number
    pub fn created_at_timestamp(&self) -> Option<i64> {
        match self.created_at.as_ref()? {
            Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
            Value::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        }
    }
}

// ============ Request bodies ============

#[derive(Debug, Clone, Serialize)]
pub struct NamedResourceRequest {
    pub name: String,
}

/// Body of `POST /v1/cloud/project/{id}/server`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateServerRequest {
    pub name: String,
    pub flavor_id: String,
    pub availability_zone: Option<String>,
    pub image_id: String,
    pub network_ids: Vec<String>,
    pub firewall_ids: Vec<String>,
    pub count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facility_id: Option<String>,
}

/// Body of `PUT /v1/cloud/project/{id}/server/{id}`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UpdateServerRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Body of `POST /v1/cloud/project/{id}/server/{id}/action`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServerActionRequest {
    pub action: ServerAction,
    #[serde(rename = "flavorId", skip_serializing_if = "Option::is_none")]
    pub flavor_id: Option<String>,
}
