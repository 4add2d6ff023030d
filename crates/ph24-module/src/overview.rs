//! Customer-facing server overview and interactive actions

use crate::catalog::validate_hostname;
use crate::fields::zone_label;
use crate::host::Host;
use crate::model::{ClientActionRequest, MetaField, ModuleRow, Service};
use crate::module::Ph24Module;
use crate::status::PowerStatus;
use chrono::DateTime;
use ph24_api::{Ph24Client, Server, ServerAction, UpdateServerRequest};
use serde::Serialize;
use serde_json::Value;

pub const CHANGE_HOSTNAME: &str = "CHANGE_HOSTNAME";

pub const MSG_NO_ROW: &str = "No API server is configured for this service.";
pub const MSG_SERVER_NOT_FOUND: &str = "Server details not found for this service.";
pub const MSG_STATUS_UNAVAILABLE: &str = "Unable to retrieve server status at this time.";
pub const MSG_UNEXPECTED: &str = "An unexpected error occurred while performing this action.";
pub const MSG_HOSTNAME_UPDATED: &str = "Hostname updated.";
pub const MSG_HOSTNAME_UPDATE_FAILED: &str = "Failed to update hostname.";

/// Power actions a customer may post
const CUSTOMER_ACTIONS: [ServerAction; 4] = [
    ServerAction::Start,
    ServerAction::Stop,
    ServerAction::Reboot,
    ServerAction::ForceReboot,
];

fn with_detail(headline: String, detail: Option<String>) -> String {
    match detail.filter(|d| !d.trim().is_empty()) {
        Some(detail) => format!("{} {}", headline, detail),
        None => headline,
    }
}

/// Flavor specs of the server
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ServerSpecs {
    pub name: Option<String>,
    pub flavor_id: Option<String>,
    pub cores: Option<Value>,
    pub memory: Option<Value>,
    pub swap: Option<Value>,
    pub disk: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ServerDetails {
    pub id: Option<String>,
    pub name: Option<String>,
    pub flavor_id: Option<String>,
    /// Human label when known, otherwise the raw zone identifier
    pub availability_zone: Option<String>,
    pub status: Option<String>,
    pub power_state: Option<String>,
    pub created_at: Option<Value>,
    /// `%Y-%m-%d %H:%M:%S` (UTC) when `created_at` is numeric
    pub created_at_human: Option<String>,
    pub image_id: Option<String>,
    pub image_name: Option<String>,
    pub image_distro: Option<String>,
    pub image_arch: Option<String>,
}

/// Everything the host needs to render the overview tab
#[derive(Debug, Clone, Default, Serialize)]
pub struct ServerOverview {
    /// Outcome of a posted action, or why live data is missing
    pub message: Option<String>,
    pub hostname: Option<String>,
    pub server: Option<Server>,
    pub status: Option<String>,
    pub power_state: Option<String>,
    pub server_status: Option<PowerStatus>,
    pub ip_addresses: Vec<Value>,
    pub ipv4_address: Option<String>,
    pub ipv6_address: Option<String>,
    pub specs: Option<ServerSpecs>,
    pub details: Option<ServerDetails>,
}

impl ServerOverview {
    fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Fill live fields from a fetched server
    fn apply_server(&mut self, server: Server) {
        self.status = server.status.clone();
        self.power_state = server.power_state.clone();
        self.server_status = Some(PowerStatus::classify(
            server.status.as_deref(),
            server.power_state.as_deref(),
        ));

        for ip in server.ip_address_strings() {
            let slot = if ip.contains(':') {
                &mut self.ipv6_address
            } else {
                &mut self.ipv4_address
            };
            if slot.is_none() {
                *slot = Some(ip);
            }
        }
        self.ip_addresses = server.ip_addresses.clone().unwrap_or_default();

        self.specs = server.flavor.as_ref().map(|flavor| {
            let meta = flavor.meta.clone().unwrap_or_default();
            ServerSpecs {
                name: flavor.name.clone(),
                flavor_id: flavor.id(),
                cores: meta.cores,
                memory: meta.memory,
                swap: meta.swap,
                disk: meta.disk,
            }
        });

        let image = server.image.clone().unwrap_or_default();
        self.details = Some(ServerDetails {
            id: server.id(),
            name: server.name.clone(),
            flavor_id: server.flavor_id(),
            availability_zone: server
                .availability_zone
                .as_deref()
                .map(|zone| zone_label(zone, None)),
            status: server.status.clone(),
            power_state: server.power_state.clone(),
            created_at: server.created_at.clone(),
            created_at_human: server
                .created_at_timestamp()
                .and_then(|ts| DateTime::from_timestamp(ts, 0))
                .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string()),
            image_id: image.id(),
            image_name: image.name.clone(),
            image_distro: image.distro.clone(),
            image_arch: image.architecture.clone(),
        });

        self.server = Some(server);
    }
}

impl<H: Host> Ph24Module<H> {
    pub(crate) async fn overview(
        &self,
        row: Option<&ModuleRow>,
        service: &Service,
        request: Option<&ClientActionRequest>,
    ) -> ServerOverview {
        let mut overview = ServerOverview {
            hostname: service.fields.get("hostname").map(str::to_string),
            ..Default::default()
        };

        let Some(row) = row.filter(|row| !row.meta.api_key.trim().is_empty()) else {
            return overview.with_message(MSG_NO_ROW);
        };
        let api = match self.api(row) {
            Ok(api) => api,
            Err(e) => return overview.with_message(format!("{} {}", MSG_UNEXPECTED, e)),
        };
        let Some((project_id, server_id)) = service.server_ref() else {
            return overview.with_message(MSG_SERVER_NOT_FOUND);
        };

        if let Some(request) = request.filter(|r| !r.action.trim().is_empty()) {
            let message = self
                .dispatch(&api, service, project_id, server_id, request, &mut overview)
                .await;
            overview.message = Some(message);
        }

        let response = api.server(project_id, server_id).await;
        match response.parse::<Server>() {
            Some(server) if response.is_success() => overview.apply_server(server),
            _ => {
                tracing::debug!(
                    "Server {} status unavailable (status {})",
                    server_id,
                    response.code
                );
                if overview.message.is_none() {
                    overview.message = Some(MSG_STATUS_UNAVAILABLE.to_string());
                }
            }
        }

        overview
    }

    /// Run one posted action and return the message to show
    async fn dispatch(
        &self,
        api: &Ph24Client,
        service: &Service,
        project_id: &str,
        server_id: &str,
        request: &ClientActionRequest,
        overview: &mut ServerOverview,
    ) -> String {
        let action = request.action.trim().to_uppercase();

        if action == CHANGE_HOSTNAME {
            let new_hostname = request.new_hostname.as_deref().unwrap_or_default().trim();
            if let Err(e) = validate_hostname(new_hostname) {
                return e.to_string();
            }

            let params = UpdateServerRequest {
                name: Some(new_hostname.to_string()),
            };
            let response = api.update_server(project_id, server_id, &params).await;
            if !response.is_success() {
                return with_detail(MSG_HOSTNAME_UPDATE_FAILED.to_string(), response.message());
            }

            tracing::info!("Server {} renamed to {}", server_id, new_hostname);
            overview.hostname = Some(new_hostname.to_string());
            let stored = self
                .host()
                .set_service_fields(&service.id, &[MetaField::plain("hostname", new_hostname)])
                .await;
            if let Err(e) = stored {
                tracing::warn!(
                    "Hostname of service {} changed remotely but was not saved: {}",
                    service.id,
                    e
                );
            }
            return MSG_HOSTNAME_UPDATED.to_string();
        }

        let failed = format!("Action {} failed.", action);
        let Some(server_action) = action
            .parse::<ServerAction>()
            .ok()
            .filter(|a| CUSTOMER_ACTIONS.contains(a))
        else {
            return format!("{} Unsupported action.", failed);
        };

        let response = api
            .server_action(project_id, server_id, server_action, None)
            .await;
        if response.is_success() {
            tracing::info!("{} accepted for server {}", server_action, server_id);
            format!("Action {} accepted.", server_action)
        } else {
            with_detail(
                failed,
                response.message().or_else(|| {
                    response.transport_message().map(str::to_string)
                }),
            )
        }
    }
}
