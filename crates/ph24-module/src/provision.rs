//! Service provisioning
//!
//! Order of operations for an active service:
//!
//! 1. validate hostname, flavor and OS image (no remote call yet)
//! 2. resolve the project: master project, stored customer project, or a new
//!    one named from the row's template (bootstrapped with a default network
//!    and firewall when empty)
//! 3. attach the first network and firewall of the project
//! 4. create the server and return the service metadata
//!
//! A project created for a customer is kept even when server creation fails,
//! so a retry reuses it.

use crate::catalog::validate_hostname;
use crate::error::{ModuleError, RemoteFailure, Result};
use crate::host::{CLIENT_PROJECT_KEY, Host, LogDirection};
use crate::model::{
    MetaField, ModuleRow, OrderRequest, Package, ServiceFields, ServiceStatus,
};
use crate::module::Ph24Module;
use crate::password::{ROOT_PASSWORD_LENGTH, generate_password};
use ph24_api::{ApiResponse, CreateServerRequest, Firewall, Network, Ph24Client, Server};
use serde_json::Value;

pub const DEFAULT_NETWORK_NAME: &str = "default-network";
pub const DEFAULT_FIREWALL_NAME: &str = "default-firewall";

fn is_empty_list(response: &ApiResponse) -> bool {
    response.is_success()
        && response
            .json()
            .and_then(Value::as_array)
            .is_some_and(|items| items.is_empty())
}

impl<H: Host> Ph24Module<H> {
    pub(crate) async fn provision(
        &self,
        row: &ModuleRow,
        package: &Package,
        vars: &OrderRequest,
        status: ServiceStatus,
    ) -> Result<ServiceFields> {
        if status != ServiceStatus::Active {
            tracing::debug!("Service status is {}, deferring provisioning", status);
            return Ok(ServiceFields::from(vec![MetaField::plain(
                "hostname",
                vars.hostname.trim(),
            )]));
        }

        validate_hostname(&vars.hostname)?;
        let hostname = vars.hostname.trim();

        let flavor_id = package.meta.flavor_id.trim();
        if flavor_id.is_empty() {
            return Err(ModuleError::FlavorMissing);
        }
        let image_id = vars.image_id().ok_or(ModuleError::ImageMissing)?;

        let api = self.api(row)?;
        let project_id = self.resolve_project(&api, row, &vars.client_id).await?;
        let (network_ids, firewall_ids) = self.attachments(&api, &project_id).await?;

        let request = CreateServerRequest {
            name: hostname.to_string(),
            flavor_id: flavor_id.to_string(),
            availability_zone: vars.availability_zone(&package.meta),
            image_id: image_id.clone(),
            network_ids,
            firewall_ids,
            count: 1,
            facility_id: vars.facility_id(&package.meta),
        };
        let root_password = generate_password(ROOT_PASSWORD_LENGTH);

        tracing::info!("Creating server {} in project {}", hostname, project_id);
        let payload = serde_json::to_value(&request).unwrap_or_default();
        self.log_call(&api, "server-create", &payload, LogDirection::Input, true);

        let response = api.create_server(&project_id, &request).await;
        let success = response.is_success();
        self.log_call(
            &api,
            "server-create",
            &response.data_value(),
            LogDirection::Output,
            success,
        );

        if !success {
            tracing::error!(
                "Server creation failed for {} (status {})",
                hostname,
                response.code
            );
            return Err(ModuleError::ServerCreate(RemoteFailure::from_response(
                &response,
            )));
        }

        let server_id = response.resource_id().ok_or(ModuleError::ServerIdMissing)?;
        let server: Server = response.parse().unwrap_or_default();
        tracing::info!("Server {} created as {}", hostname, server_id);

        Ok(ServiceFields::from(vec![
            MetaField::plain("server_id", server_id),
            MetaField::plain("hostname", hostname),
            MetaField::plain("project_id", &project_id),
            MetaField::plain("ip_addresses", server.ip_addresses_json()),
            MetaField::encrypted("password", root_password),
            MetaField::plain(
                "flavor_id",
                server.flavor_id().unwrap_or_else(|| flavor_id.to_string()),
            ),
            MetaField::plain("image_id", image_id),
            MetaField::plain(
                "status",
                server.status.clone().unwrap_or_else(|| "ACTIVE".to_string()),
            ),
            MetaField::plain(
                "power_state",
                server
                    .power_state
                    .clone()
                    .unwrap_or_else(|| "RUNNING".to_string()),
            ),
        ]))
    }

    /// Project that will own the server
    async fn resolve_project(
        &self,
        api: &Ph24Client,
        row: &ModuleRow,
        client_id: &str,
    ) -> Result<String> {
        if let Some(master) = row.meta.master_project() {
            tracing::debug!("Using master project {} for client {}", master, client_id);
            return Ok(master.to_string());
        }

        let client_id = client_id.trim();
        if client_id.is_empty() {
            return Err(ModuleError::ClientIdMissing);
        }

        // Held across read-or-create so concurrent first orders of one
        // customer in this process create a single project.
        let lock = self.project_lock(client_id);
        let guard = lock.lock().await;
        let project = self.customer_project(api, row, client_id).await;
        drop(guard);
        self.release_project_lock(client_id, lock);
        project
    }

    /// Stored project of `client_id`, created and bootstrapped on first use
    async fn customer_project(
        &self,
        api: &Ph24Client,
        row: &ModuleRow,
        client_id: &str,
    ) -> Result<String> {
        let stored = self
            .host()
            .client_meta(client_id, CLIENT_PROJECT_KEY)
            .await?
            .filter(|id| !id.trim().is_empty());
        if let Some(project_id) = stored {
            tracing::debug!("Reusing project {} for client {}", project_id, client_id);
            return Ok(project_id);
        }

        let name = row.meta.project_name(client_id);
        tracing::info!("Creating project {} for client {}", name, client_id);

        let response = api.create_project(&name).await;
        if !response.is_success() {
            tracing::error!(
                "Project creation failed for {} (status {}): {:?}",
                name,
                response.code,
                response.data
            );
            return Err(ModuleError::ProjectCreate(RemoteFailure::from_response(
                &response,
            )));
        }

        let project_id = response.resource_id().ok_or(ModuleError::ProjectIdMissing)?;
        self.host()
            .set_client_meta(
                client_id,
                &[MetaField::plain(CLIENT_PROJECT_KEY, &project_id)],
            )
            .await?;

        self.bootstrap_project(api, &project_id).await;
        Ok(project_id)
    }

    /// Create a default network and firewall in a fresh project that has none
    async fn bootstrap_project(&self, api: &Ph24Client, project_id: &str) {
        if is_empty_list(&api.networks(project_id).await) {
            tracing::info!("Creating {} in project {}", DEFAULT_NETWORK_NAME, project_id);
            let created = api.create_network(project_id, DEFAULT_NETWORK_NAME).await;
            if !created.is_success() {
                tracing::warn!(
                    "Could not create {} in project {} (status {})",
                    DEFAULT_NETWORK_NAME,
                    project_id,
                    created.code
                );
            }
        }

        if is_empty_list(&api.firewalls(project_id).await) {
            tracing::info!("Creating {} in project {}", DEFAULT_FIREWALL_NAME, project_id);
            let created = api.create_firewall(project_id, DEFAULT_FIREWALL_NAME).await;
            if !created.is_success() {
                tracing::warn!(
                    "Could not create {} in project {} (status {})",
                    DEFAULT_FIREWALL_NAME,
                    project_id,
                    created.code
                );
            }
        }
    }

    /// First network and first firewall of the project
    async fn attachments(
        &self,
        api: &Ph24Client,
        project_id: &str,
    ) -> Result<(Vec<String>, Vec<String>)> {
        let networks = api.networks(project_id).await;
        if !networks.is_success() {
            return Err(ModuleError::NetworksFetch(RemoteFailure::from_response(
                &networks,
            )));
        }

        let firewalls = api.firewalls(project_id).await;
        if !firewalls.is_success() {
            return Err(ModuleError::FirewallsFetch(RemoteFailure::from_response(
                &firewalls,
            )));
        }

        let networks: Vec<Network> = networks.list().unwrap_or_default();
        let firewalls: Vec<Firewall> = firewalls.list().unwrap_or_default();
        if networks.is_empty() && firewalls.is_empty() {
            return Err(ModuleError::NoResources);
        }

        let network_ids = networks.first().and_then(Network::id).into_iter().collect();
        let firewall_ids = firewalls
            .first()
            .and_then(Firewall::id)
            .into_iter()
            .collect();
        Ok((network_ids, firewall_ids))
    }
}
