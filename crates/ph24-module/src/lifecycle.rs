//! Cancel, suspend and unsuspend
//!
//! All three need the stored `project_id` and `server_id`; a service without
//! them never reached the provider and is left alone.

use crate::error::{ModuleError, RemoteFailure, Result};
use crate::host::{Host, LogDirection};
use crate::model::{ModuleRow, Service};
use crate::module::Ph24Module;
use ph24_api::{ApiResponse, Ph24Client, ServerAction};
use serde_json::json;

impl<H: Host> Ph24Module<H> {
    pub(crate) async fn delete_server(&self, row: &ModuleRow, service: &Service) -> Result<()> {
        let Some((project_id, server_id)) = service.server_ref() else {
            tracing::debug!("Service {} has no server, nothing to cancel", service.id);
            return Ok(());
        };

        let api = self.api(row)?;
        tracing::info!("Deleting server {} in project {}", server_id, project_id);
        let response = api.delete_server(project_id, server_id).await;

        self.log_lifecycle(&api, "server-delete", project_id, server_id, &response);
        if !response.is_success() {
            tracing::error!(
                "Server {} delete failed (status {})",
                server_id,
                response.code
            );
            return Err(ModuleError::ServerDelete(RemoteFailure::from_response(
                &response,
            )));
        }
        Ok(())
    }

    pub(crate) async fn stop_server(&self, row: &ModuleRow, service: &Service) -> Result<()> {
        self.power(row, service, ServerAction::Stop, ModuleError::ServerSuspend)
            .await
    }

    pub(crate) async fn start_server(&self, row: &ModuleRow, service: &Service) -> Result<()> {
        self.power(row, service, ServerAction::Start, ModuleError::ServerUnsuspend)
            .await
    }

    async fn power(
        &self,
        row: &ModuleRow,
        service: &Service,
        action: ServerAction,
        failed: fn(RemoteFailure) -> ModuleError,
    ) -> Result<()> {
        let Some((project_id, server_id)) = service.server_ref() else {
            tracing::debug!("Service {} has no server, skipping {}", service.id, action);
            return Ok(());
        };

        let api = self.api(row)?;
        tracing::info!("{} server {} in project {}", action, server_id, project_id);
        let response = api.server_action(project_id, server_id, action, None).await;

        self.log_lifecycle(&api, &action.log_slug(), project_id, server_id, &response);
        if !response.is_success() {
            tracing::error!(
                "{} on server {} failed (status {})",
                action,
                server_id,
                response.code
            );
            return Err(failed(RemoteFailure::from_response(&response)));
        }
        Ok(())
    }

    fn log_lifecycle(
        &self,
        api: &Ph24Client,
        operation: &str,
        project_id: &str,
        server_id: &str,
        response: &ApiResponse,
    ) {
        let request = json!({ "project_id": project_id, "server_id": server_id });
        self.log_call(api, operation, &request, LogDirection::Input, true);
        self.log_call(
            api,
            operation,
            &response.data_value(),
            LogDirection::Output,
            response.is_success(),
        );
    }
}
