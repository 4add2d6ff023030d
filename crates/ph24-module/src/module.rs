//! Lifecycle contract and the PH24 implementation

use crate::error::Result;
use crate::fields::ModuleFields;
use crate::host::{Host, LogDirection};
use crate::model::{
    ClientActionRequest, ConnectionConfig, MetaField, ModuleRow, OrderRequest, Package,
    PackageInput, PackageMeta, Service, ServiceFields, ServiceStatus,
};
use crate::overview::ServerOverview;
use async_trait::async_trait;
use ph24_api::Ph24Client;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Tab shown on a service management page: `(method, title)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tab {
    pub method: &'static str,
    pub title: &'static str,
}

/// Lifecycle events a billing host triggers on a provisioning module
///
/// Every event receives its context (row, package, service, posted input)
/// explicitly; nothing is read from ambient request state.
#[async_trait]
pub trait ProvisioningModule: Send + Sync {
    fn name(&self) -> &str;

    async fn install(&self) -> Result<()> {
        Ok(())
    }

    async fn upgrade(&self, _current_version: &str) -> Result<()> {
        Ok(())
    }

    async fn uninstall(&self, _last_instance: bool) -> Result<()> {
        Ok(())
    }

    fn admin_tabs(&self) -> Vec<Tab>;

    fn client_tabs(&self) -> Vec<Tab>;

    /// Row selection strategies offered for service groups
    fn group_order_options(&self) -> Vec<(&'static str, &'static str)>;

    /// Validate a new connection row and return the metadata to store
    async fn add_module_row(&self, input: &ConnectionConfig) -> Result<Vec<MetaField>>;

    async fn edit_module_row(
        &self,
        row: &ModuleRow,
        input: &ConnectionConfig,
    ) -> Result<Vec<MetaField>>;

    async fn delete_module_row(&self, row: &ModuleRow) -> Result<()>;

    fn add_package(&self, input: &PackageInput) -> Result<Vec<MetaField>>;

    fn edit_package(&self, package: &Package, input: &PackageInput) -> Result<Vec<MetaField>>;

    async fn package_fields(&self, row: Option<&ModuleRow>, current: &PackageMeta)
    -> ModuleFields;

    async fn admin_add_fields(
        &self,
        row: Option<&ModuleRow>,
        package: &Package,
        vars: &OrderRequest,
    ) -> ModuleFields;

    async fn client_add_fields(
        &self,
        row: Option<&ModuleRow>,
        package: &Package,
        vars: &OrderRequest,
    ) -> ModuleFields;

    fn validate_service(&self, package: &Package, vars: &OrderRequest) -> Result<()>;

    /// Provision a service. Remote resources are only created when `status`
    /// is [`ServiceStatus::Active`].
    async fn add_service(
        &self,
        row: &ModuleRow,
        package: &Package,
        vars: &OrderRequest,
        status: ServiceStatus,
    ) -> Result<ServiceFields>;

    /// Delete the remote server. An error is informational: the host may
    /// still mark the service canceled.
    async fn cancel_service(
        &self,
        row: &ModuleRow,
        package: &Package,
        service: &Service,
    ) -> Result<Option<ServiceFields>>;

    async fn suspend_service(
        &self,
        row: &ModuleRow,
        package: &Package,
        service: &Service,
    ) -> Result<Option<ServiceFields>>;

    async fn unsuspend_service(
        &self,
        row: &ModuleRow,
        package: &Package,
        service: &Service,
    ) -> Result<Option<ServiceFields>>;

    /// Customer overview: optionally run a posted action, then read live state
    async fn client_actions(
        &self,
        row: Option<&ModuleRow>,
        service: &Service,
        request: Option<&ClientActionRequest>,
    ) -> ServerOverview;
}

/// PH24 Cloud provisioning module
pub struct Ph24Module<H: Host> {
    host: H,
    /// Serializes read-or-create of per-customer projects within this process
    project_locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl<H: Host> Ph24Module<H> {
    pub fn new(host: H) -> Self {
        Self {
            host,
            project_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub(crate) fn api(&self, row: &ModuleRow) -> Result<Ph24Client> {
        Ok(Ph24Client::new(&row.meta.api_key, Some(&row.meta.api_url))?)
    }

    pub(crate) fn project_lock(&self, client_id: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self
            .project_locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        locks.entry(client_id.to_string()).or_default().clone()
    }

    /// Forget the lock of `client_id` once no other caller holds a clone
    pub(crate) fn release_project_lock(&self, client_id: &str, lock: Arc<tokio::sync::Mutex<()>>) {
        let mut locks = self
            .project_locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let unused = locks
            .get(client_id)
            .is_some_and(|tracked| Arc::ptr_eq(tracked, &lock) && Arc::strong_count(&lock) == 2);
        if unused {
            locks.remove(client_id);
        }
    }

    /// Write a host log entry for `<api_url>|<operation>`
    pub(crate) fn log_call(
        &self,
        api: &Ph24Client,
        operation: &str,
        payload: &serde_json::Value,
        direction: LogDirection,
        success: bool,
    ) {
        let endpoint = format!("{}|{}", api.base_url(), operation);
        self.host
            .log(&endpoint, &payload.to_string(), direction, success);
    }
}

#[async_trait]
impl<H: Host> ProvisioningModule for Ph24Module<H> {
    fn name(&self) -> &str {
        "PH24 Cloud"
    }

    fn admin_tabs(&self) -> Vec<Tab> {
        vec![
            Tab {
                method: "tabActions",
                title: "Server Actions",
            },
            Tab {
                method: "tabStats",
                title: "Server Statistics",
            },
        ]
    }

    fn client_tabs(&self) -> Vec<Tab> {
        vec![
            Tab {
                method: "tabClientActions",
                title: "Actions",
            },
            Tab {
                method: "tabClientStats",
                title: "Statistics",
            },
        ]
    }

    fn group_order_options(&self) -> Vec<(&'static str, &'static str)> {
        vec![("first", "First Available Server")]
    }

    async fn add_module_row(&self, input: &ConnectionConfig) -> Result<Vec<MetaField>> {
        self.validate_row(input).await?;
        Ok(input.to_meta())
    }

    async fn edit_module_row(
        &self,
        _row: &ModuleRow,
        input: &ConnectionConfig,
    ) -> Result<Vec<MetaField>> {
        self.validate_row(input).await?;
        Ok(input.to_meta())
    }

    async fn delete_module_row(&self, row: &ModuleRow) -> Result<()> {
        tracing::debug!("Module row {} removed, nothing to clean up remotely", row.id);
        Ok(())
    }

    fn add_package(&self, input: &PackageInput) -> Result<Vec<MetaField>> {
        self.package_meta(input)
    }

    fn edit_package(&self, _package: &Package, input: &PackageInput) -> Result<Vec<MetaField>> {
        self.package_meta(input)
    }

    async fn package_fields(
        &self,
        row: Option<&ModuleRow>,
        current: &PackageMeta,
    ) -> ModuleFields {
        self.render_package_fields(row, current).await
    }

    async fn admin_add_fields(
        &self,
        row: Option<&ModuleRow>,
        _package: &Package,
        vars: &OrderRequest,
    ) -> ModuleFields {
        self.render_order_fields(row, vars).await
    }

    async fn client_add_fields(
        &self,
        row: Option<&ModuleRow>,
        _package: &Package,
        vars: &OrderRequest,
    ) -> ModuleFields {
        self.render_order_fields(row, vars).await
    }

    fn validate_service(&self, _package: &Package, vars: &OrderRequest) -> Result<()> {
        crate::catalog::validate_hostname(&vars.hostname)
    }

    async fn add_service(
        &self,
        row: &ModuleRow,
        package: &Package,
        vars: &OrderRequest,
        status: ServiceStatus,
    ) -> Result<ServiceFields> {
        self.provision(row, package, vars, status).await
    }

    async fn cancel_service(
        &self,
        row: &ModuleRow,
        _package: &Package,
        service: &Service,
    ) -> Result<Option<ServiceFields>> {
        self.delete_server(row, service).await?;
        Ok(None)
    }

    async fn suspend_service(
        &self,
        row: &ModuleRow,
        _package: &Package,
        service: &Service,
    ) -> Result<Option<ServiceFields>> {
        self.stop_server(row, service).await?;
        Ok(None)
    }

    async fn unsuspend_service(
        &self,
        row: &ModuleRow,
        _package: &Package,
        service: &Service,
    ) -> Result<Option<ServiceFields>> {
        self.start_server(row, service).await?;
        Ok(None)
    }

    async fn client_actions(
        &self,
        row: Option<&ModuleRow>,
        service: &Service,
        request: Option<&ClientActionRequest>,
    ) -> ServerOverview {
        self.overview(row, service, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HostError;

    struct NullHost;

    #[async_trait]
    impl Host for NullHost {
        async fn client_meta(&self, _: &str, _: &str) -> std::result::Result<Option<String>, HostError> {
            Ok(None)
        }

        async fn set_client_meta(&self, _: &str, _: &[MetaField]) -> std::result::Result<(), HostError> {
            Ok(())
        }

        async fn set_service_fields(&self, _: &str, _: &[MetaField]) -> std::result::Result<(), HostError> {
            Ok(())
        }

        fn log(&self, _: &str, _: &str, _: LogDirection, _: bool) {}
    }

    fn tracked(module: &Ph24Module<NullHost>) -> usize {
        module.project_locks.lock().unwrap().len()
    }

    #[test]
    fn test_project_lock_is_released_when_unused() {
        let module = Ph24Module::new(NullHost);

        let lock = module.project_lock("1");
        assert_eq!(tracked(&module), 1);
        module.release_project_lock("1", lock);
        assert_eq!(tracked(&module), 0);
    }

    #[test]
    fn test_project_lock_is_kept_while_shared() {
        let module = Ph24Module::new(NullHost);

        let first = module.project_lock("1");
        let second = module.project_lock("1");
        assert!(Arc::ptr_eq(&first, &second));

        module.release_project_lock("1", first);
        assert_eq!(tracked(&module), 1);
        module.release_project_lock("1", second);
        assert_eq!(tracked(&module), 0);
    }
}
