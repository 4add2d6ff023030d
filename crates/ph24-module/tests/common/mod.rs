#![allow(dead_code)]

use async_trait::async_trait;
use ph24_module::{
    ConnectionConfig, Host, HostError, LogDirection, MetaField, ModuleRow, Package, PackageMeta,
    Ph24Module, Service, ServiceFields,
};
use std::collections::HashMap;
use std::sync::Mutex;
use wiremock::MockServer;

pub const TEST_API_KEY: &str = "ph24_test_key";

#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub endpoint: String,
    pub payload: String,
    pub direction: LogDirection,
    pub success: bool,
}

/// Host backed by in-memory maps
#[derive(Default)]
pub struct MemoryHost {
    pub client_meta: Mutex<HashMap<(String, String), String>>,
    pub service_fields: Mutex<HashMap<String, ServiceFields>>,
    pub logs: Mutex<Vec<LogEntry>>,
    /// Make `set_service_fields` fail
    pub fail_service_writes: bool,
}

impl MemoryHost {
    pub fn project_of(&self, client_id: &str) -> Option<String> {
        self.client_meta
            .lock()
            .unwrap()
            .get(&(client_id.to_string(), "ph24_project_id".to_string()))
            .cloned()
    }

    pub fn logs(&self) -> Vec<LogEntry> {
        self.logs.lock().unwrap().clone()
    }
}

#[async_trait]
impl Host for MemoryHost {
    async fn client_meta(&self, client_id: &str, key: &str) -> Result<Option<String>, HostError> {
        Ok(self
            .client_meta
            .lock()
            .unwrap()
            .get(&(client_id.to_string(), key.to_string()))
            .cloned())
    }

    async fn set_client_meta(
        &self,
        client_id: &str,
        fields: &[MetaField],
    ) -> Result<(), HostError> {
        let mut meta = self.client_meta.lock().unwrap();
        for field in fields {
            meta.insert(
                (client_id.to_string(), field.key.clone()),
                field.value.clone(),
            );
        }
        Ok(())
    }

    async fn set_service_fields(
        &self,
        service_id: &str,
        fields: &[MetaField],
    ) -> Result<(), HostError> {
        if self.fail_service_writes {
            return Err(HostError::Storage("database is read-only".to_string()));
        }
        self.service_fields
            .lock()
            .unwrap()
            .entry(service_id.to_string())
            .or_default()
            .merge(fields);
        Ok(())
    }

    fn log(&self, endpoint: &str, payload: &str, direction: LogDirection, success: bool) {
        self.logs.lock().unwrap().push(LogEntry {
            endpoint: endpoint.to_string(),
            payload: payload.to_string(),
            direction,
            success,
        });
    }
}

pub struct TestModule {
    pub server: MockServer,
    pub module: Ph24Module<MemoryHost>,
    pub row: ModuleRow,
}

impl TestModule {
    pub async fn start() -> Self {
        Self::with_host(MemoryHost::default()).await
    }

    pub async fn with_host(host: MemoryHost) -> Self {
        let server = MockServer::start().await;
        let row = ModuleRow {
            id: "1".to_string(),
            meta: ConnectionConfig {
                account_name: "Main".to_string(),
                api_url: server.uri(),
                api_key: TEST_API_KEY.to_string(),
                project_name_template: "cust-{id}".to_string(),
                ..Default::default()
            },
        };
        Self {
            server,
            module: Ph24Module::new(host),
            row,
        }
    }

    pub fn use_master_project(&mut self, project_id: &str) {
        self.row.meta.master_project_id = Some(project_id.to_string());
        self.row.meta.use_master_project = true;
    }
}

pub fn package() -> Package {
    Package {
        id: "10".to_string(),
        meta: PackageMeta {
            flavor_id: "vc2-2c-4gb".to_string(),
            availability_zone: Some("fra1".to_string()),
            facility_id: None,
        },
    }
}

pub fn provisioned_service() -> Service {
    Service {
        id: "100".to_string(),
        client_id: "42".to_string(),
        fields: ServiceFields::from(vec![
            MetaField::plain("server_id", "s-1"),
            MetaField::plain("hostname", "web-01.example.com"),
            MetaField::plain("project_id", "p-42"),
        ]),
    }
}
