//! File-backed host for running the provisioning module from the CLI
//!
//! Client metadata, services and the module log live in
//! `.ph24/state.json`; the previous file is kept as `state.json.backup`.
//! Service fields marked `encrypted` are sealed with [`StateCipher`] on disk
//! and held in clear only in memory.

use crate::cipher::StateCipher;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ph24_module::{Host, HostError, LogDirection, MetaField, Service, ServiceFields, ServiceStatus};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tokio::fs;

const STATE_VERSION: u32 = 1;
const STATE_DIR: &str = ".ph24";
const STATE_FILE: &str = "state.json";
const STATE_BACKUP: &str = "state.json.backup";

/// Log entries kept in the state file
const LOG_LIMIT: usize = 200;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostState {
    pub version: u32,
    pub updated_at: DateTime<Utc>,
    /// client id -> key -> value
    #[serde(default)]
    pub client_meta: HashMap<String, HashMap<String, String>>,
    #[serde(default)]
    pub services: BTreeMap<String, ServiceRecord>,
    #[serde(default)]
    pub log: Vec<LogRecord>,
}

impl Default for HostState {
    fn default() -> Self {
        Self {
            version: STATE_VERSION,
            updated_at: Utc::now(),
            client_meta: HashMap::new(),
            services: BTreeMap::new(),
            log: Vec::new(),
        }
    }
}

impl HostState {
    /// Next free numeric service id
    pub fn next_service_id(&self) -> String {
        let max = self
            .services
            .keys()
            .filter_map(|id| id.parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        (max + 1).to_string()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceRecord {
    pub client_id: String,
    pub status: ServiceStatus,
    pub fields: ServiceFields,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ServiceRecord {
    pub fn new(client_id: impl Into<String>, status: ServiceStatus, fields: ServiceFields) -> Self {
        let now = Utc::now();
        Self {
            client_id: client_id.into(),
            status,
            fields,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn to_service(&self, id: &str) -> Service {
        Service {
            id: id.to_string(),
            client_id: self.client_id.clone(),
            fields: self.fields.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogRecord {
    pub endpoint: String,
    pub payload: String,
    pub direction: LogDirection,
    pub success: bool,
    pub at: DateTime<Utc>,
}

/// Apply `f` to the value of every `encrypted` service field
fn map_encrypted(
    state: &mut HostState,
    f: impl Fn(&str) -> Result<String, HostError>,
) -> Result<(), HostError> {
    for record in state.services.values_mut() {
        let fields = std::mem::take(&mut record.fields)
            .into_vec()
            .into_iter()
            .map(|mut field| {
                if field.encrypted {
                    field.value = f(&field.value)?;
                }
                Ok(field)
            })
            .collect::<Result<Vec<MetaField>, HostError>>()?;
        record.fields = ServiceFields::from(fields);
    }
    Ok(())
}

/// Reads and writes the state file
pub struct StateManager {
    project_root: PathBuf,
    cipher: StateCipher,
}

impl StateManager {
    pub fn new(project_root: impl AsRef<Path>, cipher: StateCipher) -> Self {
        Self {
            project_root: project_root.as_ref().to_path_buf(),
            cipher,
        }
    }

    fn state_dir(&self) -> PathBuf {
        self.project_root.join(STATE_DIR)
    }

    pub fn state_path(&self) -> PathBuf {
        self.state_dir().join(STATE_FILE)
    }

    fn backup_path(&self) -> PathBuf {
        self.state_dir().join(STATE_BACKUP)
    }

    pub async fn load(&self) -> Result<HostState, HostError> {
        let path = self.state_path();
        if !path.exists() {
            tracing::debug!("State file not found, starting empty");
            return Ok(HostState::default());
        }

        let content = fs::read_to_string(&path).await?;
        let mut state: HostState = serde_json::from_str(&content)?;

        if state.version > STATE_VERSION {
            return Err(HostError::Storage(format!(
                "State file version {} is newer than supported version {}",
                state.version, STATE_VERSION
            )));
        }

        map_encrypted(&mut state, |sealed| self.cipher.open(sealed))?;
        tracing::debug!("Loaded state with {} services", state.services.len());
        Ok(state)
    }

    pub async fn save(&self, state: &HostState) -> Result<(), HostError> {
        let dir = self.state_dir();
        if !dir.exists() {
            fs::create_dir_all(&dir).await?;
            tracing::debug!("Created state directory: {}", dir.display());
        }

        let path = self.state_path();
        let backup = self.backup_path();
        if path.exists() {
            if backup.exists() {
                fs::remove_file(&backup).await?;
            }
            fs::rename(&path, &backup).await?;
        }

        let mut sealed = state.clone();
        map_encrypted(&mut sealed, |value| self.cipher.seal(value))?;
        let content = serde_json::to_string_pretty(&sealed)?;
        fs::write(&path, content).await?;

        tracing::debug!("Saved state with {} services", state.services.len());
        Ok(())
    }
}

/// [`Host`] over a [`StateManager`]
///
/// Metadata writes are persisted immediately; log entries are buffered until
/// the next [`FileHost::persist`].
pub struct FileHost {
    manager: StateManager,
    state: Mutex<HostState>,
}

impl FileHost {
    pub async fn open(project_root: impl AsRef<Path>) -> Result<Self, HostError> {
        let state_dir = project_root.as_ref().join(STATE_DIR);
        let cipher = StateCipher::load(&state_dir).await?;
        let manager = StateManager::new(project_root, cipher);
        let state = manager.load().await?;
        Ok(Self {
            manager,
            state: Mutex::new(state),
        })
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut HostState) -> T) -> T {
        let mut state = self
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut state)
    }

    pub fn snapshot(&self) -> HostState {
        self.with_state(|state| state.clone())
    }

    pub fn service(&self, service_id: &str) -> Option<ServiceRecord> {
        self.with_state(|state| state.services.get(service_id).cloned())
    }

    /// Insert or replace a service record and persist
    pub async fn put_service(&self, service_id: &str, record: ServiceRecord) -> Result<(), HostError> {
        self.with_state(|state| {
            state.services.insert(service_id.to_string(), record);
            state.updated_at = Utc::now();
        });
        self.persist().await
    }

    pub async fn set_status(&self, service_id: &str, status: ServiceStatus) -> Result<(), HostError> {
        let found = self.with_state(|state| match state.services.get_mut(service_id) {
            Some(record) => {
                record.status = status;
                record.updated_at = Utc::now();
                true
            }
            None => false,
        });
        if !found {
            return Err(HostError::Storage(format!("Unknown service {}", service_id)));
        }
        self.persist().await
    }

    pub async fn persist(&self) -> Result<(), HostError> {
        let snapshot = self.snapshot();
        self.manager.save(&snapshot).await
    }
}

#[async_trait]
impl Host for FileHost {
    async fn client_meta(&self, client_id: &str, key: &str) -> Result<Option<String>, HostError> {
        Ok(self.with_state(|state| {
            state
                .client_meta
                .get(client_id)
                .and_then(|meta| meta.get(key))
                .cloned()
        }))
    }

    async fn set_client_meta(
        &self,
        client_id: &str,
        fields: &[MetaField],
    ) -> Result<(), HostError> {
        self.with_state(|state| {
            let meta = state.client_meta.entry(client_id.to_string()).or_default();
            for field in fields {
                meta.insert(field.key.clone(), field.value.clone());
            }
            state.updated_at = Utc::now();
        });
        self.persist().await
    }

    async fn set_service_fields(
        &self,
        service_id: &str,
        fields: &[MetaField],
    ) -> Result<(), HostError> {
        let found = self.with_state(|state| match state.services.get_mut(service_id) {
            Some(record) => {
                record.fields.merge(fields);
                record.updated_at = Utc::now();
                true
            }
            None => false,
        });
        if !found {
            return Err(HostError::Storage(format!("Unknown service {}", service_id)));
        }
        self.persist().await
    }

    fn log(&self, endpoint: &str, payload: &str, direction: LogDirection, success: bool) {
        tracing::debug!("module log {} [{}] success={}", endpoint, direction, success);
        self.with_state(|state| {
            state.log.push(LogRecord {
                endpoint: endpoint.to_string(),
                payload: payload.to_string(),
                direction,
                success,
                at: Utc::now(),
            });
            if state.log.len() > LOG_LIMIT {
                let excess = state.log.len() - LOG_LIMIT;
                state.log.drain(..excess);
            }
        });
    }
}
