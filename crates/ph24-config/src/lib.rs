//! Operator configuration for the `ph24` CLI
//!
//! A YAML profile holding the API connection and project naming settings:
//!
//! ```yaml
//! api_url: https://ph24.io/service
//! api_key: ph24_xxx
//! project_name_template: cust-{id}
//! master_project_id: 7f3c...
//! use_master_project: false
//! ```
//!
//! `PH24_API_URL` and `PH24_API_KEY` override the file values.

pub mod error;

pub use error::*;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_API_URL: &str = "https://ph24.io/service";
pub const DEFAULT_PROJECT_NAME_TEMPLATE: &str = "cust-{id}";

pub const ENV_CONFIG_PATH: &str = "PH24_CONFIG_PATH";
pub const ENV_API_URL: &str = "PH24_API_URL";
pub const ENV_API_KEY: &str = "PH24_API_KEY";

const CANDIDATES: [&str; 2] = ["ph24.yaml", ".ph24.yaml"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Ph24Config {
    pub api_url: String,
    pub api_key: Option<String>,
    pub project_name_template: String,
    pub master_project_id: Option<String>,
    pub use_master_project: bool,
}

impl Default for Ph24Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: None,
            project_name_template: DEFAULT_PROJECT_NAME_TEMPLATE.to_string(),
            master_project_id: None,
            use_master_project: false,
        }
    }
}

impl Ph24Config {
    /// Parse a config file, then apply environment overrides
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Ph24Config = if content.trim().is_empty() {
            Ph24Config::default()
        } else {
            serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.display().to_string(),
                source,
            })?
        };
        config.apply_env();
        Ok(config)
    }

    /// Load the discovered config file; without one, defaults plus
    /// environment overrides
    pub fn load() -> Result<Self> {
        match find_config_file() {
            Ok(path) => {
                tracing::debug!("Loading config from {}", path.display());
                Self::from_file(&path)
            }
            Err(ConfigError::ConfigFileNotFound) => {
                tracing::debug!("No config file found, using defaults");
                let mut config = Self::default();
                config.apply_env();
                Ok(config)
            }
            Err(e) => Err(e),
        }
    }

    fn apply_env(&mut self) {
        if let Some(url) = env_value(ENV_API_URL) {
            self.api_url = url;
        }
        if let Some(key) = env_value(ENV_API_KEY) {
            self.api_key = Some(key);
        }
        if self.api_url.trim().is_empty() {
            self.api_url = DEFAULT_API_URL.to_string();
        }
        if self.project_name_template.trim().is_empty() {
            self.project_name_template = DEFAULT_PROJECT_NAME_TEMPLATE.to_string();
        }
    }

    pub fn api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or(ConfigError::ApiKeyMissing)
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Locate the config file
///
/// Search order:
/// 1. `PH24_CONFIG_PATH`
/// 2. current directory: `ph24.yaml`, `.ph24.yaml`
/// 3. `./.ph24/ph24.yaml`
/// 4. `~/.config/ph24/config.yaml`
pub fn find_config_file() -> Result<PathBuf> {
    if let Ok(config_path) = std::env::var(ENV_CONFIG_PATH) {
        let path = PathBuf::from(config_path);
        if path.exists() {
            return Ok(path);
        }
        tracing::warn!("{} points at a missing file: {}", ENV_CONFIG_PATH, path.display());
    }

    let current_dir = std::env::current_dir()?;
    for filename in &CANDIDATES {
        let path = current_dir.join(filename);
        if path.exists() {
            return Ok(path);
        }
    }

    let local = current_dir.join(".ph24").join("ph24.yaml");
    if local.exists() {
        return Ok(local);
    }

    if let Some(config_dir) = dirs::config_dir() {
        let global_config = config_dir.join("ph24").join("config.yaml");
        if global_config.exists() {
            return Ok(global_config);
        }
    }

    Err(ConfigError::ConfigFileNotFound)
}
