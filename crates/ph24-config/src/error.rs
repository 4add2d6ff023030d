use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(
        "No configuration file found. Looked in:\n\
        - current directory: ph24.yaml, .ph24.yaml\n\
        - ./.ph24/ph24.yaml\n\
        - ~/.config/ph24/config.yaml\n\
        Set PH24_CONFIG_PATH to point at a file directly"
    )]
    ConfigFileNotFound,

    #[error("No API key configured. Set api_key in the config file or PH24_API_KEY")]
    ApiKeyMissing,

    #[error("Invalid configuration in {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
