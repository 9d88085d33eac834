use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MinutesError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Secret resolution failed: {0}")]
    Secret(#[from] crate::secrets::SecretError),

    #[error("LLM gateway error: {0}")]
    Gateway(#[from] crate::llm::GatewayError),

    #[error("Unknown sample transcript '{key}' (available: {available})")]
    UnknownSample { key: String, available: String },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Failed to parse config YAML: {0}")]
    ParseYaml(#[from] serde_yaml::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },

    #[error("Schema validation failed: {errors}")]
    SchemaValidation { errors: String },
}

pub type Result<T> = std::result::Result<T, MinutesError>;
