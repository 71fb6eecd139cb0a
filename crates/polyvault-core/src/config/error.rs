//! Configuration error types

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while loading, validating, or querying configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file could not be parsed as YAML
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The provider kind has no configuration block at all
    #[error("{kind} provider not configured")]
    NotConfigured { kind: String },

    /// Named instance is absent from the kind's instance list
    #[error("{kind} instance '{name}' not found")]
    InstanceNotFound { kind: String, name: String },

    /// Default-instance lookup on an empty instance list
    #[error("no {kind} instances configured")]
    NoInstances { kind: String },

    /// Validation: kind is enabled but its instance list is empty
    #[error("{kind} provider is enabled but has no instances configured")]
    EmptyInstances { kind: String },

    /// Validation: instance without a name
    #[error("{kind} instance at index {index} has no name")]
    UnnamedInstance { kind: String, index: usize },

    /// Validation: required credential field is empty
    #[error("{kind} instance '{instance}' has no {field}")]
    MissingField {
        kind: String,
        instance: String,
        field: &'static str,
    },

    /// Provider constructor is missing a required settings key
    #[error("{provider} provider requires setting '{key}'")]
    MissingSetting { provider: String, key: String },

    /// Provider name not known to the configuration layer
    #[error("unknown provider: {0}")]
    UnknownProvider(String),
}

impl ConfigError {
    pub fn missing_setting(provider: impl Into<String>, key: impl Into<String>) -> Self {
        Self::MissingSetting {
            provider: provider.into(),
            key: key.into(),
        }
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;
