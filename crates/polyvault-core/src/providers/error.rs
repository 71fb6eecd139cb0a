//! Provider error types

use std::time::Duration;

use thiserror::Error;

use crate::config::ConfigError;

/// Errors that can occur during provider operations
#[derive(Error, Debug)]
pub enum ProviderError {
    /// No constructor registered under the requested name
    #[error("provider not found: {0}")]
    ProviderNotFound(String),

    /// Named vault/container does not exist
    #[error("vault '{0}' not found")]
    VaultNotFound(String),

    /// Named secret does not exist in the vault
    #[error("secret '{secret}' not found in vault '{vault}'")]
    SecretNotFound { vault: String, secret: String },

    /// Backend rejected the credentials
    #[error("{provider} authentication failed: {message}")]
    Authentication { provider: String, message: String },

    /// Network/transport failure talking to the backend
    #[error("{provider} backend unavailable: {message}")]
    Unavailable { provider: String, message: String },

    /// Backend replied with something we cannot interpret
    #[error("invalid response from {provider}: {message}")]
    InvalidResponse { provider: String, message: String },

    /// Configuration problem surfaced during provider construction
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Operation aborted via the cancellation token
    #[error("operation cancelled")]
    Cancelled,

    /// Operation exceeded its deadline
    #[error("operation timed out after {0:?}")]
    DeadlineExceeded(Duration),
}

impl ProviderError {
    pub fn secret_not_found(vault: impl Into<String>, secret: impl Into<String>) -> Self {
        Self::SecretNotFound {
            vault: vault.into(),
            secret: secret.into(),
        }
    }

    pub fn authentication(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Authentication {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn unavailable(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Unavailable {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn invalid_response(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            provider: provider.into(),
            message: message.into(),
        }
    }
}

pub type ProviderResult<T> = Result<T, ProviderError>;
