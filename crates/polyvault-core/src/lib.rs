//! Polyvault core
//!
//! Unified browsing and retrieval of secrets across multiple backends
//! (Azure Key Vault, HashiCorp Vault). This crate holds everything except the
//! command-line surface: the provider capability trait, the constructor
//! registry, layered configuration, and the backend implementations.
//!
//! ```rust,ignore
//! use polyvault_core::{CancellationToken, MockProvider, Provider, ProviderRegistry,
//!     ProviderSettings};
//!
//! let registry = ProviderRegistry::new();
//! registry.register("mock", |_settings| {
//!     Ok(Box::new(MockProvider::new("mock").with_secret("v1", "s1", "hello")) as Box<dyn Provider>)
//! });
//!
//! let provider = registry.get_provider("mock", &ProviderSettings::new())?;
//! let cancel = CancellationToken::new();
//! let secret = provider.get_secret(&cancel, "v1", "s1").await?;
//! assert_eq!(secret.value, "hello");
//! ```

pub mod config;
pub mod providers;
pub mod types;

// Re-export commonly used types
pub use config::{Config, ConfigError, ConfigResult};
pub use providers::{
    AzureProvider, Feature, HashicorpProvider, MockProvider, Provider, ProviderError,
    ProviderRegistry, ProviderResult, ProviderSettings,
};
pub use types::{CancellationToken, Secret, SecretValue, Vault};
