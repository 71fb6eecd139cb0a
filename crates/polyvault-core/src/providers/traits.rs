//! Provider trait definition and the settings bag passed to constructors

use std::collections::HashMap;

use async_trait::async_trait;

use super::error::ProviderResult;
use crate::config::ConfigError;
use crate::types::{CancellationToken, Secret, SecretValue, Vault};

/// Optional provider capabilities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    /// Secrets keep prior versions
    Versioning,
    /// Rich per-secret metadata
    Metadata,
    /// Secrets can carry tags
    Tags,
}

/// Backend-specific connection parameters handed to a provider constructor
///
/// The registry enforces no keys; each backend converts the keys it expects
/// into typed fields at construction time and fails fast when one is missing.
#[derive(Debug, Clone, Default)]
pub struct ProviderSettings {
    values: HashMap<String, String>,
}

impl ProviderSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Fetch a key that must be present and non-empty
    pub fn require(&self, provider: &str, key: &str) -> Result<&str, ConfigError> {
        self.get(key)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| ConfigError::missing_setting(provider, key))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ProviderSettings {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// The uniform contract every secret backend implements
///
/// The command layer never branches on backend identity beyond initial
/// construction; everything it needs goes through these five operations.
/// Every I/O method takes the cancellation token explicitly.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Stable identifier used for registry lookup and output tagging
    fn name(&self) -> &str;

    /// All accessible vaults for the authenticated principal.
    /// Ordering is backend-defined.
    async fn list_vaults(&self, cancel: &CancellationToken) -> ProviderResult<Vec<Vault>>;

    /// All secret entries (name + enabled flag) in the named vault
    async fn list_secrets(
        &self,
        cancel: &CancellationToken,
        vault_name: &str,
    ) -> ProviderResult<Vec<Secret>>;

    /// The latest value of a named secret
    async fn get_secret(
        &self,
        cancel: &CancellationToken,
        vault_name: &str,
        secret_name: &str,
    ) -> ProviderResult<SecretValue>;

    /// Pure capability query; never fails, no side effects
    fn supports_feature(&self, feature: Feature) -> bool;
}

impl std::fmt::Debug for dyn Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Provider").field("name", &self.name()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_require_rejects_missing_and_empty() {
        let settings = ProviderSettings::new()
            .with("address", "http://127.0.0.1:8200")
            .with("namespace", "");

        assert_eq!(
            settings.require("hashicorp", "address").unwrap(),
            "http://127.0.0.1:8200"
        );
        assert!(settings.require("hashicorp", "token").is_err());
        assert!(settings.require("hashicorp", "namespace").is_err());
    }

    #[test]
    fn settings_from_iterator() {
        let settings: ProviderSettings = [("a", "1"), ("b", "2")].into_iter().collect();
        assert_eq!(settings.get("a"), Some("1"));
        assert_eq!(settings.get("b"), Some("2"));
        assert_eq!(settings.get("c"), None);
    }
}
