//! In-memory provider for tests
//!
//! Deterministic, no network. Vaults and secrets are declared up front with
//! the builder methods.

use std::collections::{BTreeMap, HashSet};

use async_trait::async_trait;

use super::error::{ProviderError, ProviderResult};
use super::traits::{Feature, Provider};
use crate::types::{CancellationToken, Secret, SecretValue, Vault};

/// Mock secret provider
pub struct MockProvider {
    name: String,
    vaults: BTreeMap<String, BTreeMap<String, String>>,
    features: HashSet<Feature>,
}

impl MockProvider {
    /// Create an empty mock provider with the given registry name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            vaults: BTreeMap::new(),
            features: HashSet::new(),
        }
    }

    /// Add an empty vault
    pub fn with_vault(mut self, vault: impl Into<String>) -> Self {
        self.vaults.entry(vault.into()).or_default();
        self
    }

    /// Add a secret, creating its vault if needed
    pub fn with_secret(
        mut self,
        vault: impl Into<String>,
        secret: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.vaults
            .entry(vault.into())
            .or_default()
            .insert(secret.into(), value.into());
        self
    }

    /// Advertise a capability
    pub fn with_feature(mut self, feature: Feature) -> Self {
        self.features.insert(feature);
        self
    }

    fn check_cancelled(cancel: &CancellationToken) -> ProviderResult<()> {
        if cancel.is_cancelled() {
            return Err(ProviderError::Cancelled);
        }
        Ok(())
    }
}

#[async_trait]
impl Provider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn list_vaults(&self, cancel: &CancellationToken) -> ProviderResult<Vec<Vault>> {
        Self::check_cancelled(cancel)?;

        Ok(self
            .vaults
            .keys()
            .map(|name| Vault::new(name, &self.name))
            .collect())
    }

    async fn list_secrets(
        &self,
        cancel: &CancellationToken,
        vault_name: &str,
    ) -> ProviderResult<Vec<Secret>> {
        Self::check_cancelled(cancel)?;

        let vault = self
            .vaults
            .get(vault_name)
            .ok_or_else(|| ProviderError::VaultNotFound(vault_name.to_string()))?;

        Ok(vault
            .keys()
            .map(|name| Secret {
                name: name.clone(),
                vault_name: vault_name.to_string(),
                provider: self.name.clone(),
                enabled: true,
            })
            .collect())
    }

    async fn get_secret(
        &self,
        cancel: &CancellationToken,
        vault_name: &str,
        secret_name: &str,
    ) -> ProviderResult<SecretValue> {
        Self::check_cancelled(cancel)?;

        let vault = self
            .vaults
            .get(vault_name)
            .ok_or_else(|| ProviderError::VaultNotFound(vault_name.to_string()))?;

        let value = vault
            .get(secret_name)
            .ok_or_else(|| ProviderError::secret_not_found(vault_name, secret_name))?;

        Ok(SecretValue {
            name: secret_name.to_string(),
            value: value.clone(),
            vault_name: vault_name.to_string(),
            provider: self.name.clone(),
        })
    }

    fn supports_feature(&self, feature: Feature) -> bool {
        self.features.contains(&feature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn lookup_failures_carry_the_missing_name() {
        let provider = MockProvider::new("mock").with_secret("v1", "s1", "hello");
        let cancel = CancellationToken::new();

        let err = provider.list_secrets(&cancel, "missing").await.unwrap_err();
        assert!(matches!(err, ProviderError::VaultNotFound(name) if name == "missing"));

        let err = provider.get_secret(&cancel, "v1", "nope").await.unwrap_err();
        assert!(matches!(err, ProviderError::SecretNotFound { secret, .. } if secret == "nope"));
    }

    #[tokio::test]
    async fn cancelled_token_aborts_every_operation() {
        let provider = MockProvider::new("mock").with_vault("v1");
        let cancel = CancellationToken::new();
        cancel.cancel();

        assert!(matches!(
            provider.list_vaults(&cancel).await,
            Err(ProviderError::Cancelled)
        ));
        assert!(matches!(
            provider.list_secrets(&cancel, "v1").await,
            Err(ProviderError::Cancelled)
        ));
        assert!(matches!(
            provider.get_secret(&cancel, "v1", "s1").await,
            Err(ProviderError::Cancelled)
        ));
    }

    #[test]
    fn features_default_to_unsupported() {
        let provider = MockProvider::new("mock").with_feature(Feature::Tags);
        assert!(provider.supports_feature(Feature::Tags));
        assert!(!provider.supports_feature(Feature::Versioning));
        assert!(!provider.supports_feature(Feature::Metadata));
    }
}
