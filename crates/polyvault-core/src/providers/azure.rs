//! Azure Key Vault provider backed by the `az` CLI
//!
//! Shells out to `az` with JSON output rather than linking the SDK, matching
//! how the interactive plugin expects authentication to work (whatever `az
//! login` established). Every command runs under a fixed deadline and races
//! the cancellation token.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;

use super::error::{ProviderError, ProviderResult};
use super::traits::{Feature, Provider, ProviderSettings};
use crate::types::{CancellationToken, Secret, SecretValue, Vault};

pub const PROVIDER_NAME: &str = "azure";

const COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

/// Azure Key Vault provider
pub struct AzureProvider {
    cli: AzCli,
}

impl AzureProvider {
    /// Recognized settings: `subscription_id` (optional; the CLI's default
    /// subscription is used when absent)
    pub fn new(settings: &ProviderSettings) -> ProviderResult<Self> {
        let subscription = settings
            .get("subscription_id")
            .filter(|value| !value.is_empty())
            .map(str::to_string);

        Ok(Self {
            cli: AzCli { subscription },
        })
    }
}

#[async_trait]
impl Provider for AzureProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    async fn list_vaults(&self, cancel: &CancellationToken) -> ProviderResult<Vec<Vault>> {
        let output = self.cli.execute(cancel, &["keyvault", "list"]).await?;
        parse_vaults(&output)
    }

    async fn list_secrets(
        &self,
        cancel: &CancellationToken,
        vault_name: &str,
    ) -> ProviderResult<Vec<Secret>> {
        let output = self
            .cli
            .execute(
                cancel,
                &["keyvault", "secret", "list", "--vault-name", vault_name],
            )
            .await
            .map_err(|err| map_vault_errors(err, vault_name))?;

        parse_secrets(&output, vault_name)
    }

    async fn get_secret(
        &self,
        cancel: &CancellationToken,
        vault_name: &str,
        secret_name: &str,
    ) -> ProviderResult<SecretValue> {
        let output = self
            .cli
            .execute(
                cancel,
                &[
                    "keyvault",
                    "secret",
                    "show",
                    "--vault-name",
                    vault_name,
                    "--name",
                    secret_name,
                ],
            )
            .await
            .map_err(|err| map_secret_errors(err, vault_name, secret_name))?;

        parse_secret_value(&output, vault_name)
    }

    fn supports_feature(&self, feature: Feature) -> bool {
        matches!(feature, Feature::Versioning | Feature::Tags)
    }
}

/// Runs `az` commands with JSON output
struct AzCli {
    subscription: Option<String>,
}

impl AzCli {
    async fn execute(&self, cancel: &CancellationToken, args: &[&str]) -> ProviderResult<Vec<u8>> {
        let mut cmd = Command::new("az");
        cmd.args(args).args(["--output", "json"]);
        if let Some(subscription) = &self.subscription {
            cmd.args(["--subscription", subscription]);
        }
        cmd.kill_on_drop(true);

        tracing::debug!(?args, "running az command");

        let output = tokio::select! {
            _ = cancel.cancelled() => return Err(ProviderError::Cancelled),
            result = tokio::time::timeout(COMMAND_TIMEOUT, cmd.output()) => match result {
                Ok(output) => output.map_err(|err| {
                    if err.kind() == std::io::ErrorKind::NotFound {
                        ProviderError::unavailable(
                            PROVIDER_NAME,
                            "Azure CLI ('az') not found on PATH",
                        )
                    } else {
                        ProviderError::unavailable(
                            PROVIDER_NAME,
                            format!("failed to run az: {err}"),
                        )
                    }
                })?,
                Err(_) => return Err(ProviderError::DeadlineExceeded(COMMAND_TIMEOUT)),
            },
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let message = stderr.trim().to_string();

            if message.contains("az login") || message.contains("AADSTS") {
                return Err(ProviderError::authentication(PROVIDER_NAME, message));
            }

            return Err(ProviderError::unavailable(PROVIDER_NAME, message));
        }

        Ok(output.stdout)
    }
}

// The az CLI reports missing vaults/secrets as command failures; translate
// the recognizable ones into not-found kinds.

fn map_vault_errors(err: ProviderError, vault_name: &str) -> ProviderError {
    match &err {
        ProviderError::Unavailable { message, .. }
            if message.contains("VaultNotFound") || message.contains("was not found") =>
        {
            ProviderError::VaultNotFound(vault_name.to_string())
        }
        _ => err,
    }
}

fn map_secret_errors(err: ProviderError, vault_name: &str, secret_name: &str) -> ProviderError {
    match &err {
        ProviderError::Unavailable { message, .. } if message.contains("SecretNotFound") => {
            ProviderError::secret_not_found(vault_name, secret_name)
        }
        _ => map_vault_errors(err, vault_name),
    }
}

#[derive(Deserialize)]
struct AzVault {
    name: String,
    #[serde(default)]
    location: String,
    #[serde(default, rename = "resourceGroup")]
    resource_group: String,
}

#[derive(Deserialize)]
struct AzSecret {
    name: String,
    #[serde(default)]
    attributes: AzAttributes,
}

#[derive(Deserialize, Default)]
struct AzAttributes {
    #[serde(default)]
    enabled: bool,
}

#[derive(Deserialize)]
struct AzSecretValue {
    name: String,
    #[serde(default)]
    value: String,
}

fn parse_vaults(output: &[u8]) -> ProviderResult<Vec<Vault>> {
    let az_vaults: Vec<AzVault> = serde_json::from_slice(output)
        .map_err(|err| ProviderError::invalid_response(PROVIDER_NAME, err.to_string()))?;

    Ok(az_vaults
        .into_iter()
        .map(|v| Vault {
            name: v.name,
            provider: PROVIDER_NAME.to_string(),
            metadata: HashMap::from([
                ("location".to_string(), v.location),
                ("resourceGroup".to_string(), v.resource_group),
            ]),
        })
        .collect())
}

/// Only enabled secrets are surfaced
fn parse_secrets(output: &[u8], vault_name: &str) -> ProviderResult<Vec<Secret>> {
    let az_secrets: Vec<AzSecret> = serde_json::from_slice(output)
        .map_err(|err| ProviderError::invalid_response(PROVIDER_NAME, err.to_string()))?;

    Ok(az_secrets
        .into_iter()
        .filter(|s| s.attributes.enabled)
        .map(|s| Secret {
            name: s.name,
            vault_name: vault_name.to_string(),
            provider: PROVIDER_NAME.to_string(),
            enabled: true,
        })
        .collect())
}

fn parse_secret_value(output: &[u8], vault_name: &str) -> ProviderResult<SecretValue> {
    let az_secret: AzSecretValue = serde_json::from_slice(output)
        .map_err(|err| ProviderError::invalid_response(PROVIDER_NAME, err.to_string()))?;

    Ok(SecretValue {
        name: az_secret.name,
        value: az_secret.value,
        vault_name: vault_name.to_string(),
        provider: PROVIDER_NAME.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructor_accepts_empty_settings() {
        let provider = AzureProvider::new(&ProviderSettings::new()).unwrap();
        assert!(provider.cli.subscription.is_none());

        let provider =
            AzureProvider::new(&ProviderSettings::new().with("subscription_id", "sub-1")).unwrap();
        assert_eq!(provider.cli.subscription.as_deref(), Some("sub-1"));
    }

    #[test]
    fn parse_vaults_maps_metadata() {
        let body = br#"[
            {"name": "kv-prod", "location": "westeurope", "resourceGroup": "rg-core"},
            {"name": "kv-dev"}
        ]"#;

        let vaults = parse_vaults(body).unwrap();
        assert_eq!(vaults.len(), 2);
        assert_eq!(vaults[0].name, "kv-prod");
        assert_eq!(vaults[0].provider, "azure");
        assert_eq!(
            vaults[0].metadata.get("location").map(String::as_str),
            Some("westeurope")
        );
        assert_eq!(vaults[1].metadata.get("location").map(String::as_str), Some(""));
    }

    #[test]
    fn parse_secrets_filters_disabled_entries() {
        let body = br#"[
            {"name": "enabled-secret", "attributes": {"enabled": true}},
            {"name": "disabled-secret", "attributes": {"enabled": false}},
            {"name": "no-attributes"}
        ]"#;

        let secrets = parse_secrets(body, "kv-prod").unwrap();
        assert_eq!(secrets.len(), 1);
        assert_eq!(secrets[0].name, "enabled-secret");
        assert!(secrets[0].enabled);
        assert_eq!(secrets[0].vault_name, "kv-prod");
    }

    #[test]
    fn parse_secret_value_reads_value_field() {
        let body = br#"{"name": "db-password", "value": "hunter2"}"#;
        let value = parse_secret_value(body, "kv-prod").unwrap();
        assert_eq!(value.name, "db-password");
        assert_eq!(value.value, "hunter2");
        assert_eq!(value.provider, "azure");
    }

    #[test]
    fn garbage_output_is_invalid_response() {
        let err = parse_vaults(b"ERROR: not json").unwrap_err();
        assert!(matches!(err, ProviderError::InvalidResponse { .. }));
    }

    #[test]
    fn command_failures_map_to_error_kinds() {
        let auth = ProviderError::unavailable(
            PROVIDER_NAME,
            "Please run 'az login' to setup account.",
        );
        // classification happens in execute(); here we exercise the not-found mapping
        let err = map_secret_errors(
            ProviderError::unavailable(PROVIDER_NAME, "(SecretNotFound) A secret with ..."),
            "kv",
            "missing",
        );
        assert!(matches!(err, ProviderError::SecretNotFound { .. }));

        let err = map_vault_errors(
            ProviderError::unavailable(PROVIDER_NAME, "(VaultNotFound) The vault was not found"),
            "kv",
        );
        assert!(matches!(err, ProviderError::VaultNotFound(_)));

        // unrelated failures pass through untouched
        assert!(matches!(
            map_vault_errors(auth, "kv"),
            ProviderError::Unavailable { .. }
        ));
    }
}
