//! HashiCorp Vault provider over the KV v2 HTTP API
//!
//! Vaults map to KV v2 secret-engine mounts; secrets are the leaf keys at the
//! mount root. Directory-style keys (trailing `/`) are excluded from listings.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;

use super::error::{ProviderError, ProviderResult};
use super::traits::{Feature, Provider, ProviderSettings};
use crate::types::{CancellationToken, Secret, SecretValue, Vault};

pub const PROVIDER_NAME: &str = "hashicorp";

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// HashiCorp Vault provider
#[derive(Debug)]
pub struct HashicorpProvider {
    client: VaultClient,
}

impl HashicorpProvider {
    /// Recognized settings: `address` (required), `token` (required),
    /// `namespace` (optional, Vault Enterprise)
    pub fn new(settings: &ProviderSettings) -> ProviderResult<Self> {
        let address = settings.require(PROVIDER_NAME, "address")?;
        let token = settings.require(PROVIDER_NAME, "token")?;
        let namespace = settings
            .get("namespace")
            .filter(|value| !value.is_empty())
            .map(str::to_string);

        Ok(Self {
            client: VaultClient::new(address, token, namespace)?,
        })
    }
}

#[async_trait]
impl Provider for HashicorpProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    /// All KV v2 mounts; other engine types are not browsable here
    async fn list_vaults(&self, cancel: &CancellationToken) -> ProviderResult<Vec<Vault>> {
        let body = match self.client.get_json(cancel, "sys/mounts", &[]).await {
            Ok(body) => body,
            Err(ApiFailure::Status { status, message })
                if status == StatusCode::FORBIDDEN || status == StatusCode::UNAUTHORIZED =>
            {
                return Err(ProviderError::authentication(PROVIDER_NAME, message));
            }
            Err(failure) => return Err(failure.into_provider_error()),
        };

        parse_mounts(&body)
    }

    async fn list_secrets(
        &self,
        cancel: &CancellationToken,
        vault_name: &str,
    ) -> ProviderResult<Vec<Secret>> {
        let mount = vault_name.trim_end_matches('/');
        let path = format!("{mount}/metadata");

        let body = match self
            .client
            .get_json(cancel, &path, &[("list", "true")])
            .await
        {
            Ok(body) => body,
            // Vault answers 404 both for an empty mount and for a list with no
            // results; surface it as an empty listing
            Err(ApiFailure::Status { status, .. }) if status == StatusCode::NOT_FOUND => {
                return Ok(Vec::new());
            }
            Err(ApiFailure::Status { status, message })
                if status == StatusCode::FORBIDDEN || status == StatusCode::UNAUTHORIZED =>
            {
                return Err(ProviderError::authentication(PROVIDER_NAME, message));
            }
            Err(failure) => return Err(failure.into_provider_error()),
        };

        parse_secret_keys(&body, mount)
    }

    async fn get_secret(
        &self,
        cancel: &CancellationToken,
        vault_name: &str,
        secret_name: &str,
    ) -> ProviderResult<SecretValue> {
        let mount = vault_name.trim_end_matches('/');
        let path = format!("{mount}/data/{secret_name}");

        let body = match self.client.get_json(cancel, &path, &[]).await {
            Ok(body) => body,
            Err(ApiFailure::Status { status, .. }) if status == StatusCode::NOT_FOUND => {
                return Err(ProviderError::secret_not_found(mount, secret_name));
            }
            Err(ApiFailure::Status { status, message })
                if status == StatusCode::FORBIDDEN || status == StatusCode::UNAUTHORIZED =>
            {
                return Err(ProviderError::authentication(PROVIDER_NAME, message));
            }
            Err(failure) => return Err(failure.into_provider_error()),
        };

        let data = kv2_data(&body)?;
        let value = select_value(&data).ok_or_else(|| {
            ProviderError::invalid_response(PROVIDER_NAME, "secret has no data fields")
        })?;

        Ok(SecretValue {
            name: secret_name.to_string(),
            value,
            vault_name: mount.to_string(),
            provider: PROVIDER_NAME.to_string(),
        })
    }

    fn supports_feature(&self, feature: Feature) -> bool {
        matches!(feature, Feature::Versioning | Feature::Metadata)
    }
}

/// Thin wrapper over the Vault HTTP API
#[derive(Debug)]
struct VaultClient {
    http: reqwest::Client,
    address: String,
    token: String,
    namespace: Option<String>,
}

enum ApiFailure {
    Cancelled,
    Timeout,
    Transport(String),
    Decode(String),
    Status { status: StatusCode, message: String },
}

impl ApiFailure {
    fn into_provider_error(self) -> ProviderError {
        match self {
            ApiFailure::Cancelled => ProviderError::Cancelled,
            ApiFailure::Timeout => ProviderError::DeadlineExceeded(HTTP_TIMEOUT),
            ApiFailure::Transport(message) => ProviderError::unavailable(PROVIDER_NAME, message),
            ApiFailure::Decode(message) => ProviderError::invalid_response(PROVIDER_NAME, message),
            ApiFailure::Status { status, message } => ProviderError::unavailable(
                PROVIDER_NAME,
                format!("unexpected status {status}: {message}"),
            ),
        }
    }
}

impl VaultClient {
    fn new(address: &str, token: &str, namespace: Option<String>) -> ProviderResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|err| ProviderError::unavailable(PROVIDER_NAME, err.to_string()))?;

        Ok(Self {
            http,
            address: address.trim_end_matches('/').to_string(),
            token: token.to_string(),
            namespace,
        })
    }

    async fn get_json(
        &self,
        cancel: &CancellationToken,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<serde_json::Value, ApiFailure> {
        let url = format!("{}/v1/{}", self.address, path);

        let mut request = self
            .http
            .get(&url)
            .header("X-Vault-Token", &self.token)
            .query(query);
        if let Some(namespace) = &self.namespace {
            request = request.header("X-Vault-Namespace", namespace);
        }

        tracing::debug!(%url, "vault api request");

        let response = tokio::select! {
            _ = cancel.cancelled() => return Err(ApiFailure::Cancelled),
            result = request.send() => result.map_err(|err| {
                if err.is_timeout() {
                    ApiFailure::Timeout
                } else {
                    ApiFailure::Transport(err.to_string())
                }
            })?,
        };

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .ok()
                .map(|body| vault_error_message(&body))
                .unwrap_or_default();
            return Err(ApiFailure::Status { status, message });
        }

        response
            .json()
            .await
            .map_err(|err| ApiFailure::Decode(err.to_string()))
    }
}

/// Pull the first entry of Vault's `{"errors": [...]}` body, if present
fn vault_error_message(body: &str) -> String {
    #[derive(Deserialize)]
    struct VaultErrors {
        errors: Vec<String>,
    }

    serde_json::from_str::<VaultErrors>(body)
        .ok()
        .and_then(|e| e.errors.into_iter().next())
        .unwrap_or_else(|| body.trim().to_string())
}

#[derive(Deserialize)]
struct MountInfo {
    #[serde(rename = "type")]
    mount_type: String,
    #[serde(default)]
    options: Option<HashMap<String, String>>,
    #[serde(default)]
    description: String,
}

/// Filter `sys/mounts` output down to KV v2 mounts
fn parse_mounts(body: &serde_json::Value) -> ProviderResult<Vec<Vault>> {
    // newer Vault wraps the listing in "data"; older returns it at top level
    let listing = body.get("data").unwrap_or(body);
    let entries = listing.as_object().ok_or_else(|| {
        ProviderError::invalid_response(PROVIDER_NAME, "sys/mounts is not an object")
    })?;

    let mut vaults = Vec::new();
    for (path, raw) in entries {
        let Ok(mount) = serde_json::from_value::<MountInfo>(raw.clone()) else {
            // non-mount keys like request metadata
            continue;
        };

        if mount.mount_type != "kv" {
            continue;
        }

        let version = mount
            .options
            .as_ref()
            .and_then(|options| options.get("version").cloned())
            .unwrap_or_else(|| "1".to_string());
        if version != "2" {
            continue;
        }

        vaults.push(Vault {
            name: path.trim_end_matches('/').to_string(),
            provider: PROVIDER_NAME.to_string(),
            metadata: HashMap::from([
                ("type".to_string(), mount.mount_type),
                ("version".to_string(), version),
                ("description".to_string(), mount.description),
            ]),
        });
    }

    Ok(vaults)
}

/// Leaf keys from a metadata listing; directory-style keys are not secrets
fn parse_secret_keys(body: &serde_json::Value, mount: &str) -> ProviderResult<Vec<Secret>> {
    let keys = body
        .pointer("/data/keys")
        .and_then(|keys| keys.as_array())
        .map(|keys| keys.as_slice())
        .unwrap_or(&[]);

    Ok(keys
        .iter()
        .filter_map(|key| key.as_str())
        .filter(|key| !key.ends_with('/'))
        .map(|key| Secret {
            name: key.to_string(),
            vault_name: mount.to_string(),
            provider: PROVIDER_NAME.to_string(),
            enabled: true,
        })
        .collect())
}

/// The KV v2 payload nests the user data under `data.data`
fn kv2_data(body: &serde_json::Value) -> ProviderResult<HashMap<String, serde_json::Value>> {
    body.pointer("/data/data")
        .and_then(|data| data.as_object())
        .map(|data| data.clone().into_iter().collect())
        .ok_or_else(|| ProviderError::invalid_response(PROVIDER_NAME, "invalid secret data format"))
}

/// Fixed value-selection priority for multi-field entries: a field named
/// "value", else "password", else an arbitrary single field. Lossy by design;
/// kept for compatibility with the interactive plugin.
fn select_value(data: &HashMap<String, serde_json::Value>) -> Option<String> {
    let field = data
        .get("value")
        .or_else(|| data.get("password"))
        .or_else(|| data.values().next())?;

    Some(match field {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    })
}
