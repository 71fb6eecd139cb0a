//! Typed configuration structure and instance lookup helpers

use serde::{Deserialize, Serialize};

use super::error::{ConfigError, ConfigResult};
use crate::providers::ProviderSettings;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub defaults: Defaults,
    pub providers: Providers,
    pub fzf: FzfConfig,
    pub filters: Filters,
}

/// Default provider/vault selection used when flags omit them
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Defaults {
    pub provider: Option<String>,
    pub vault: Option<String>,
}

/// Per-kind provider blocks
///
/// A `None` block means the kind was explicitly nulled out; an absent block
/// gets the built-in default (enabled, no instances).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Providers {
    pub azure: Option<AzureConfig>,
    pub hashicorp: Option<HashicorpConfig>,
}

impl Default for Providers {
    fn default() -> Self {
        Self {
            azure: Some(AzureConfig::default()),
            hashicorp: Some(HashicorpConfig::default()),
        }
    }
}

/// Azure Key Vault provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AzureConfig {
    pub enabled: bool,
    pub instances: Vec<AzureInstance>,
}

impl Default for AzureConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            instances: Vec::new(),
        }
    }
}

/// One configured Azure subscription
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct AzureInstance {
    pub name: String,
    pub subscription_id: String,
    #[serde(rename = "default")]
    pub is_default: bool,
}

/// HashiCorp Vault provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HashicorpConfig {
    pub enabled: bool,
    pub instances: Vec<HashicorpInstance>,
}

impl Default for HashicorpConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            instances: Vec::new(),
        }
    }
}

/// One configured Vault server
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct HashicorpInstance {
    pub name: String,
    pub address: String,
    pub token: String,
    pub namespace: String,
    #[serde(rename = "default")]
    pub is_default: bool,
}

/// fzf-tmux display hints; irrelevant to selection logic but must round-trip
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FzfConfig {
    pub height: String,
    pub border: String,
    pub preview: bool,
}

impl Default for FzfConfig {
    fn default() -> Self {
        Self {
            height: "40%".to_string(),
            border: "rounded".to_string(),
            preview: false,
        }
    }
}

/// Secret listing filters
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Filters {
    pub enabled_only: bool,
}

impl Default for Filters {
    fn default() -> Self {
        Self { enabled_only: true }
    }
}

/// Common shape of a configured instance, used by the lookup helpers
trait InstanceEntry {
    fn name(&self) -> &str;
    fn is_default(&self) -> bool;
}

impl InstanceEntry for AzureInstance {
    fn name(&self) -> &str {
        &self.name
    }
    fn is_default(&self) -> bool {
        self.is_default
    }
}

impl InstanceEntry for HashicorpInstance {
    fn name(&self) -> &str {
        &self.name
    }
    fn is_default(&self) -> bool {
        self.is_default
    }
}

fn find_instance<'a, T: InstanceEntry>(instances: &'a [T], name: &str) -> Option<&'a T> {
    instances.iter().find(|inst| inst.name() == name)
}

/// First instance flagged default, else the first in declaration order
fn default_instance<T: InstanceEntry>(instances: &[T]) -> Option<&T> {
    instances
        .iter()
        .find(|inst| inst.is_default())
        .or_else(|| instances.first())
}

impl Config {
    /// Look up an Azure instance by exact name
    pub fn azure_instance(&self, name: &str) -> ConfigResult<&AzureInstance> {
        let block = self
            .providers
            .azure
            .as_ref()
            .ok_or_else(|| ConfigError::NotConfigured {
                kind: "azure".to_string(),
            })?;

        find_instance(&block.instances, name).ok_or_else(|| ConfigError::InstanceNotFound {
            kind: "azure".to_string(),
            name: name.to_string(),
        })
    }

    /// The Azure instance flagged `default: true`, else the first configured
    pub fn default_azure_instance(&self) -> ConfigResult<&AzureInstance> {
        let block = self
            .providers
            .azure
            .as_ref()
            .ok_or_else(|| ConfigError::NotConfigured {
                kind: "azure".to_string(),
            })?;

        default_instance(&block.instances).ok_or_else(|| ConfigError::NoInstances {
            kind: "azure".to_string(),
        })
    }

    /// All configured Azure instances (empty when the block is absent)
    pub fn azure_instances(&self) -> &[AzureInstance] {
        self.providers
            .azure
            .as_ref()
            .map(|block| block.instances.as_slice())
            .unwrap_or(&[])
    }

    /// Look up a HashiCorp Vault instance by exact name
    pub fn hashicorp_instance(&self, name: &str) -> ConfigResult<&HashicorpInstance> {
        let block =
            self.providers
                .hashicorp
                .as_ref()
                .ok_or_else(|| ConfigError::NotConfigured {
                    kind: "hashicorp".to_string(),
                })?;

        find_instance(&block.instances, name).ok_or_else(|| ConfigError::InstanceNotFound {
            kind: "hashicorp".to_string(),
            name: name.to_string(),
        })
    }

    /// The Vault instance flagged `default: true`, else the first configured
    pub fn default_hashicorp_instance(&self) -> ConfigResult<&HashicorpInstance> {
        let block =
            self.providers
                .hashicorp
                .as_ref()
                .ok_or_else(|| ConfigError::NotConfigured {
                    kind: "hashicorp".to_string(),
                })?;

        default_instance(&block.instances).ok_or_else(|| ConfigError::NoInstances {
            kind: "hashicorp".to_string(),
        })
    }

    /// All configured Vault instances (empty when the block is absent)
    pub fn hashicorp_instances(&self) -> &[HashicorpInstance] {
        self.providers
            .hashicorp
            .as_ref()
            .map(|block| block.instances.as_slice())
            .unwrap_or(&[])
    }

    /// Check whether a provider kind is present and enabled
    pub fn is_provider_enabled(&self, provider: &str) -> bool {
        match provider {
            "azure" => self
                .providers
                .azure
                .as_ref()
                .is_some_and(|block| block.enabled),
            "hashicorp" => self
                .providers
                .hashicorp
                .as_ref()
                .is_some_and(|block| block.enabled),
            _ => false,
        }
    }

    /// Names of all enabled provider kinds
    pub fn enabled_providers(&self) -> Vec<&'static str> {
        let mut providers = Vec::new();
        if self.is_provider_enabled("azure") {
            providers.push("azure");
        }
        if self.is_provider_enabled("hashicorp") {
            providers.push("hashicorp");
        }
        providers
    }

    /// Build the settings bag for a provider constructor from the named
    /// instance, or from the default instance when `instance` is `None`
    pub fn provider_settings(
        &self,
        provider: &str,
        instance: Option<&str>,
    ) -> ConfigResult<ProviderSettings> {
        match provider {
            "azure" => {
                let inst = match instance {
                    Some(name) => self.azure_instance(name)?,
                    None => self.default_azure_instance()?,
                };
                Ok(ProviderSettings::new().with("subscription_id", &inst.subscription_id))
            }
            "hashicorp" => {
                let inst = match instance {
                    Some(name) => self.hashicorp_instance(name)?,
                    None => self.default_hashicorp_instance()?,
                };
                Ok(ProviderSettings::new()
                    .with("address", &inst.address)
                    .with("token", &inst.token)
                    .with("namespace", &inst.namespace))
            }
            other => Err(ConfigError::UnknownProvider(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_azure(instances: Vec<AzureInstance>) -> Config {
        Config {
            providers: Providers {
                azure: Some(AzureConfig {
                    enabled: true,
                    instances,
                }),
                hashicorp: None,
            },
            ..Config::default()
        }
    }

    fn azure_inst(name: &str, is_default: bool) -> AzureInstance {
        AzureInstance {
            name: name.to_string(),
            subscription_id: format!("sub-{name}"),
            is_default,
        }
    }

    #[test]
    fn default_instance_prefers_flagged_entry() {
        let cfg = config_with_azure(vec![
            azure_inst("first", false),
            azure_inst("second", true),
            azure_inst("third", false),
        ]);

        let inst = cfg.default_azure_instance().unwrap();
        assert_eq!(inst.name, "second");
    }

    #[test]
    fn default_instance_falls_back_to_first() {
        let cfg = config_with_azure(vec![azure_inst("first", false), azure_inst("second", false)]);

        let inst = cfg.default_azure_instance().unwrap();
        assert_eq!(inst.name, "first");
    }

    #[test]
    fn default_instance_fails_on_empty_list() {
        let cfg = config_with_azure(vec![]);
        let err = cfg.default_azure_instance().unwrap_err();
        assert!(matches!(err, ConfigError::NoInstances { kind } if kind == "azure"));
    }

    #[test]
    fn default_instance_fails_when_unconfigured() {
        let cfg = config_with_azure(vec![]);
        let err = cfg.default_hashicorp_instance().unwrap_err();
        assert!(matches!(err, ConfigError::NotConfigured { kind } if kind == "hashicorp"));
    }

    #[test]
    fn instance_lookup_by_name() {
        let cfg = config_with_azure(vec![azure_inst("prod", false), azure_inst("dev", true)]);

        assert_eq!(cfg.azure_instance("prod").unwrap().name, "prod");

        let err = cfg.azure_instance("staging").unwrap_err();
        assert!(matches!(err, ConfigError::InstanceNotFound { name, .. } if name == "staging"));
    }

    #[test]
    fn multiple_defaults_return_first_match() {
        let cfg = config_with_azure(vec![
            azure_inst("a", false),
            azure_inst("b", true),
            azure_inst("c", true),
        ]);

        assert_eq!(cfg.default_azure_instance().unwrap().name, "b");
    }

    #[test]
    fn enabled_providers_reflect_blocks() {
        let cfg = config_with_azure(vec![azure_inst("prod", true)]);
        assert_eq!(cfg.enabled_providers(), vec!["azure"]);
        assert!(cfg.is_provider_enabled("azure"));
        assert!(!cfg.is_provider_enabled("hashicorp"));
        assert!(!cfg.is_provider_enabled("unknown"));
    }

    #[test]
    fn provider_settings_from_named_instance() {
        let mut cfg = config_with_azure(vec![azure_inst("prod", true)]);
        cfg.providers.hashicorp = Some(HashicorpConfig {
            enabled: true,
            instances: vec![HashicorpInstance {
                name: "main".to_string(),
                address: "https://vault.example.com".to_string(),
                token: "tok".to_string(),
                namespace: "team-a".to_string(),
                is_default: true,
            }],
        });

        let settings = cfg.provider_settings("hashicorp", Some("main")).unwrap();
        assert_eq!(settings.get("address"), Some("https://vault.example.com"));
        assert_eq!(settings.get("token"), Some("tok"));
        assert_eq!(settings.get("namespace"), Some("team-a"));

        let settings = cfg.provider_settings("azure", None).unwrap();
        assert_eq!(settings.get("subscription_id"), Some("sub-prod"));
    }

    #[test]
    fn provider_settings_rejects_unknown_provider() {
        let cfg = Config::default();
        let err = cfg.provider_settings("gcp", None).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownProvider(name) if name == "gcp"));
    }

    #[test]
    fn fzf_hints_round_trip() {
        let yaml = "fzf:\n  height: \"80%\"\n  border: sharp\n  preview: true\n";
        let cfg: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.fzf.height, "80%");
        assert_eq!(cfg.fzf.border, "sharp");
        assert!(cfg.fzf.preview);

        let out = serde_yaml::to_string(&cfg).unwrap();
        let reparsed: Config = serde_yaml::from_str(&out).unwrap();
        assert_eq!(reparsed.fzf, cfg.fzf);
    }

    #[test]
    fn absent_blocks_get_builtin_defaults() {
        let cfg: Config = serde_yaml::from_str("defaults:\n  provider: azure\n").unwrap();
        assert!(cfg.is_provider_enabled("azure"));
        assert!(cfg.is_provider_enabled("hashicorp"));
        assert_eq!(cfg.fzf.height, "40%");
        assert_eq!(cfg.fzf.border, "rounded");
        assert!(!cfg.fzf.preview);
        assert!(cfg.filters.enabled_only);
    }
}
