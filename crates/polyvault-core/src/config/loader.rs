//! Config loading: default search path or explicit file, environment overlay,
//! `${VAR}` substitution, validation
//!
//! Precedence (highest to lowest): environment variable > config file >
//! built-in default. Command-line flags sit above all three and are applied by
//! the command layer.

use std::env;
use std::path::{Path, PathBuf};

use super::error::{ConfigError, ConfigResult};
use super::types::Config;

/// Prefix for configuration environment variables, e.g.
/// `POLYVAULT_PROVIDERS_AZURE_ENABLED` overrides `providers.azure.enabled`
pub const ENV_PREFIX: &str = "POLYVAULT";

const CONFIG_DIR: &str = "polyvault";
const CONFIG_FILE: &str = "config.yaml";

/// Default config file location: `<user config dir>/polyvault/config.yaml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
}

impl Config {
    /// Load configuration from the default search path
    ///
    /// A missing config file is not an error; defaults plus the environment
    /// overlay still apply.
    pub fn load() -> ConfigResult<Config> {
        let mut config = match default_config_path() {
            Some(path) if path.exists() => parse_file(&path)?,
            _ => Config::default(),
        };

        finish(&mut config)?;
        Ok(config)
    }

    /// Load configuration from an explicit file path; the file must exist and
    /// parse, no fallback
    pub fn load_from_file(path: impl AsRef<Path>) -> ConfigResult<Config> {
        let mut config = parse_file(path.as_ref())?;
        finish(&mut config)?;
        Ok(config)
    }
}

fn parse_file(path: &Path) -> ConfigResult<Config> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn finish(config: &mut Config) -> ConfigResult<()> {
    apply_env_overrides(config);
    substitute_env_vars(config);
    validate(config)
}

/// Overlay `POLYVAULT_*` variables on top of file values. Keys follow the
/// config paths with dots replaced by underscores.
fn apply_env_overrides(config: &mut Config) {
    if let Some(value) = env_string("DEFAULTS_PROVIDER") {
        config.defaults.provider = Some(value);
    }
    if let Some(value) = env_string("DEFAULTS_VAULT") {
        config.defaults.vault = Some(value);
    }

    if let Some(value) = env_string("FZF_HEIGHT") {
        config.fzf.height = value;
    }
    if let Some(value) = env_string("FZF_BORDER") {
        config.fzf.border = value;
    }
    if let Some(value) = env_bool("FZF_PREVIEW") {
        config.fzf.preview = value;
    }

    if let Some(value) = env_bool("FILTERS_ENABLED_ONLY") {
        config.filters.enabled_only = value;
    }

    if let Some(value) = env_bool("PROVIDERS_AZURE_ENABLED") {
        if let Some(block) = config.providers.azure.as_mut() {
            block.enabled = value;
        }
    }
    if let Some(value) = env_bool("PROVIDERS_HASHICORP_ENABLED") {
        if let Some(block) = config.providers.hashicorp.as_mut() {
            block.enabled = value;
        }
    }
}

fn env_string(key: &str) -> Option<String> {
    env::var(format!("{ENV_PREFIX}_{key}"))
        .ok()
        .filter(|value| !value.is_empty())
}

fn env_bool(key: &str) -> Option<bool> {
    let value = env_string(key)?;
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" => Some(false),
        other => {
            tracing::warn!(key, value = other, "ignoring non-boolean override");
            None
        }
    }
}

/// Expand `${VAR}` / `$VAR` tokens in every string field of every instance.
/// Unset or empty variables leave the literal token in place.
fn substitute_env_vars(config: &mut Config) {
    if let Some(block) = config.providers.azure.as_mut() {
        for inst in &mut block.instances {
            inst.subscription_id = expand(&inst.subscription_id);
        }
    }

    if let Some(block) = config.providers.hashicorp.as_mut() {
        for inst in &mut block.instances {
            inst.address = expand(&inst.address);
            inst.token = expand(&inst.token);
            inst.namespace = expand(&inst.namespace);
        }
    }
}

fn expand(value: &str) -> String {
    shellexpand::env_with_context_no_errors(value, |var| {
        env::var(var).ok().filter(|v| !v.is_empty())
    })
    .into_owned()
}

/// Structural validation of enabled provider kinds
fn validate(config: &Config) -> ConfigResult<()> {
    if let Some(block) = config.providers.azure.as_ref().filter(|b| b.enabled) {
        if block.instances.is_empty() {
            return Err(ConfigError::EmptyInstances {
                kind: "azure".to_string(),
            });
        }

        for (index, inst) in block.instances.iter().enumerate() {
            if inst.name.is_empty() {
                return Err(ConfigError::UnnamedInstance {
                    kind: "azure".to_string(),
                    index,
                });
            }
            if inst.subscription_id.is_empty() {
                return Err(ConfigError::MissingField {
                    kind: "azure".to_string(),
                    instance: inst.name.clone(),
                    field: "subscription_id",
                });
            }
        }
    }

    if let Some(block) = config.providers.hashicorp.as_ref().filter(|b| b.enabled) {
        if block.instances.is_empty() {
            return Err(ConfigError::EmptyInstances {
                kind: "hashicorp".to_string(),
            });
        }

        for (index, inst) in block.instances.iter().enumerate() {
            if inst.name.is_empty() {
                return Err(ConfigError::UnnamedInstance {
                    kind: "hashicorp".to_string(),
                    index,
                });
            }
            if inst.address.is_empty() {
                return Err(ConfigError::MissingField {
                    kind: "hashicorp".to_string(),
                    instance: inst.name.clone(),
                    field: "address",
                });
            }
            if inst.token.is_empty() {
                return Err(ConfigError::MissingField {
                    kind: "hashicorp".to_string(),
                    instance: inst.name.clone(),
                    field: "token",
                });
            }
        }
    }

    Ok(())
}
