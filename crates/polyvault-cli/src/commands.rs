//! Command handlers: resolve configuration, construct the provider through
//! the registry, run the operation, format the result
//!
//! Data goes to stdout only; warnings and errors go to stderr so the fzf
//! plugin never sees them mixed into selectable output.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Result;
use polyvault_core::{CancellationToken, Config, ProviderRegistry, SecretValue, Vault};

use crate::clipboard;
use crate::output::{formatter, OutputFormat};

/// Load config from an explicit path or the default search path.
///
/// Any load failure falls back to built-in defaults so the browsing commands
/// stay usable on a machine with no config file at all.
fn load_config(path: Option<&Path>) -> Config {
    let result = match path {
        Some(path) => Config::load_from_file(path),
        None => Config::load(),
    };

    match result {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(error = %err, "config unavailable, using built-in defaults");
            Config::default()
        }
    }
}

pub fn list_providers(registry: &ProviderRegistry, format: OutputFormat) -> Result<()> {
    // registry order is unspecified; sort for stable output
    let mut names = registry.provider_names();
    names.sort();

    println!("{}", formatter(format).format_providers(&names)?);
    Ok(())
}

pub async fn list_vaults(
    registry: &ProviderRegistry,
    cancel: &CancellationToken,
    provider_name: &str,
    instance: Option<&str>,
    config_path: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    let config = load_config(config_path);
    let settings = config.provider_settings(provider_name, instance)?;
    let provider = registry.get_provider(provider_name, &settings)?;

    let vaults = provider.list_vaults(cancel).await?;
    println!("{}", formatter(format).format_vaults(&vaults)?);
    Ok(())
}

pub async fn list_secrets(
    registry: &ProviderRegistry,
    cancel: &CancellationToken,
    provider_name: &str,
    instance: Option<&str>,
    vault_name: &str,
    config_path: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    let config = load_config(config_path);
    let settings = config.provider_settings(provider_name, instance)?;
    let provider = registry.get_provider(provider_name, &settings)?;

    let secrets = provider.list_secrets(cancel, vault_name).await?;
    println!("{}", formatter(format).format_secrets(&secrets)?);
    Ok(())
}

pub async fn get_secret(
    registry: &ProviderRegistry,
    cancel: &CancellationToken,
    provider_name: &str,
    instance: Option<&str>,
    vault_name: &str,
    secret_name: &str,
    copy: bool,
    config_path: Option<&Path>,
) -> Result<()> {
    let config = load_config(config_path);
    let settings = config.provider_settings(provider_name, instance)?;
    let provider = registry.get_provider(provider_name, &settings)?;

    let secret = provider.get_secret(cancel, vault_name, secret_name).await?;

    if copy {
        clipboard::copy(&secret.value)?;
        eprintln!("Secret '{secret_name}' copied to clipboard!");
    } else {
        println!("{}", secret.value);
    }

    Ok(())
}

pub async fn walk_secrets(
    registry: &ProviderRegistry,
    cancel: &CancellationToken,
    provider_name: &str,
    instance: Option<&str>,
    vault_name: Option<&str>,
    config_path: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    let config = load_config(config_path);
    let settings = config.provider_settings(provider_name, instance)?;
    let provider = registry.get_provider(provider_name, &settings)?;

    let vaults: Vec<Vault> = match vault_name {
        Some(name) => vec![Vault::new(name, provider_name)],
        None => provider.list_vaults(cancel).await?,
    };

    // Per-vault and per-secret failures are warnings, not fatal; a single
    // unreadable vault should not abort the walk.
    let mut by_vault: BTreeMap<String, Vec<SecretValue>> = BTreeMap::new();
    for vault in &vaults {
        let secrets = match provider.list_secrets(cancel, &vault.name).await {
            Ok(secrets) => secrets,
            Err(err) => {
                eprintln!("Warning: failed to list secrets in vault {}: {err}", vault.name);
                continue;
            }
        };

        let mut values = Vec::new();
        for secret in secrets {
            match provider.get_secret(cancel, &vault.name, &secret.name).await {
                Ok(value) => values.push(value),
                Err(err) => {
                    eprintln!(
                        "Warning: failed to get secret {} in vault {}: {err}",
                        secret.name, vault.name
                    );
                }
            }
        }

        by_vault.insert(vault.name.clone(), values);
    }

    println!("{}", formatter(format).format_walk(&by_vault)?);
    Ok(())
}
