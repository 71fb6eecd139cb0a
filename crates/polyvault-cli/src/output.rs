//! Output formatting: plain text for piping into the fzf plugin, JSON for
//! structured consumers

use std::collections::BTreeMap;

use anyhow::Result;
use clap::ValueEnum;
use polyvault_core::{Secret, SecretValue, Vault};

/// Output format selected with `--format`
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One item per line
    Plain,
    /// Pretty-printed JSON
    Json,
}

/// Formats data for output; never writes to a stream itself
pub trait Formatter {
    fn format_vaults(&self, vaults: &[Vault]) -> Result<String>;
    fn format_secrets(&self, secrets: &[Secret]) -> Result<String>;
    fn format_providers(&self, providers: &[String]) -> Result<String>;
    fn format_walk(&self, by_vault: &BTreeMap<String, Vec<SecretValue>>) -> Result<String>;
}

pub fn formatter(format: OutputFormat) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Plain => Box::new(PlainFormatter),
        OutputFormat::Json => Box::new(JsonFormatter),
    }
}

/// One name per line
struct PlainFormatter;

impl Formatter for PlainFormatter {
    fn format_vaults(&self, vaults: &[Vault]) -> Result<String> {
        Ok(vaults
            .iter()
            .map(|v| v.name.as_str())
            .collect::<Vec<_>>()
            .join("\n"))
    }

    fn format_secrets(&self, secrets: &[Secret]) -> Result<String> {
        Ok(secrets
            .iter()
            .map(|s| s.name.as_str())
            .collect::<Vec<_>>()
            .join("\n"))
    }

    fn format_providers(&self, providers: &[String]) -> Result<String> {
        Ok(providers.join("\n"))
    }

    fn format_walk(&self, by_vault: &BTreeMap<String, Vec<SecretValue>>) -> Result<String> {
        let mut lines = Vec::new();
        for (vault, secrets) in by_vault {
            for secret in secrets {
                lines.push(format!("{vault}\t{}\t{}", secret.name, secret.value));
            }
        }
        Ok(lines.join("\n"))
    }
}

struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn format_vaults(&self, vaults: &[Vault]) -> Result<String> {
        Ok(serde_json::to_string_pretty(vaults)?)
    }

    fn format_secrets(&self, secrets: &[Secret]) -> Result<String> {
        Ok(serde_json::to_string_pretty(secrets)?)
    }

    fn format_providers(&self, providers: &[String]) -> Result<String> {
        Ok(serde_json::to_string_pretty(providers)?)
    }

    fn format_walk(&self, by_vault: &BTreeMap<String, Vec<SecretValue>>) -> Result<String> {
        Ok(serde_json::to_string_pretty(by_vault)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_secrets() -> Vec<Secret> {
        vec![
            Secret {
                name: "s1".to_string(),
                vault_name: "v1".to_string(),
                provider: "mock".to_string(),
                enabled: true,
            },
            Secret {
                name: "s2".to_string(),
                vault_name: "v1".to_string(),
                provider: "mock".to_string(),
                enabled: true,
            },
        ]
    }

    #[test]
    fn plain_lists_one_name_per_line() {
        let out = formatter(OutputFormat::Plain)
            .format_secrets(&sample_secrets())
            .unwrap();
        assert_eq!(out, "s1\ns2");

        let out = formatter(OutputFormat::Plain)
            .format_providers(&["azure".to_string(), "hashicorp".to_string()])
            .unwrap();
        assert_eq!(out, "azure\nhashicorp");
    }

    #[test]
    fn plain_handles_empty_input() {
        let out = formatter(OutputFormat::Plain).format_vaults(&[]).unwrap();
        assert_eq!(out, "");
    }

    #[test]
    fn json_round_trips_secrets() {
        let out = formatter(OutputFormat::Json)
            .format_secrets(&sample_secrets())
            .unwrap();
        let parsed: Vec<Secret> = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed, sample_secrets());
    }

    #[test]
    fn walk_output_groups_by_vault() {
        let mut by_vault = BTreeMap::new();
        by_vault.insert(
            "v1".to_string(),
            vec![SecretValue {
                name: "s1".to_string(),
                value: "hello".to_string(),
                vault_name: "v1".to_string(),
                provider: "mock".to_string(),
            }],
        );

        let out = formatter(OutputFormat::Json).format_walk(&by_vault).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed["v1"][0]["value"], "hello");

        let out = formatter(OutputFormat::Plain).format_walk(&by_vault).unwrap();
        assert_eq!(out, "v1\ts1\thello");
    }
}
