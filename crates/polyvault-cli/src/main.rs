//! polyvault: a multi-provider CLI for secret management
//!
//! Provides a unified interface for browsing and retrieving secrets from
//! Azure Key Vault and HashiCorp Vault. Invoked by the fzf-tmux plugin, which
//! handles interactive selection; this binary only lists and fetches.

mod clipboard;
mod commands;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use polyvault_core::providers::{azure, hashicorp};
use polyvault_core::{
    AzureProvider, CancellationToken, HashicorpProvider, Provider, ProviderRegistry,
};
use tracing_subscriber::EnvFilter;

use output::OutputFormat;

#[derive(Parser)]
#[command(
    name = "polyvault",
    version,
    about = "A multi-provider CLI for secret management",
    long_about = "Polyvault provides a unified interface for browsing and retrieving \
                  secrets from Azure Key Vault, HashiCorp Vault, and more."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List available secret providers
    ListProviders {
        #[arg(short, long, value_enum, default_value = "plain")]
        format: OutputFormat,
    },

    /// List all vaults from a provider
    ListVaults {
        #[command(flatten)]
        target: Target,
        #[arg(short, long, value_enum, default_value = "plain")]
        format: OutputFormat,
    },

    /// List all secrets in a vault
    ListSecrets {
        #[command(flatten)]
        target: Target,
        /// Vault name
        #[arg(short, long)]
        vault: String,
        #[arg(short, long, value_enum, default_value = "plain")]
        format: OutputFormat,
    },

    /// Get a secret value
    GetSecret {
        #[command(flatten)]
        target: Target,
        /// Vault name
        #[arg(short, long)]
        vault: String,
        /// Secret name
        #[arg(short, long)]
        name: String,
        /// Copy the value to the clipboard instead of printing it
        #[arg(short, long)]
        copy: bool,
    },

    /// Walk all vaults and retrieve every secret value, grouped by vault
    WalkSecrets {
        #[command(flatten)]
        target: Target,
        /// Vault name (walks every vault when omitted)
        #[arg(short, long)]
        vault: Option<String>,
        #[arg(short, long, value_enum, default_value = "json")]
        format: OutputFormat,
    },
}

/// Provider/instance selection shared by every backend-touching command
#[derive(Args)]
struct Target {
    /// Provider name (azure, hashicorp)
    #[arg(short, long)]
    provider: String,

    /// Instance name (uses the configured default when omitted)
    #[arg(short, long)]
    instance: Option<String>,

    /// Config file path
    #[arg(long)]
    config: Option<PathBuf>,
}

fn build_registry() -> ProviderRegistry {
    let registry = ProviderRegistry::new();
    registry.register(azure::PROVIDER_NAME, |settings| {
        AzureProvider::new(settings).map(|p| Box::new(p) as Box<dyn Provider>)
    });
    registry.register(hashicorp::PROVIDER_NAME, |settings| {
        HashicorpProvider::new(settings).map(|p| Box::new(p) as Box<dyn Provider>)
    });
    registry
}

async fn run(cli: Cli, registry: &ProviderRegistry, cancel: &CancellationToken) -> anyhow::Result<()> {
    match cli.command {
        Command::ListProviders { format } => commands::list_providers(registry, format),
        Command::ListVaults { target, format } => {
            commands::list_vaults(
                registry,
                cancel,
                &target.provider,
                target.instance.as_deref(),
                target.config.as_deref(),
                format,
            )
            .await
        }
        Command::ListSecrets {
            target,
            vault,
            format,
        } => {
            commands::list_secrets(
                registry,
                cancel,
                &target.provider,
                target.instance.as_deref(),
                &vault,
                target.config.as_deref(),
                format,
            )
            .await
        }
        Command::GetSecret {
            target,
            vault,
            name,
            copy,
        } => {
            commands::get_secret(
                registry,
                cancel,
                &target.provider,
                target.instance.as_deref(),
                &vault,
                &name,
                copy,
                target.config.as_deref(),
            )
            .await
        }
        Command::WalkSecrets {
            target,
            vault,
            format,
        } => {
            commands::walk_secrets(
                registry,
                cancel,
                &target.provider,
                target.instance.as_deref(),
                vault.as_deref(),
                target.config.as_deref(),
                format,
            )
            .await
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let registry = build_registry();

    let cancel = CancellationToken::new();
    let ctrl_c_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c_cancel.cancel();
        }
    });

    match run(cli, &registry, &cancel).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_get_secret() {
        let cli = Cli::try_parse_from([
            "polyvault",
            "get-secret",
            "--provider",
            "azure",
            "--vault",
            "kv-prod",
            "--name",
            "db-password",
            "--copy",
        ])
        .unwrap();

        match cli.command {
            Command::GetSecret {
                target,
                vault,
                name,
                copy,
            } => {
                assert_eq!(target.provider, "azure");
                assert_eq!(target.instance, None);
                assert_eq!(vault, "kv-prod");
                assert_eq!(name, "db-password");
                assert!(copy);
            }
            _ => panic!("wrong subcommand"),
        }
    }

    #[test]
    fn builtin_providers_are_registered() {
        let registry = build_registry();
        assert!(registry.is_registered("azure"));
        assert!(registry.is_registered("hashicorp"));
        assert!(!registry.is_registered("gcp"));
    }

    #[test]
    fn walk_secrets_defaults_to_json() {
        let cli = Cli::try_parse_from(["polyvault", "walk-secrets", "--provider", "hashicorp"])
            .unwrap();
        match cli.command {
            Command::WalkSecrets { format, vault, .. } => {
                assert_eq!(format, OutputFormat::Json);
                assert_eq!(vault, None);
            }
            _ => panic!("wrong subcommand"),
        }
    }
}
