//! Layered configuration: built-in defaults < config file < environment
//!
//! A `Config` is loaded once per command invocation and read-only afterwards.
//! Command-line flags form the highest precedence layer and are applied by the
//! command layer, not here.

mod error;
mod loader;
mod types;

pub use error::{ConfigError, ConfigResult};
pub use loader::{default_config_path, ENV_PREFIX};
pub use types::{
    AzureConfig, AzureInstance, Config, Defaults, Filters, FzfConfig, HashicorpConfig,
    HashicorpInstance, Providers,
};
