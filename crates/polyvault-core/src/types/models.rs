//! Data models shared by all secret providers

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A vault: a named grouping of secrets within one backend
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Vault {
    /// Vault name as reported by the backend
    pub name: String,
    /// Provider that owns the vault (e.g. "azure", "hashicorp")
    pub provider: String,
    /// Backend-specific metadata (location, mount type, ...)
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, String>,
}

impl Vault {
    /// Create a vault with no metadata
    pub fn new(name: impl Into<String>, provider: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            provider: provider.into(),
            metadata: HashMap::new(),
        }
    }
}

/// A secret entry. Listing never carries the value
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Secret {
    pub name: String,
    #[serde(rename = "vault")]
    pub vault_name: String,
    pub provider: String,
    #[serde(default)]
    pub enabled: bool,
}

/// A secret's name plus its resolved plaintext value
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SecretValue {
    pub name: String,
    pub value: String,
    #[serde(rename = "vault")]
    pub vault_name: String,
    pub provider: String,
}

impl std::fmt::Display for SecretValue {
    // Never render the value through Display; error paths format these
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.vault_name, self.name)
    }
}
