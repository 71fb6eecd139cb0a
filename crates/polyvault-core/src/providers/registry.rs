//! Provider registry: name to constructor lookup
//!
//! The registry is constructed explicitly at startup and shared by reference,
//! so tests can build a fresh one instead of poking at process-global state.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::error::{ProviderError, ProviderResult};
use super::traits::{Provider, ProviderSettings};

/// Constructor invoked by [`ProviderRegistry::get_provider`]
pub type ProviderConstructor =
    Arc<dyn Fn(&ProviderSettings) -> ProviderResult<Box<dyn Provider>> + Send + Sync>;

/// Concurrency-safe map from provider name to constructor
#[derive(Default)]
pub struct ProviderRegistry {
    constructors: RwLock<HashMap<String, ProviderConstructor>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a constructor under `name`, replacing any existing entry.
    /// Last write wins; the name is not validated.
    pub fn register<F>(&self, name: impl Into<String>, constructor: F)
    where
        F: Fn(&ProviderSettings) -> ProviderResult<Box<dyn Provider>> + Send + Sync + 'static,
    {
        let mut constructors = self.constructors.write().unwrap();
        constructors.insert(name.into(), Arc::new(constructor));
    }

    /// Construct a provider by name
    ///
    /// The constructor runs outside the lock so a slow construction (network
    /// calls, credential resolution) never blocks other registry operations.
    /// Constructor errors propagate unchanged.
    pub fn get_provider(
        &self,
        name: &str,
        settings: &ProviderSettings,
    ) -> ProviderResult<Box<dyn Provider>> {
        let constructor = {
            let constructors = self.constructors.read().unwrap();
            constructors.get(name).cloned()
        };

        match constructor {
            Some(constructor) => constructor(settings),
            None => Err(ProviderError::ProviderNotFound(name.to_string())),
        }
    }

    /// All registered names, in unspecified order. Callers that need stable
    /// output must sort.
    pub fn provider_names(&self) -> Vec<String> {
        let constructors = self.constructors.read().unwrap();
        constructors.keys().cloned().collect()
    }

    /// Existence check without construction
    pub fn is_registered(&self, name: &str) -> bool {
        let constructors = self.constructors.read().unwrap();
        constructors.contains_key(name)
    }
}
