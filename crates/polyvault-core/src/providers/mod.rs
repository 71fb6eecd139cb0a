//! Secret provider implementations
//!
//! ## Architecture
//!
//! Every backend implements the [`Provider`] trait, so the command layer never
//! branches on backend identity after construction. Providers are built
//! through a [`ProviderRegistry`] from a loosely-typed [`ProviderSettings`]
//! bag; each backend converts its expected keys into typed fields and fails
//! fast on missing ones.
//!
//! The `MockProvider` is kept for testing purposes.

pub mod azure;
pub mod hashicorp;
pub mod mock;

mod error;
mod registry;
mod traits;

pub use error::{ProviderError, ProviderResult};
pub use registry::{ProviderConstructor, ProviderRegistry};
pub use traits::{Feature, Provider, ProviderSettings};

pub use azure::AzureProvider;
pub use hashicorp::HashicorpProvider;
pub use mock::MockProvider;
