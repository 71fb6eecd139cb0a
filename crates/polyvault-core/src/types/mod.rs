//! Shared types used across providers and the command layer

mod cancellation;
mod models;

pub use cancellation::CancellationToken;
pub use models::{Secret, SecretValue, Vault};
