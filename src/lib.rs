//! Docker credential resolution for Amazon Elastic Container Registry.
//!
//! Given a registry server URL this crate identifies the target ECR registry,
//! obtains a short-lived authorization token, decodes it into a
//! username/password pair, and caches it to avoid redundant service calls.
//! Stale cached tokens are kept as a degraded fallback for transient service
//! outages.

pub mod cache;
pub mod client;
pub mod ecr;
pub mod error;
pub mod registry;
pub mod settings;
pub mod token;

pub use cache::{AuthEntry, CredentialCache, InMemoryCredentialCache};
pub use client::{CredentialClient, RawToken, TokenSource};
pub use ecr::EcrTokenSource;
pub use error::EcrError;
pub use registry::{extract_registry, Registry};
pub use settings::Settings;
pub use token::{decode_token, RegistryCredentials};

use anyhow::Result;
use std::sync::Arc;

/// Build a credential client wired to the ECR service and an in-memory cache
pub async fn credential_client(settings: &Settings) -> Result<CredentialClient> {
    let token_source = Arc::new(EcrTokenSource::new(&settings.aws).await?);
    let cache = Arc::new(InMemoryCredentialCache::new(settings.cache.max_entries));
    Ok(CredentialClient::new(token_source, cache))
}
