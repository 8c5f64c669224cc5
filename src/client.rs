use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info};

use crate::cache::{AuthEntry, CredentialCache};
use crate::error::EcrError;
use crate::registry::extract_registry;
use crate::token::{decode_token, RegistryCredentials};

/// An authorization token as returned by the remote token service
#[derive(Debug, Clone)]
pub struct RawToken {
    /// Base64 authorization token
    pub authorization_token: String,
    /// Registry endpoint the token is valid for
    pub proxy_endpoint: String,
    /// Expiry reported by the service
    pub expires_at: DateTime<Utc>,
}

/// Source of fresh authorization tokens
///
/// `None` requests a token for the default registry of the calling identity.
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn fetch_token(&self, registry_id: Option<&str>) -> Result<RawToken, EcrError>;
}

/// Resolves docker login credentials for ECR registries
///
/// Consults the credential cache before going to the token source, and falls
/// back to a stale cache entry when the token source is unavailable.
pub struct CredentialClient {
    token_source: Arc<dyn TokenSource>,
    cache: Arc<dyn CredentialCache>,
}

impl CredentialClient {
    pub fn new(token_source: Arc<dyn TokenSource>, cache: Arc<dyn CredentialCache>) -> Self {
        Self {
            token_source,
            cache,
        }
    }

    /// Get credentials for a registry server URL
    ///
    /// URL parsing errors propagate unchanged; only ECR server URLs are
    /// accepted.
    pub async fn get_credentials(
        &self,
        server_url: &str,
    ) -> Result<RegistryCredentials, EcrError> {
        let registry = extract_registry(server_url)?;
        debug!(
            registry = %registry.id,
            region = %registry.region,
            server_url = %server_url,
            "Retrieving credentials"
        );
        self.get_credentials_by_registry_id(&registry.id).await
    }

    /// Get credentials for a registry ID
    ///
    /// Fast path: a valid cache entry is decoded and returned without a
    /// remote call. On a miss or a stale entry the token source is called
    /// once; if that fails and any prior entry exists (valid or not), the
    /// stale entry is decoded and returned rather than failing the caller.
    pub async fn get_credentials_by_registry_id(
        &self,
        registry_id: &str,
    ) -> Result<RegistryCredentials, EcrError> {
        let cached = self.cache.get(registry_id);
        if let Some(entry) = &cached {
            if entry.is_valid(Utc::now()) {
                debug!(registry = %registry_id, "Using cached token");
                return decode_token(&entry.authorization_token, &entry.proxy_endpoint);
            }
            debug!(
                requested_at = %entry.requested_at,
                expires_at = %entry.expires_at,
                "Cached token is no longer valid"
            );
        }

        match self.fetch_and_cache(Some(registry_id)).await {
            Ok(credentials) => Ok(credentials),
            // Stale-token fallback: a transient service failure must not
            // break a caller that already had some credential. Entries are
            // invalidated before their real expiry, so the fallback token
            // may still be accepted.
            Err(err) => match cached {
                Some(entry) => {
                    info!(error = %err, "Error fetching authorization token, falling back to cached token");
                    decode_token(&entry.authorization_token, &entry.proxy_endpoint)
                }
                None => Err(err),
            },
        }
    }

    /// Get the best known credentials for every cached registry
    ///
    /// Entries that fail to decode are skipped. If nothing usable is cached,
    /// a single token is fetched for the default registry instead.
    pub async fn list_credentials(&self) -> Result<Vec<RegistryCredentials>, EcrError> {
        let mut credentials = Vec::new();
        for entry in self.cache.list() {
            match decode_token(&entry.authorization_token, &entry.proxy_endpoint) {
                Ok(c) => credentials.push(c),
                Err(err) => {
                    debug!(error = %err, proxy_endpoint = %entry.proxy_endpoint, "Could not decode cached token")
                }
            }
        }

        if credentials.is_empty() {
            debug!("No cached credentials, fetching token for default registry");
            credentials.push(self.fetch_and_cache(None).await?);
        }

        Ok(credentials)
    }

    /// Fetch a fresh token and replace the cache entry for its registry
    ///
    /// The cache key is re-derived from the proxy endpoint the service
    /// returned, never taken from the caller, so a token is only ever cached
    /// under the registry it was actually issued for.
    async fn fetch_and_cache(
        &self,
        registry_id: Option<&str>,
    ) -> Result<RegistryCredentials, EcrError> {
        match registry_id {
            Some(id) => debug!(registry = %id, "Fetching authorization token"),
            None => debug!("Fetching authorization token for default registry"),
        }
        let raw = self.token_source.fetch_token(registry_id).await?;

        let registry = extract_registry(&raw.proxy_endpoint)
            .map_err(|_| EcrError::InvalidProxyEndpoint(raw.proxy_endpoint.clone()))?;

        let credentials = decode_token(&raw.authorization_token, &raw.proxy_endpoint)?;

        self.cache.set(
            &registry.id,
            AuthEntry {
                authorization_token: raw.authorization_token,
                requested_at: Utc::now(),
                expires_at: raw.expires_at,
                proxy_endpoint: raw.proxy_endpoint,
            },
        );

        Ok(credentials)
    }
}
