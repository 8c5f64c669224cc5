use chrono::{DateTime, Duration, Utc};
use moka::sync::Cache;
use serde::{Deserialize, Serialize};

/// Entries are treated as expired once half of their requested validity
/// window has elapsed, so a refresh failure still leaves a window of
/// genuinely valid token to fall back on.
const REFRESH_WINDOW_DIVISOR: i32 = 2;

/// A cached authorization token for a single registry ID
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthEntry {
    /// Base64 authorization token as returned by ECR
    pub authorization_token: String,
    /// When the token was requested
    pub requested_at: DateTime<Utc>,
    /// When the token expires according to ECR
    pub expires_at: DateTime<Utc>,
    /// Registry endpoint the token is valid for
    pub proxy_endpoint: String,
}

impl AuthEntry {
    /// Whether the entry is still considered fresh at `now`
    ///
    /// A stale entry is not discarded; it remains available as a degraded
    /// fallback when a refresh fails.
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        let valid_window = self.expires_at - self.requested_at;
        let refresh_at = self.expires_at - valid_window / REFRESH_WINDOW_DIVISOR;
        now < refresh_at
    }
}

/// Store for cached registry credentials, keyed by registry ID
///
/// Implementations must provide read-your-writes consistency per key.
/// Entries are replaced wholesale on every successful token fetch and are
/// never deleted by the credential client; eviction is the store's concern.
pub trait CredentialCache: Send + Sync {
    /// Get the entry for a registry ID, valid or not
    fn get(&self, registry_id: &str) -> Option<AuthEntry>;

    /// Replace the entry for a registry ID
    fn set(&self, registry_id: &str, entry: AuthEntry);

    /// All entries currently resident, in no particular order
    fn list(&self) -> Vec<AuthEntry>;
}

/// In-memory implementation of CredentialCache using Moka cache
///
/// Capacity-bounded only. No time-to-live: staleness is a soft predicate on
/// the entry (`AuthEntry::is_valid`), and stale entries must stay resident
/// to serve as fallbacks.
pub struct InMemoryCredentialCache {
    entries: Cache<String, AuthEntry>,
}

impl InMemoryCredentialCache {
    /// Create a new cache holding at most `max_entries` registries
    pub fn new(max_entries: u64) -> Self {
        Self {
            entries: Cache::builder().max_capacity(max_entries).build(),
        }
    }
}

impl CredentialCache for InMemoryCredentialCache {
    fn get(&self, registry_id: &str) -> Option<AuthEntry> {
        self.entries.get(registry_id)
    }

    fn set(&self, registry_id: &str, entry: AuthEntry) {
        self.entries.insert(registry_id.to_string(), entry);
    }

    fn list(&self) -> Vec<AuthEntry> {
        // Flush pending maintenance so recent inserts are visible to iter()
        self.entries.run_pending_tasks();
        self.entries.iter().map(|(_, entry)| entry).collect()
    }
}
