//! Session revocation store: a TTL'd deny-list keyed by session id.
//!
//! Logout and refresh-rotation write session ids here; the authorization gate
//! reads on every protected request. Entries carry a TTL matching the
//! credential's remaining lifetime, so the store stays small without any
//! sweeper: once the credential has expired on its own, the entry is useless
//! and Redis drops it.
//!
//! The trait keeps the gate independent of the backing store. Production uses
//! Redis through a cloned `ConnectionManager`; tests use the in-memory map.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use redis::aio::ConnectionManager;

/// Floor for revocation TTLs. Revoking an already-expired credential still
/// leaves a short-lived tombstone, covering clock skew between this service
/// and whatever validated the credential last.
pub const MIN_REVOCATION_TTL_SECS: u64 = 300;

/// Redis key prefix for revoked session ids.
const KEY_PREFIX: &str = "assetdesk:revoked:session:";

/// A revocation store failure. The gate treats any failure as "revoked"
/// (fail closed), so this only surfaces directly on the revoke path.
#[derive(Debug, thiserror::Error)]
pub enum RevocationError {
    #[error("revocation store error: {0}")]
    Store(String),
}

/// TTL'd key-value deny-list for session ids.
#[async_trait]
pub trait RevocationStore: Send + Sync {
    /// Whether the session id has a live revocation entry.
    async fn is_revoked(&self, session_id: &str) -> Result<bool, RevocationError>;

    /// Record a revocation entry that expires after `ttl`.
    async fn revoke(&self, session_id: &str, ttl: Duration) -> Result<(), RevocationError>;
}

/// Compute the TTL for a revocation entry from the credential's expiry.
///
/// The entry must outlive the credential (after `exp` the validator rejects
/// on expiry alone), so the TTL is the remaining lifetime, floored at
/// [`MIN_REVOCATION_TTL_SECS`].
pub fn revocation_ttl(expires_at_secs: i64, now_secs: i64) -> Duration {
    let remaining = expires_at_secs.saturating_sub(now_secs).max(0) as u64;
    Duration::from_secs(remaining.max(MIN_REVOCATION_TTL_SECS))
}

// ---------------------------------------------------------------------------
// Redis implementation
// ---------------------------------------------------------------------------

/// Redis-backed revocation store.
///
/// `ConnectionManager` multiplexes a single connection and reconnects on
/// failure; cloning it per call is the supported usage pattern.
#[derive(Clone)]
pub struct RedisRevocationStore {
    manager: ConnectionManager,
}

impl RedisRevocationStore {
    /// Connect to Redis and set up the managed connection.
    pub async fn connect(url: &str) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(url)?;
        let manager = ConnectionManager::new(client).await?;
        Ok(Self { manager })
    }

    fn key(session_id: &str) -> String {
        format!("{KEY_PREFIX}{session_id}")
    }
}

#[async_trait]
impl RevocationStore for RedisRevocationStore {
    async fn is_revoked(&self, session_id: &str) -> Result<bool, RevocationError> {
        let mut conn = self.manager.clone();
        let exists: bool = redis::cmd("EXISTS")
            .arg(Self::key(session_id))
            .query_async(&mut conn)
            .await
            .map_err(|e| RevocationError::Store(e.to_string()))?;
        Ok(exists)
    }

    async fn revoke(&self, session_id: &str, ttl: Duration) -> Result<(), RevocationError> {
        let mut conn = self.manager.clone();
        redis::cmd("SET")
            .arg(Self::key(session_id))
            .arg("1")
            .arg("EX")
            .arg(ttl.as_secs().max(1))
            .query_async::<_, ()>(&mut conn)
            .await
            .map_err(|e| RevocationError::Store(e.to_string()))?;

        tracing::info!(ttl_secs = ttl.as_secs(), "Session revoked");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// In-memory implementation
// ---------------------------------------------------------------------------

/// In-memory revocation store for tests and single-process setups: a
/// mutex-guarded map of session id to entry deadline. Expired entries are
/// dropped lazily on lookup.
#[derive(Debug, Default)]
pub struct InMemoryRevocationStore {
    entries: Mutex<HashMap<String, Instant>>,
}

impl InMemoryRevocationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RevocationStore for InMemoryRevocationStore {
    async fn is_revoked(&self, session_id: &str) -> Result<bool, RevocationError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| RevocationError::Store("lock poisoned".to_string()))?;
        match entries.get(session_id) {
            Some(deadline) if *deadline > Instant::now() => Ok(true),
            Some(_) => {
                entries.remove(session_id);
                Ok(false)
            }
            None => Ok(false),
        }
    }

    async fn revoke(&self, session_id: &str, ttl: Duration) -> Result<(), RevocationError> {
        let deadline = Instant::now() + ttl;
        self.entries
            .lock()
            .map_err(|_| RevocationError::Store("lock poisoned".to_string()))?
            .insert(session_id.to_string(), deadline);
        Ok(())
    }
}
