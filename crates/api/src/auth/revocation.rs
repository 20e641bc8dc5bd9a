//! Token revocation store
//!
//! Logout writes the presented token here with a TTL equal to its remaining
//! lifetime; the middleware consults it before accepting any bearer token.
//! Entries self-expire with the token they block, so the store never grows
//! past the set of live revoked sessions.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Instant;
use time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum RevocationError {
    #[error("revocation store unavailable: {0}")]
    Unavailable(String),
    #[error("revocation ttl must be positive")]
    InvalidTtl,
}

/// TTL-capable keyed store marking specific token strings as revoked.
///
/// `is_revoked` must observe any `revoke` that happened-before it; the store
/// is the single source of truth, with no local caching in front of it.
#[async_trait]
pub trait RevocationStore: Send + Sync {
    async fn revoke(&self, token: &str, ttl: Duration) -> Result<(), RevocationError>;
    async fn is_revoked(&self, token: &str) -> Result<bool, RevocationError>;
}

/// Key derived from the exact token string. Hashing keeps keys fixed-size
/// and keeps full tokens out of the store and its logs.
fn revocation_key(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    format!("revoked:{}", hex::encode(digest))
}

/// Redis-backed revocation store shared by all request tasks.
#[derive(Clone)]
pub struct RedisRevocationStore {
    conn: ConnectionManager,
}

impl RedisRevocationStore {
    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl RevocationStore for RedisRevocationStore {
    async fn revoke(&self, token: &str, ttl: Duration) -> Result<(), RevocationError> {
        let seconds = ttl.whole_seconds();
        if seconds < 1 {
            return Err(RevocationError::InvalidTtl);
        }

        let mut conn = self.conn.clone();
        let () = conn
            .set_ex(revocation_key(token), 1u8, seconds as u64)
            .await
            .map_err(|e| RevocationError::Unavailable(e.to_string()))?;
        Ok(())
    }

    async fn is_revoked(&self, token: &str) -> Result<bool, RevocationError> {
        let mut conn = self.conn.clone();
        conn.exists(revocation_key(token))
            .await
            .map_err(|e| RevocationError::Unavailable(e.to_string()))
    }
}

/// In-process revocation store: a mutexed map of expiry instants, reaped
/// lazily on read. Used by the test suite; also serves single-process
/// deployments that run without Redis.
#[derive(Default)]
pub struct MemoryRevocationStore {
    entries: Mutex<HashMap<String, Instant>>,
}

impl MemoryRevocationStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Instant>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl RevocationStore for MemoryRevocationStore {
    async fn revoke(&self, token: &str, ttl: Duration) -> Result<(), RevocationError> {
        if ttl <= Duration::ZERO {
            return Err(RevocationError::InvalidTtl);
        }
        let expires_at = Instant::now()
            + std::time::Duration::from_millis(ttl.whole_milliseconds().max(1) as u64);
        self.lock().insert(revocation_key(token), expires_at);
        Ok(())
    }

    async fn is_revoked(&self, token: &str) -> Result<bool, RevocationError> {
        let now = Instant::now();
        let mut entries = self.lock();
        entries.retain(|_, expires_at| *expires_at > now);
        Ok(entries.contains_key(&revocation_key(token)))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_revoke_and_check() {
        let store = MemoryRevocationStore::new();

        assert!(!store.is_revoked("token-a").await.unwrap());
        store.revoke("token-a", Duration::minutes(5)).await.unwrap();
        assert!(store.is_revoked("token-a").await.unwrap());
        assert!(!store.is_revoked("token-b").await.unwrap());
    }

    #[tokio::test]
    async fn test_memory_store_entry_expires() {
        let store = MemoryRevocationStore::new();
        store
            .revoke("short-lived", Duration::milliseconds(30))
            .await
            .unwrap();
        assert!(store.is_revoked("short-lived").await.unwrap());

        tokio::time::sleep(std::time::Duration::from_millis(60)).await;
        assert!(!store.is_revoked("short-lived").await.unwrap());
    }

    #[tokio::test]
    async fn test_non_positive_ttl_rejected() {
        let store = MemoryRevocationStore::new();
        assert!(matches!(
            store.revoke("t", Duration::ZERO).await,
            Err(RevocationError::InvalidTtl)
        ));
        assert!(matches!(
            store.revoke("t", Duration::seconds(-10)).await,
            Err(RevocationError::InvalidTtl)
        ));
    }

    #[test]
    fn test_revocation_key_is_stable_and_opaque() {
        let key = revocation_key("some.jwt.token");
        assert_eq!(key, revocation_key("some.jwt.token"));
        assert!(key.starts_with("revoked:"));
        // 32-byte digest, hex encoded
        assert_eq!(key.len(), "revoked:".len() + 64);
        assert!(!key.contains("some.jwt.token"));
    }
}
