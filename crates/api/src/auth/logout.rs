//! Logout: revoke a session token for exactly its remaining lifetime.

use std::sync::Arc;
use time::Duration;

use crate::auth::jwt::{JwtCodec, TokenError};
use crate::auth::revocation::{RevocationError, RevocationStore};

#[derive(Debug, thiserror::Error)]
pub enum LogoutError {
    #[error("no token presented")]
    MissingToken,
    #[error(transparent)]
    Token(TokenError),
    #[error("token already expired")]
    AlreadyExpired,
    #[error(transparent)]
    Store(RevocationError),
}

pub struct LogoutService {
    codec: Arc<JwtCodec>,
    revocations: Arc<dyn RevocationStore>,
}

impl LogoutService {
    pub fn new(codec: Arc<JwtCodec>, revocations: Arc<dyn RevocationStore>) -> Self {
        Self { codec, revocations }
    }

    /// Revoke the presented token until its natural expiry.
    ///
    /// The token only needs an intact signature: audience/issuer policy may
    /// have changed since issuance and must not prevent killing the session.
    /// An already-expired token is an error, not a no-op success, because
    /// the caller's "kill this session now" intent cannot be honored.
    pub async fn logout(&self, token: &str) -> Result<(), LogoutError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(LogoutError::MissingToken);
        }

        let claims = self.codec.parse(token).map_err(LogoutError::Token)?;
        let remaining = self
            .codec
            .remaining_lifetime(&claims)
            .map_err(LogoutError::Token)?;

        // Sub-second remainders round down to a zero TTL; treat as expired
        if remaining < Duration::seconds(1) {
            return Err(LogoutError::AlreadyExpired);
        }

        // A logout that silently fails to revoke is a security regression;
        // store failures propagate to the caller
        self.revocations
            .revoke(token, remaining)
            .await
            .map_err(LogoutError::Store)?;

        tracing::info!(
            user_id = %claims.user_id,
            jti = %claims.jti,
            ttl_seconds = remaining.whole_seconds(),
            "session token revoked"
        );

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::auth::revocation::MemoryRevocationStore;
    use async_trait::async_trait;
    use std::sync::Mutex;

    const SECRET: &str = "test-secret-key-at-least-32-chars!!";

    fn codec() -> Arc<JwtCodec> {
        Arc::new(JwtCodec::new(
            SECRET,
            "auth-service",
            "store-client",
            Duration::minutes(5),
        ))
    }

    /// Store that records the TTL each revocation was written with.
    #[derive(Default)]
    struct RecordingStore {
        inner: MemoryRevocationStore,
        last_ttl: Mutex<Option<Duration>>,
    }

    #[async_trait]
    impl RevocationStore for RecordingStore {
        async fn revoke(&self, token: &str, ttl: Duration) -> Result<(), RevocationError> {
            *self.last_ttl.lock().unwrap() = Some(ttl);
            self.inner.revoke(token, ttl).await
        }

        async fn is_revoked(&self, token: &str) -> Result<bool, RevocationError> {
            self.inner.is_revoked(token).await
        }
    }

    /// Store whose operations always fail, standing in for a dead backend.
    struct FailingStore;

    #[async_trait]
    impl RevocationStore for FailingStore {
        async fn revoke(&self, _: &str, _: Duration) -> Result<(), RevocationError> {
            Err(RevocationError::Unavailable("connection refused".into()))
        }

        async fn is_revoked(&self, _: &str) -> Result<bool, RevocationError> {
            Err(RevocationError::Unavailable("connection refused".into()))
        }
    }

    #[tokio::test]
    async fn test_logout_revokes_with_remaining_lifetime() {
        let codec = codec();
        let store = Arc::new(RecordingStore::default());
        let service = LogoutService::new(codec.clone(), store.clone());

        let token = codec.issue(42, "user@x.com").unwrap();
        service.logout(&token).await.expect("logout succeeds");

        assert!(store.is_revoked(&token).await.unwrap());

        // TTL tracks the token's remaining lifetime, not a fixed constant
        let ttl = store.last_ttl.lock().unwrap().expect("revoke was called");
        assert!(ttl > Duration::seconds(295), "ttl was {ttl}");
        assert!(ttl <= Duration::seconds(300), "ttl was {ttl}");

        // Validation alone still accepts the token; only the store knows
        assert!(codec.validate(&token).is_ok());
    }

    #[tokio::test]
    async fn test_blank_token_rejected() {
        let service = LogoutService::new(codec(), Arc::new(MemoryRevocationStore::new()));
        assert!(matches!(
            service.logout("   ").await,
            Err(LogoutError::MissingToken)
        ));
    }

    #[tokio::test]
    async fn test_tampered_token_rejected() {
        let service = LogoutService::new(codec(), Arc::new(MemoryRevocationStore::new()));
        let other = JwtCodec::new(
            "another-secret-key-also-32-chars!!!",
            "auth-service",
            "store-client",
            Duration::minutes(5),
        );
        let token = other.issue(1, "a@b.com").unwrap();

        assert!(matches!(
            service.logout(&token).await,
            Err(LogoutError::Token(TokenError::Invalid))
        ));
    }

    #[tokio::test]
    async fn test_expired_token_rejected_not_ignored() {
        let codec = codec();
        let service = LogoutService::new(codec.clone(), Arc::new(MemoryRevocationStore::new()));
        let token = codec
            .issue_with_ttl(1, "a@b.com", Duration::minutes(-1))
            .unwrap();

        assert!(matches!(
            service.logout(&token).await,
            Err(LogoutError::AlreadyExpired)
        ));
    }

    #[tokio::test]
    async fn test_store_failure_is_surfaced() {
        let codec = codec();
        let service = LogoutService::new(codec.clone(), Arc::new(FailingStore));
        let token = codec.issue(1, "a@b.com").unwrap();

        assert!(matches!(
            service.logout(&token).await,
            Err(LogoutError::Store(RevocationError::Unavailable(_)))
        ));
    }

    #[tokio::test]
    async fn test_logout_survives_audience_policy_change() {
        let issuing = Arc::new(JwtCodec::new(
            SECRET,
            "auth-service",
            "old-audience",
            Duration::minutes(5),
        ));
        let current = Arc::new(JwtCodec::new(
            SECRET,
            "auth-service",
            "new-audience",
            Duration::minutes(5),
        ));
        let store = Arc::new(MemoryRevocationStore::new());
        let service = LogoutService::new(current, store.clone());

        let token = issuing.issue(1, "a@b.com").unwrap();
        service.logout(&token).await.expect("logout succeeds");
        assert!(store.is_revoked(&token).await.unwrap());
    }
}
