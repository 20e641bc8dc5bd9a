//! Request authentication middleware

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::auth::jwt::JwtCodec;
use crate::auth::revocation::RevocationStore;
use crate::error::ApiError;

/// Dependencies of the auth gate, injected at startup.
#[derive(Clone)]
pub struct AuthState {
    pub codec: Arc<JwtCodec>,
    pub revocations: Arc<dyn RevocationStore>,
}

/// Verified identity attached to the request after the gate passes.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i64,
    pub email: String,
    pub jti: String,
}

/// Extract the token from a `Bearer <token>` authorization header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Gate for protected routes, short-circuiting on the first failure:
/// header present, bearer-formed, not revoked, signature/expiry/audience/
/// issuer valid, numeric `user_id` claim. On success the verified
/// [`AuthUser`] is attached to the request and the inner handler runs.
///
/// The revocation check runs before full validation. A token revoked
/// concurrently with an in-flight request may still be accepted for that one
/// request; revocation is eventual, not linearizable.
pub async fn require_auth(
    State(auth): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    let Some(header) = header else {
        return Err(ApiError::TokenMissing);
    };

    let token = header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(ApiError::TokenMalformed)?;

    let revoked = auth.revocations.is_revoked(token).await.map_err(|e| {
        tracing::error!(error = %e, "revocation check failed");
        ApiError::RevocationStoreUnavailable
    })?;
    if revoked {
        return Err(ApiError::TokenRevoked);
    }

    let claims = auth.codec.validate(token)?;

    // Claims are external-format data; the id is re-validated structurally
    // even after the signature check passed
    let user_id: i64 = claims.user_id.parse().map_err(|_| {
        tracing::warn!(jti = %claims.jti, "token carries non-numeric user_id claim");
        ApiError::TokenInvalid
    })?;

    request.extensions_mut().insert(AuthUser {
        user_id,
        email: claims.email,
        jti: claims.jti,
    });

    Ok(next.run(request).await)
}
