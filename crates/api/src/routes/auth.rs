//! Authentication routes

use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap},
    Json,
};
use serde::Deserialize;

use crate::auth::{bearer_token, Credentials, IssuedToken};
use crate::error::{ApiError, ApiResult};
use crate::routes::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login with email and password.
///
/// Failures are deliberately uninformative ("invalid credentials") to avoid
/// account enumeration; only the disabled-account state is distinguishable.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<ApiResponse<IssuedToken>>> {
    let credentials = Credentials {
        email: req.email,
        password: req.password,
    };

    let issued = state.login.login(&credentials).await?;

    Ok(Json(ApiResponse::success("login successful", Some(issued))))
}

/// Logout: revoke the presented bearer token until its natural expiry.
///
/// Not behind `require_auth`: logout only needs an intact signature, and must
/// keep working if the audience/issuer policy changed after the token was
/// issued. Header shape and prior revocation are checked here instead.
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<ApiResponse<()>>> {
    if !headers.contains_key(AUTHORIZATION) {
        return Err(ApiError::TokenMissing);
    }
    let token = bearer_token(&headers).ok_or(ApiError::TokenMalformed)?;

    if state.auth.revocations.is_revoked(token).await? {
        return Err(ApiError::TokenRevoked);
    }

    state.logout.logout(token).await?;

    Ok(Json(ApiResponse::success("logged out", None)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use sqlx::postgres::PgPoolOptions;
    use std::sync::Arc;
    use tower::ServiceExt;

    use crate::auth::MemoryRevocationStore;
    use crate::config::Config;
    use crate::routes;
    use crate::state::AppState;

    /// Full-router state backed by an in-memory revocation store and a lazy
    /// (never-connected) database pool: the logout path touches neither.
    fn test_state() -> AppState {
        let config = Config {
            bind_address: "127.0.0.1:0".to_string(),
            database_url: "postgres://localhost/unused".to_string(),
            database_max_connections: 1,
            redis_url: "redis://localhost/unused".to_string(),
            jwt_secret: "test-secret-key-at-least-32-chars!!".to_string(),
            jwt_issuer: "auth-service".to_string(),
            jwt_audience: "store-client".to_string(),
            jwt_expiry_seconds: 300,
            bcrypt_cost: 4,
            login_min_response_ms: 10,
            cors_allowed_origin: None,
        };
        let pool = PgPoolOptions::new()
            .connect_lazy(&config.database_url)
            .unwrap();
        AppState::new(config, pool, Arc::new(MemoryRevocationStore::new()))
    }

    async fn post_logout(state: AppState, authorization: Option<&str>) -> (StatusCode, String) {
        let router = routes::router(state);
        let mut request = Request::builder().method("POST").uri("/logout");
        if let Some(value) = authorization {
            request = request.header("Authorization", value);
        }
        let response = router
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_logout_without_header_is_401() {
        let (status, body) = post_logout(test_state(), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.contains("token missing"), "body was {body}");
    }

    #[tokio::test]
    async fn test_logout_with_malformed_header_is_401() {
        let (status, body) = post_logout(test_state(), Some("InvalidTokenFormat")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(
            body.contains("invalid authorization header format"),
            "body was {body}"
        );
    }

    #[tokio::test]
    async fn test_logout_then_second_logout_sees_revocation() {
        let state = test_state();
        let token = state.auth.codec.issue(7, "user@x.com").unwrap();
        let header = format!("Bearer {token}");

        let (status, body) = post_logout(state.clone(), Some(&header)).await;
        assert_eq!(status, StatusCode::OK, "body was {body}");
        assert!(body.contains("logged out"), "body was {body}");

        // The same token is now refused: the store observed the revocation
        let (status, body) = post_logout(state, Some(&header)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.contains("token revoked"), "body was {body}");
    }
}
