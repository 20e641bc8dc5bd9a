//! API error types and handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::auth::jwt::TokenError;
use crate::auth::login::LoginError;
use crate::auth::logout::LogoutError;
use crate::auth::revocation::RevocationError;

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    // Authentication errors
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("account disabled")]
    AccountDisabled,
    #[error("token missing")]
    TokenMissing,
    #[error("invalid authorization header format")]
    TokenMalformed,
    #[error("token expired")]
    TokenExpired,
    #[error("invalid token audience")]
    TokenInvalidAudience,
    #[error("invalid token issuer")]
    TokenInvalidIssuer,
    #[error("token invalid")]
    TokenInvalid,
    #[error("token revoked")]
    TokenRevoked,

    // Validation errors
    #[error("{0}")]
    Validation(String),

    // Resource errors
    #[error("resource not found")]
    NotFound,

    // Internal errors
    #[error("internal auth error")]
    RevocationStoreUnavailable,
    #[error("database error")]
    Database(#[source] sqlx::Error),
    #[error("internal server error")]
    Internal,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::InvalidCredentials
            | ApiError::AccountDisabled
            | ApiError::TokenMissing
            | ApiError::TokenMalformed
            | ApiError::TokenExpired
            | ApiError::TokenInvalidAudience
            | ApiError::TokenInvalidIssuer
            | ApiError::TokenInvalid
            | ApiError::TokenRevoked => StatusCode::UNAUTHORIZED,

            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,

            ApiError::RevocationStoreUnavailable | ApiError::Database(_) | ApiError::Internal => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(json!({
            "status": "error",
            "message": self.to_string(),
        }));

        (status, body).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound,
            other => {
                tracing::error!(error = %other, "database error");
                ApiError::Database(other)
            }
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => ApiError::TokenExpired,
            TokenError::InvalidAudience => ApiError::TokenInvalidAudience,
            TokenError::InvalidIssuer => ApiError::TokenInvalidIssuer,
            TokenError::Invalid | TokenError::ExpirationUnreadable => ApiError::TokenInvalid,
            TokenError::Encoding(msg) => {
                tracing::error!(error = %msg, "token encoding failed");
                ApiError::Internal
            }
        }
    }
}

impl From<RevocationError> for ApiError {
    fn from(err: RevocationError) -> Self {
        tracing::error!(error = %err, "revocation store failure");
        ApiError::RevocationStoreUnavailable
    }
}

impl From<LoginError> for ApiError {
    fn from(err: LoginError) -> Self {
        match err {
            LoginError::Validation(msg) => ApiError::Validation(msg),
            LoginError::InvalidCredentials => ApiError::InvalidCredentials,
            LoginError::AccountDisabled => ApiError::AccountDisabled,
            LoginError::TokenGeneration(msg) => {
                tracing::error!(error = %msg, "token generation failed");
                ApiError::Internal
            }
            LoginError::Repository(err) => err.into(),
        }
    }
}

impl From<LogoutError> for ApiError {
    fn from(err: LogoutError) -> Self {
        match err {
            LogoutError::MissingToken => ApiError::TokenMissing,
            LogoutError::Token(err) => err.into(),
            LogoutError::AlreadyExpired => ApiError::TokenExpired,
            LogoutError::Store(err) => err.into(),
        }
    }
}

/// Result type alias for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
