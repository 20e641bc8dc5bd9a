//! Login orchestration: credential validation, account lookup, password
//! verification, token issuance.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

use crate::auth::jwt::JwtCodec;
use crate::auth::password::PasswordHasher;
use crate::users::UserRepository;

/// Transient login input; never persisted or logged in plaintext.
#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Returned once at login; the server keeps no record of it unless revoked.
#[derive(Debug, Serialize)]
pub struct IssuedToken {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum LoginError {
    #[error("{0}")]
    Validation(String),
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("account disabled")]
    AccountDisabled,
    #[error("token generation failed: {0}")]
    TokenGeneration(String),
    #[error(transparent)]
    Repository(sqlx::Error),
}

pub struct LoginService {
    users: Arc<dyn UserRepository>,
    hasher: Arc<PasswordHasher>,
    codec: Arc<JwtCodec>,
    min_response: std::time::Duration,
}

impl LoginService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        hasher: Arc<PasswordHasher>,
        codec: Arc<JwtCodec>,
        min_response: std::time::Duration,
    ) -> Self {
        Self {
            users,
            hasher,
            codec,
            min_response,
        }
    }

    /// Authenticate a credential pair and issue a session token.
    ///
    /// Every outcome is padded to a minimum wall-clock duration so response
    /// latency does not reveal whether the email exists or the password
    /// matched.
    pub async fn login(&self, credentials: &Credentials) -> Result<IssuedToken, LoginError> {
        let start = Instant::now();
        let result = self.login_inner(credentials).await;

        let elapsed = start.elapsed();
        if elapsed < self.min_response {
            tokio::time::sleep(self.min_response - elapsed).await;
        }

        result
    }

    async fn login_inner(&self, credentials: &Credentials) -> Result<IssuedToken, LoginError> {
        validate_credentials(credentials)?;

        let email = credentials.email.trim().to_lowercase();

        let account = self
            .users
            .find_by_email(&email)
            .await
            .map_err(LoginError::Repository)?;

        let Some(account) = account else {
            tracing::warn!("login rejected: unknown email");
            return Err(LoginError::InvalidCredentials);
        };

        if self
            .hasher
            .verify(&account.password_hash, &credentials.password)
            .is_err()
        {
            tracing::warn!(user_id = account.id, "login rejected: password mismatch");
            return Err(LoginError::InvalidCredentials);
        }

        // Disabled-account state is not secret; surfaced distinctly
        if !account.enabled {
            tracing::warn!(user_id = account.id, "login rejected: account disabled");
            return Err(LoginError::AccountDisabled);
        }

        let access_token = self
            .codec
            .issue(account.id, &account.email)
            .map_err(|e| LoginError::TokenGeneration(e.to_string()))?;

        tracing::info!(user_id = account.id, "login succeeded");

        Ok(IssuedToken {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: self.codec.expiry_seconds(),
        })
    }
}

/// Shape checks that fail fast, before any storage access.
fn validate_credentials(credentials: &Credentials) -> Result<(), LoginError> {
    let email = credentials.email.trim();
    if email.is_empty() {
        return Err(LoginError::Validation("email must not be blank".into()));
    }
    if !is_valid_email(email) {
        return Err(LoginError::Validation("email is not valid".into()));
    }
    if credentials.password.is_empty() {
        return Err(LoginError::Validation("password must not be blank".into()));
    }
    if credentials.password.len() < 8 {
        return Err(LoginError::Validation(
            "password must be at least 8 characters".into(),
        ));
    }
    if credentials.password.len() > 72 {
        return Err(LoginError::Validation(
            "password must be at most 72 characters".into(),
        ));
    }
    Ok(())
}

/// Syntactic email check, RFC 5321 length limits.
fn is_valid_email(email: &str) -> bool {
    let email = email.to_lowercase();
    if email.is_empty() || email.len() > 254 {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    if local.is_empty() || local.len() > 64 {
        return false;
    }
    if local.starts_with('.') || local.ends_with('.') || local.contains("..") {
        return false;
    }
    if !local
        .chars()
        .all(|c| c.is_alphanumeric() || ".+-_".contains(c))
    {
        return false;
    }

    if domain.is_empty() || domain.len() > 255 || !domain.contains('.') {
        return false;
    }
    if domain.starts_with('.') || domain.ends_with('.') || domain.contains("..") {
        return false;
    }
    if domain.starts_with('-') || domain.ends_with('-') {
        return false;
    }
    domain.chars().all(|c| c.is_alphanumeric() || ".-".contains(c))
}
