//! Session token issuance and validation (HS256 JWT)

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

/// Claims embedded in a Storeflow session token.
///
/// Strongly typed: a token whose claims do not deserialize into this shape
/// fails validation outright instead of being defaulted field by field.
/// `sub` and `user_id` both carry the stringified numeric account id so the
/// claims survive generic JWT tooling that expects a string subject.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (stringified account id)
    pub sub: String,
    /// Account id, duplicated as its own claim
    pub user_id: String,
    /// Account email
    pub email: String,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// Expiration (unix seconds)
    pub exp: i64,
    /// Issuer
    pub iss: String,
    /// Audience
    pub aud: String,
    /// JWT ID, unique per issued token
    pub jti: String,
}

/// Issues and validates session tokens.
///
/// Pure function of its inputs plus the static signing configuration;
/// read-only after construction, safe to share across request tasks.
#[derive(Clone)]
pub struct JwtCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    audience: String,
    token_ttl: Duration,
}

impl JwtCodec {
    pub fn new(secret: &str, issuer: &str, audience: &str, token_ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            issuer: issuer.to_string(),
            audience: audience.to_string(),
            token_ttl,
        }
    }

    /// Issue a signed session token for an account.
    pub fn issue(&self, user_id: i64, email: &str) -> Result<String, TokenError> {
        self.issue_with_ttl(user_id, email, self.token_ttl)
    }

    pub(crate) fn issue_with_ttl(
        &self,
        user_id: i64,
        email: &str,
        ttl: Duration,
    ) -> Result<String, TokenError> {
        let now = OffsetDateTime::now_utc();
        let claims = Claims {
            sub: user_id.to_string(),
            user_id: user_id.to_string(),
            email: email.to_string(),
            iat: now.unix_timestamp(),
            exp: (now + ttl).unix_timestamp(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            jti: Uuid::new_v4().to_string(),
        };

        // Explicit algorithm prevents algorithm confusion attacks
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Encoding(e.to_string()))
    }

    /// Validate a token and return its claims.
    ///
    /// Checks run in a fixed order: signature, expiry, audience, issuer.
    /// Audience and issuer are compared against the configured values here
    /// rather than inside the JWT library so each mismatch surfaces as its
    /// own error kind.
    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_aud = false;
        validation.leeway = 0;

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            })?;

        if claims.aud != self.audience {
            return Err(TokenError::InvalidAudience);
        }
        if claims.iss != self.issuer {
            return Err(TokenError::InvalidIssuer);
        }

        Ok(claims)
    }

    /// Parse a token, checking the signature only.
    ///
    /// Expiry, audience and issuer are not enforced: logout must be able to
    /// recover a token's remaining lifetime even if the audience/issuer
    /// policy changed after the token was issued.
    pub fn parse(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_aud = false;
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|_| TokenError::Invalid)
    }

    /// Time until the token's expiry claim. Negative if already expired.
    pub fn remaining_lifetime(&self, claims: &Claims) -> Result<Duration, TokenError> {
        if claims.exp <= 0 {
            return Err(TokenError::ExpirationUnreadable);
        }
        let now = OffsetDateTime::now_utc().unix_timestamp();
        Ok(Duration::seconds(claims.exp - now))
    }

    /// Configured token lifetime in seconds, reported as `expires_in`.
    pub fn expiry_seconds(&self) -> i64 {
        self.token_ttl.whole_seconds()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("invalid token audience")]
    InvalidAudience,
    #[error("invalid token issuer")]
    InvalidIssuer,
    #[error("token invalid")]
    Invalid,
    #[error("token expiration claim unreadable")]
    ExpirationUnreadable,
    #[error("token encoding failed: {0}")]
    Encoding(String),
}
