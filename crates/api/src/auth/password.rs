//! Password hashing with bcrypt

use bcrypt::DEFAULT_COST;

/// bcrypt reads at most 72 bytes of input; longer passwords are an error,
/// never a silent truncation.
const BCRYPT_MAX_BYTES: usize = 72;

// Cost range accepted by the bcrypt crate
const MIN_COST: u32 = 4;
const MAX_COST: u32 = 31;

/// Adaptive password hasher with a configurable work factor.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    /// Create a hasher. Non-positive or out-of-range work factors fall back
    /// to the bcrypt default rather than failing at startup.
    pub fn new(cost: i64) -> Self {
        let cost = u32::try_from(cost)
            .ok()
            .filter(|c| (MIN_COST..=MAX_COST).contains(c))
            .unwrap_or(DEFAULT_COST);
        Self { cost }
    }

    /// Hash a plaintext password for storage.
    pub fn hash(&self, plaintext: &str) -> Result<String, PasswordError> {
        if plaintext.len() > BCRYPT_MAX_BYTES {
            return Err(PasswordError::TooLong);
        }
        bcrypt::hash(plaintext, self.cost).map_err(|e| PasswordError::Hashing(e.to_string()))
    }

    /// Verify a plaintext password against a stored hash.
    ///
    /// A wrong password and a malformed hash collapse into the single
    /// generic `Mismatch` so callers cannot tell the two apart.
    pub fn verify(&self, hash: &str, plaintext: &str) -> Result<(), PasswordError> {
        match bcrypt::verify(plaintext, hash) {
            Ok(true) => Ok(()),
            Ok(false) | Err(_) => Err(PasswordError::Mismatch),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("password exceeds the {BCRYPT_MAX_BYTES}-byte limit")]
    TooLong,
    #[error("password hashing failed: {0}")]
    Hashing(String),
    #[error("password verification failed")]
    Mismatch,
}
