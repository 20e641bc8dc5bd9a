//! User accounts (persistence boundary)
//!
//! The auth core reads accounts through [`UserRepository`]; the wider user
//! CRUD surface lives behind this boundary and is injected at startup.

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

/// A stored account as the auth core sees it: read-only.
#[derive(Debug, Clone, FromRow)]
pub struct Account {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
    pub enabled: bool,
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, sqlx::Error>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Account>, sqlx::Error>;
}

/// Postgres-backed account lookup.
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, sqlx::Error> {
        sqlx::query_as(
            "SELECT id, email, password_hash, enabled FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Account>, sqlx::Error> {
        sqlx::query_as(
            "SELECT id, email, password_hash, enabled FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }
}
