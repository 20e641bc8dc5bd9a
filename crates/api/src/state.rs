//! Shared application state

use sqlx::PgPool;
use std::sync::Arc;
use time::Duration;

use crate::auth::{
    AuthState, JwtCodec, LoginService, LogoutService, PasswordHasher, RevocationStore,
};
use crate::config::Config;
use crate::users::{PgUserRepository, UserRepository};

/// Process-wide state handed to every handler. All auth dependencies are
/// constructed once here and injected; nothing reads globals.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub pool: PgPool,
    pub users: Arc<dyn UserRepository>,
    pub login: Arc<LoginService>,
    pub logout: Arc<LogoutService>,
    pub auth: AuthState,
}

impl AppState {
    pub fn new(config: Config, pool: PgPool, revocations: Arc<dyn RevocationStore>) -> Self {
        let codec = Arc::new(JwtCodec::new(
            &config.jwt_secret,
            &config.jwt_issuer,
            &config.jwt_audience,
            Duration::seconds(config.jwt_expiry_seconds),
        ));
        let hasher = Arc::new(PasswordHasher::new(config.bcrypt_cost));
        let users: Arc<dyn UserRepository> = Arc::new(PgUserRepository::new(pool.clone()));

        let login = Arc::new(LoginService::new(
            users.clone(),
            hasher,
            codec.clone(),
            std::time::Duration::from_millis(config.login_min_response_ms),
        ));
        let logout = Arc::new(LogoutService::new(codec.clone(), revocations.clone()));

        Self {
            config: Arc::new(config),
            pool,
            users,
            login,
            logout,
            auth: AuthState { codec, revocations },
        }
    }
}
