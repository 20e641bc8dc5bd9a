//! Authentication core for Storeflow
//!
//! Stateless session tokens plus an external revocation store: login issues
//! a signed JWT, the middleware gates every protected request, and logout
//! revokes a token for exactly its remaining lifetime.

pub mod jwt;
pub mod login;
pub mod logout;
pub mod middleware;
pub mod password;
pub mod revocation;

pub use jwt::{Claims, JwtCodec, TokenError};
pub use login::{Credentials, IssuedToken, LoginError, LoginService};
pub use logout::{LogoutError, LogoutService};
pub use middleware::{bearer_token, require_auth, AuthState, AuthUser};
pub use password::{PasswordError, PasswordHasher};
pub use revocation::{
    MemoryRevocationStore, RedisRevocationStore, RevocationError, RevocationStore,
};
