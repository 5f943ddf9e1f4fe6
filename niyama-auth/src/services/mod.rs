//! Services layer for niyama-auth.
//!
//! The token issuer ([`AuthService`]), the static permission table, and the
//! seams to Postgres ([`CredentialStore`]) and Redis ([`SessionCache`]).

pub mod auth;
pub mod cache;
pub mod error;
pub mod jwt;
pub mod rbac;
pub mod store;

pub use auth::{AuthService, SESSION_TTL_SECONDS};
pub use cache::{MemoryCache, RedisCache, SessionCache};
pub use error::AuthError;
pub use jwt::{AccessTokenClaims, JwtService, RefreshTokenClaims, TokenResponse};
pub use rbac::Resource;
pub use store::{CredentialStore, DuplicateEmail, MemoryStore, PgCredentialStore};
