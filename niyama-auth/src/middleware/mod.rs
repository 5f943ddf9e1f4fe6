//! Request middleware: bearer-token authentication, role and permission
//! guards, organization scoping, and per-user rate limiting.

pub mod auth;
pub mod authz;
pub mod rate_limit;

pub use auth::{auth_middleware, optional_auth_middleware, AuthUser, Identity};
pub use authz::{
    authorize_middleware, require_role_middleware, require_same_organization, AuthzState, RoleGuard,
};
pub use rate_limit::{user_rate_limit_middleware, UserRateLimiter};
