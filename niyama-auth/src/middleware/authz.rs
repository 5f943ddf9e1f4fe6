//! Authorization guards layered behind [`auth_middleware`].
//!
//! [`authorize_middleware`] consults the permission table through the
//! token issuer; [`require_role_middleware`] gates on role alone; and
//! [`require_same_organization`] enforces the tenant boundary.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use niyama_core::error::AppError;

use crate::middleware::auth::Identity;
use crate::models::Role;
use crate::services::Resource;
use crate::AppState;

/// State for [`authorize_middleware`]: which (resource, action) pair the
/// wrapped routes require.
#[derive(Clone)]
pub struct AuthzState {
    pub app: AppState,
    pub resource: Resource,
    pub action: &'static str,
}

fn identity(req: &Request) -> Result<&Identity, AppError> {
    req.extensions()
        .get::<Identity>()
        .ok_or_else(|| AppError::Unauthorized(anyhow::anyhow!("Missing authentication")))
}

/// Deny with 403 unless the caller's role permits the configured action.
/// The check reads the live user record, so a role change takes effect on
/// the next request, not at the next token refresh.
pub async fn authorize_middleware(
    State(state): State<AuthzState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let identity = identity(&req)?;

    let allowed = state
        .app
        .auth_service
        .has_permission(identity.user_id, state.resource, state.action)
        .await?;

    if !allowed {
        return Err(AppError::Forbidden(anyhow::anyhow!(
            "Insufficient permissions for {}:{}",
            state.resource.as_str(),
            state.action
        )));
    }

    Ok(next.run(req).await)
}

/// State for [`require_role_middleware`]: the allow-list of roles.
#[derive(Clone)]
pub struct RoleGuard {
    pub roles: &'static [Role],
}

/// Deny with 403 unless the caller holds one of the listed roles.
pub async fn require_role_middleware(
    State(guard): State<RoleGuard>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let identity = identity(&req)?;

    let held = identity.role.is_some_and(|role| guard.roles.contains(&role));
    if !held {
        return Err(AppError::Forbidden(anyhow::anyhow!(
            "Insufficient role for this resource"
        )));
    }

    Ok(next.run(req).await)
}

/// Enforce the tenant boundary: when the request names an organization via
/// the `x-organization-id` header, it must match the caller's own, except
/// for admins. Requests without the header pass through; the handler's own
/// queries are already organization-scoped.
pub async fn require_same_organization(
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let identity = identity(&req)?;

    if let Some(requested) = req
        .headers()
        .get("x-organization-id")
        .and_then(|v| v.to_str().ok())
    {
        let matches = requested == identity.organization_id.to_string();
        let is_admin = identity.role == Some(Role::Admin);

        if !matches && !is_admin {
            return Err(AppError::Forbidden(anyhow::anyhow!(
                "Access to another organization is not permitted"
            )));
        }
    }

    Ok(next.run(req).await)
}
