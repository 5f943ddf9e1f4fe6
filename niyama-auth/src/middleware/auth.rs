//! Bearer-token authentication middleware.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use niyama_core::error::AppError;
use uuid::Uuid;

use crate::models::Role;
use crate::AppState;

/// The authenticated caller, derived from a verified access token and the
/// live user record. Inserted into request extensions by
/// [`auth_middleware`].
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: Uuid,
    pub email: String,
    pub role: Option<Role>,
    pub organization_id: Uuid,
}

/// Extractor for handlers behind [`auth_middleware`]. Absence means the
/// route was wired without the middleware, which is a server bug, not a
/// client error.
pub struct AuthUser(pub Identity);

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| AppError::Unauthorized(anyhow::anyhow!("Missing authentication")))
    }
}

fn bearer_token(req: &Request) -> Result<&str, AppError> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized(anyhow::anyhow!("Missing authorization header")))?;

    header
        .strip_prefix("Bearer ")
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::Unauthorized(anyhow::anyhow!("Invalid authorization header")))
}

/// Require a valid access token. The token is verified against both its
/// signature and the live user record, so tokens for deleted or
/// deactivated accounts stop working immediately.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(&req)?;

    let (claims, user) = state.auth_service.verify_token(token).await?;

    req.extensions_mut().insert(Identity {
        user_id: claims.sub,
        role: user.role(),
        email: user.email,
        organization_id: user.organization_id,
    });

    Ok(next.run(req).await)
}

/// Like [`auth_middleware`], but an absent or invalid token passes through
/// without an [`Identity`] instead of failing. For routes that adapt their
/// response to the caller rather than gate on it.
pub async fn optional_auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let verified = match bearer_token(&req) {
        Ok(token) => state.auth_service.verify_token(token).await.ok(),
        Err(_) => None,
    };

    if let Some((claims, user)) = verified {
        req.extensions_mut().insert(Identity {
            user_id: claims.sub,
            role: user.role(),
            email: user.email,
            organization_id: user.organization_id,
        });
    }

    next.run(req).await
}
