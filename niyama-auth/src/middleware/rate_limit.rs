//! Per-user rate limiting over a shared cache counter.
//!
//! A fixed window per user: the first request in a window creates the
//! counter with the window as its TTL, later requests increment it, and
//! requests past the limit are rejected until the key expires. Because the
//! counter lives in the cache, the limit holds across service replicas.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use niyama_core::error::AppError;
use tracing::warn;

use crate::middleware::auth::Identity;
use crate::services::SessionCache;

#[derive(Clone)]
pub struct UserRateLimiter {
    pub cache: Arc<dyn SessionCache>,
    pub max_requests: i64,
    pub window_seconds: i64,
}

/// Reject with 429 once an authenticated user exceeds the window budget.
/// A cache failure lets the request through with a warning; availability
/// beats strict enforcement here.
pub async fn user_rate_limit_middleware(
    State(limiter): State<UserRateLimiter>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let identity = req.extensions().get::<Identity>().cloned();
    let Some(identity) = identity else {
        return Ok(next.run(req).await);
    };

    let key = format!("ratelimit:{}", identity.user_id);
    match limiter
        .cache
        .incr_window(&key, limiter.window_seconds)
        .await
    {
        Ok(count) if count > limiter.max_requests => Err(AppError::TooManyRequests(
            "Rate limit exceeded".to_string(),
            Some(limiter.window_seconds as u64),
        )),
        Ok(_) => Ok(next.run(req).await),
        Err(e) => {
            warn!(user_id = %identity.user_id, error = %e, "Rate limit check failed, allowing request");
            Ok(next.run(req).await)
        }
    }
}
