//! Niyama authentication service.
//!
//! Owns the session lifecycle (register, login, refresh, logout, password
//! management) and the authorization contract every other Niyama service
//! delegates to.

pub mod config;
pub mod dtos;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

use std::sync::Arc;

use axum::http::HeaderValue;
use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::AuthConfig;
use crate::middleware::{auth_middleware, user_rate_limit_middleware, UserRateLimiter};
use crate::services::{AuthService, CredentialStore, SessionCache};

/// Shared application state, cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AuthConfig>,
    pub store: Arc<dyn CredentialStore>,
    pub cache: Arc<dyn SessionCache>,
    pub auth_service: AuthService,
}

impl AppState {
    pub fn new(
        config: AuthConfig,
        store: Arc<dyn CredentialStore>,
        cache: Arc<dyn SessionCache>,
        auth_service: AuthService,
    ) -> Self {
        Self {
            config: Arc::new(config),
            store,
            cache,
            auth_service,
        }
    }
}

/// Assemble the service router. Protected routes sit behind bearer-token
/// authentication and the per-user rate limit; public routes are only
/// shielded by validation and the anti-enumeration error contract.
pub fn build_router(state: AppState) -> Router {
    let limiter = UserRateLimiter {
        cache: state.cache.clone(),
        max_requests: state.config.rate_limit.user_max_requests,
        window_seconds: state.config.rate_limit.user_window_seconds,
    };

    let public = Router::new()
        .route("/auth/register", post(handlers::auth::registration::register))
        .route("/auth/login", post(handlers::auth::session::login))
        .route("/auth/refresh", post(handlers::auth::session::refresh))
        .route("/auth/reset-password", post(handlers::auth::password::request_reset))
        .route("/auth/confirm-reset", post(handlers::auth::password::confirm_reset))
        .route("/health", get(handlers::health::health));

    // Layers run outermost-last: authentication first, then the rate
    // limit keyed on the authenticated identity.
    let protected = Router::new()
        .route("/auth/logout", post(handlers::auth::session::logout))
        .route("/auth/me", get(handlers::user::get_me))
        .route("/auth/change-password", post(handlers::user::change_password))
        .route_layer(from_fn_with_state(limiter, user_rate_limit_middleware))
        .route_layer(from_fn_with_state(state.clone(), auth_middleware));

    let origins: Vec<HeaderValue> = state
        .config
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    Router::new()
        .merge(public)
        .merge(protected)
        .layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
