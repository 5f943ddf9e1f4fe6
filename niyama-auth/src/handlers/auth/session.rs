//! POST /auth/login, /auth/refresh, /auth/logout

use axum::{extract::State, response::IntoResponse};
use niyama_core::error::AppError;
use niyama_core::response::ApiResponse;
use serde_json::json;

use crate::dtos::{AuthResponse, LoginRequest, LogoutRequest, RefreshRequest};
use crate::middleware::AuthUser;
use crate::utils::ValidatedJson;
use crate::AppState;

pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (user, tokens) = state
        .auth_service
        .login(&payload.email, &payload.password)
        .await?;

    Ok(ApiResponse::ok(AuthResponse {
        user: user.sanitized(),
        tokens,
    }))
}

pub async fn refresh(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RefreshRequest>,
) -> Result<impl IntoResponse, AppError> {
    let tokens = state.auth_service.refresh_token(&payload.refresh_token).await?;
    Ok(ApiResponse::ok(tokens))
}

pub async fn logout(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    ValidatedJson(payload): ValidatedJson<LogoutRequest>,
) -> Result<impl IntoResponse, AppError> {
    state
        .auth_service
        .logout(identity.user_id, payload.refresh_token.as_deref())
        .await?;

    Ok(ApiResponse::ok(json!({"message": "Logged out"})))
}
