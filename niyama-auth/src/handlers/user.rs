//! GET /auth/me, POST /auth/change-password

use axum::{extract::State, response::IntoResponse};
use niyama_core::error::AppError;
use niyama_core::response::ApiResponse;
use serde_json::json;

use crate::dtos::ChangePasswordRequest;
use crate::middleware::AuthUser;
use crate::utils::ValidatedJson;
use crate::AppState;

/// Return the authenticated caller's own profile.
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let user = state.auth_service.get_user(identity.user_id).await?;
    Ok(ApiResponse::ok(user.sanitized()))
}

pub async fn change_password(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    ValidatedJson(payload): ValidatedJson<ChangePasswordRequest>,
) -> Result<impl IntoResponse, AppError> {
    state
        .auth_service
        .change_password(
            identity.user_id,
            &payload.current_password,
            &payload.new_password,
        )
        .await?;

    Ok(ApiResponse::ok(json!({
        "message": "Password changed; please log in again"
    })))
}
