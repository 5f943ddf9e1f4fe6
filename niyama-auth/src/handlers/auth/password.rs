//! POST /auth/reset-password, /auth/confirm-reset

use axum::{extract::State, response::IntoResponse};
use niyama_core::error::AppError;
use niyama_core::response::ApiResponse;
use serde_json::json;

use crate::dtos::{PasswordResetConfirm, PasswordResetRequest};
use crate::utils::ValidatedJson;
use crate::AppState;

/// Start a password reset. The response is the same whether or not the
/// email is registered. Token delivery to the user is out of band; the
/// raw token is never logged or returned here.
pub async fn request_reset(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<PasswordResetRequest>,
) -> Result<impl IntoResponse, AppError> {
    // TODO: hand the token to the notification service once it exists.
    let _token = state
        .auth_service
        .request_password_reset(&payload.email)
        .await?;

    Ok(ApiResponse::ok(json!({
        "message": "If the email is registered, a reset link has been sent"
    })))
}

pub async fn confirm_reset(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<PasswordResetConfirm>,
) -> Result<impl IntoResponse, AppError> {
    state
        .auth_service
        .confirm_password_reset(&payload.token, &payload.new_password)
        .await?;

    Ok(ApiResponse::ok(json!({"message": "Password has been reset"})))
}
