//! POST /auth/register

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use niyama_core::error::AppError;
use niyama_core::response::ApiResponse;

use crate::dtos::{AuthResponse, RegisterRequest};
use crate::utils::ValidatedJson;
use crate::AppState;

/// Register a new user and organization. The response carries the first
/// token pair, so a fresh registration is already signed in.
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (user, tokens) = state
        .auth_service
        .register(
            &payload.email,
            &payload.password,
            &payload.first_name,
            &payload.last_name,
            &payload.organization_name,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        ApiResponse::ok(AuthResponse {
            user: user.sanitized(),
            tokens,
        }),
    ))
}
