//! GET /health
//!
//! Reports degraded (502) when either backing store is unreachable, so a
//! load balancer can rotate the instance out.

use axum::{extract::State, response::IntoResponse};
use niyama_core::error::AppError;
use niyama_core::response::ApiResponse;
use serde_json::json;
use tracing::error;

use crate::AppState;

pub async fn health(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let db_ok = match state.store.health_check().await {
        Ok(()) => true,
        Err(e) => {
            error!(error = %e, "Database health check failed");
            false
        }
    };
    let cache_ok = match state.cache.health_check().await {
        Ok(()) => true,
        Err(e) => {
            error!(error = %e, "Cache health check failed");
            false
        }
    };

    if !db_ok || !cache_ok {
        return Err(AppError::BadGateway("Service degraded".to_string()));
    }

    Ok(ApiResponse::ok(json!({
        "status": "healthy",
        "database": "up",
        "cache": "up",
    })))
}
