//! JSON response envelope shared by every Niyama endpoint.
//!
//! Success bodies are `{success: true, data, timestamp}`; the error-side
//! envelope lives with [`crate::error::AppError`].

use axum::{response::IntoResponse, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
    pub timestamp: DateTime<Utc>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            timestamp: Utc::now(),
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> axum::response::Response {
        Json(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_carries_success_flag() {
        let res = ApiResponse::ok(serde_json::json!({"hello": "world"}));
        assert!(res.success);
        let body = serde_json::to_value(&res).unwrap();
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["hello"], "world");
        assert!(body["timestamp"].is_string());
    }
}
