//! Shared harness: the full router over in-memory store and cache, so the
//! suite runs without Postgres or Redis.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use niyama_auth::config::{AuthConfig, DatabaseConfig, JwtConfig, RateLimitConfig};
use niyama_auth::services::{AuthService, JwtService, MemoryCache, MemoryStore};
use niyama_auth::{build_router, AppState};
use niyama_core::config::Environment;

pub const TEST_BCRYPT_COST: u32 = 4;

pub fn test_config() -> AuthConfig {
    AuthConfig {
        environment: Environment::Dev,
        service_name: "niyama-auth-test".to_string(),
        log_level: "warn".to_string(),
        port: 8084,
        database: DatabaseConfig {
            url: "postgres://unused".to_string(),
            max_connections: 1,
            acquire_timeout_seconds: 1,
        },
        redis_url: "redis://unused".to_string(),
        jwt: JwtConfig {
            secret: "integration-test-secret-key".to_string(),
            expires_in: "15m".to_string(),
            refresh_expires_in: "30d".to_string(),
        },
        bcrypt_rounds: TEST_BCRYPT_COST,
        allowed_origins: vec!["http://localhost:3000".to_string()],
        rate_limit: RateLimitConfig {
            user_max_requests: 1000,
            user_window_seconds: 60,
        },
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub cache: Arc<MemoryCache>,
    pub auth: AuthService,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: AuthConfig) -> Self {
        let store = Arc::new(MemoryStore::new());
        let cache = Arc::new(MemoryCache::new());
        let jwt = JwtService::new(&config.jwt);
        let auth = AuthService::new(store.clone(), cache.clone(), jwt, config.bcrypt_rounds);
        let state = AppState::new(config, store.clone(), cache.clone(), auth.clone());
        let router = build_router(state);

        Self {
            router,
            store,
            cache,
            auth,
        }
    }

    pub async fn post(
        &self,
        uri: &str,
        body: Value,
        token: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json");
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }
        let req = builder.body(Body::from(body.to_string())).unwrap();
        self.send(req).await
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }
        let req = builder.body(Body::empty()).unwrap();
        self.send(req).await
    }

    pub async fn send(&self, req: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }

    /// Register a user through the API and return (user_id, access, refresh).
    pub async fn register_user(&self, email: &str, password: &str) -> (String, String, String) {
        let (status, body) = self
            .post(
                "/auth/register",
                serde_json::json!({
                    "email": email,
                    "password": password,
                    "first_name": "Test",
                    "last_name": "User",
                    "organization_name": "Test Org",
                }),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);

        (
            body["data"]["user"]["id"].as_str().unwrap().to_string(),
            body["data"]["tokens"]["access_token"]
                .as_str()
                .unwrap()
                .to_string(),
            body["data"]["tokens"]["refresh_token"]
                .as_str()
                .unwrap()
                .to_string(),
        )
    }
}
