//! Refresh token exchange, revocation, and logout through the HTTP surface.

mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::TestApp;

#[tokio::test]
async fn refresh_issues_a_new_pair() {
    let app = TestApp::new();
    let (_, _, refresh) = app.register_user("alice@acme.com", "s3cret-pass").await;

    let (status, body) = app
        .post("/auth/refresh", json!({"refresh_token": refresh}), None)
        .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["access_token"].is_string());
    assert!(body["data"]["refresh_token"].is_string());
    assert_ne!(body["data"]["refresh_token"], refresh.as_str());
}

#[tokio::test]
async fn refresh_is_additive_across_devices() {
    let app = TestApp::new();
    let (user_id, _, refresh) = app.register_user("bob@acme.com", "s3cret-pass").await;
    let user_id = user_id.parse().unwrap();

    let (status, _) = app
        .post("/auth/refresh", json!({"refresh_token": &refresh}), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.store.refresh_token_count(user_id), 2);

    // The original token was not consumed by the exchange.
    let (status, _) = app
        .post("/auth/refresh", json!({"refresh_token": &refresh}), None)
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn access_token_is_not_accepted_as_refresh() {
    let app = TestApp::new();
    let (_, access, _) = app.register_user("carol@acme.com", "s3cret-pass").await;

    let (status, body) = app
        .post("/auth/refresh", json!({"refresh_token": access}), None)
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid token");
}

#[tokio::test]
async fn garbage_refresh_token_is_rejected() {
    let app = TestApp::new();

    let (status, _) = app
        .post("/auth/refresh", json!({"refresh_token": "garbage"}), None)
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logout_with_token_revokes_only_that_session() {
    let app = TestApp::new();
    let (user_id, access, first_refresh) =
        app.register_user("dave@acme.com", "s3cret-pass").await;
    let user_id = user_id.parse().unwrap();

    let (_, body) = app
        .post(
            "/auth/login",
            json!({"email": "dave@acme.com", "password": "s3cret-pass"}),
            None,
        )
        .await;
    let second_refresh = body["data"]["tokens"]["refresh_token"]
        .as_str()
        .unwrap()
        .to_string();
    assert_eq!(app.store.refresh_token_count(user_id), 2);

    let (status, _) = app
        .post(
            "/auth/logout",
            json!({"refresh_token": first_refresh}),
            Some(&access),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.store.refresh_token_count(user_id), 1);

    let (status, _) = app
        .post("/auth/refresh", json!({"refresh_token": first_refresh}), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .post("/auth/refresh", json!({"refresh_token": second_refresh}), None)
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn logout_without_token_revokes_all_sessions() {
    let app = TestApp::new();
    let (user_id, access, refresh) = app.register_user("erin@acme.com", "s3cret-pass").await;
    let user_id: uuid::Uuid = user_id.parse().unwrap();
    app.post(
        "/auth/login",
        json!({"email": "erin@acme.com", "password": "s3cret-pass"}),
        None,
    )
    .await;

    let (status, _) = app.post("/auth/logout", json!({}), Some(&access)).await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(app.store.refresh_token_count(user_id), 0);
    assert!(app
        .cache
        .keys_with_prefix(&format!("session:{}:", user_id))
        .is_empty());

    let (status, _) = app
        .post("/auth/refresh", json!({"refresh_token": refresh}), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn change_password_invalidates_refresh_tokens() {
    let app = TestApp::new();
    let (_, access, refresh) = app.register_user("fred@acme.com", "old-password").await;

    let (status, _) = app
        .post(
            "/auth/change-password",
            json!({"current_password": "old-password", "new_password": "new-password-1"}),
            Some(&access),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .post("/auth/refresh", json!({"refresh_token": refresh}), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .post(
            "/auth/login",
            json!({"email": "fred@acme.com", "password": "new-password-1"}),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn change_password_rejects_wrong_current_password() {
    let app = TestApp::new();
    let (_, access, _) = app.register_user("gina@acme.com", "old-password").await;

    let (status, _) = app
        .post(
            "/auth/change-password",
            json!({"current_password": "wrong-password", "new_password": "new-password-1"}),
            Some(&access),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn deactivated_user_cannot_refresh() {
    let app = TestApp::new();
    let (user_id, _, refresh) = app.register_user("hank@acme.com", "s3cret-pass").await;
    app.store.set_active(user_id.parse().unwrap(), false);

    let (status, _) = app
        .post("/auth/refresh", json!({"refresh_token": refresh}), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
