//! Registration, login and bearer-token handling over HTTP.

mod test_utils;

use axum::http::{Method, StatusCode};
use records_common::peek_claims;
use serde_json::json;
use test_utils::{login_token, registration, send, test_app};

#[tokio::test]
async fn test_health() {
    let app = test_app();
    let (status, body) = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_register_returns_public_user() {
    let app = test_app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/auth/register",
        None,
        Some(registration("ab", "a@b.com")),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["username"], "ab");
    assert_eq!(body["email"], "a@b.com");
    assert!(body.get("password").is_none());
    assert!(body.get("password_hash").is_none());
}

#[tokio::test]
async fn test_duplicate_registration_conflicts() {
    let app = test_app();
    let first = registration("ab", "a@b.com");
    let (status, _) = send(&app, Method::POST, "/auth/register", None, Some(first)).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        &app,
        Method::POST,
        "/auth/register",
        None,
        Some(registration("other", "a@b.com")),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "USER_001");
}

#[tokio::test]
async fn test_invalid_registration_is_rejected() {
    let app = test_app();
    let mut short = registration("ab", "a@b.com");
    short["password"] = json!("abc");
    let (status, body) = send(&app, Method::POST, "/auth/register", None, Some(short)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VAL_001");
}

#[tokio::test]
async fn test_login_returns_bearer_token() {
    let app = test_app();
    let token = login_token(&app).await;

    let claims = peek_claims(&token).unwrap();
    assert_eq!(claims.username.as_deref(), Some("ab"));
    assert_eq!(claims.exp - claims.iat, 3600);
}

#[tokio::test]
async fn test_login_failures_are_uniform() {
    let app = test_app();
    login_token(&app).await;

    let (wrong_status, wrong_body) = send(
        &app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "identifier": "a@b.com", "password": "nope!!" })),
    )
    .await;
    let (unknown_status, unknown_body) = send(
        &app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "identifier": "nobody@b.com", "password": "secret1" })),
    )
    .await;

    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_status, unknown_status);
    assert_eq!(wrong_body, unknown_body);
}

#[tokio::test]
async fn test_tampered_or_missing_token_is_unauthorized() {
    let app = test_app();
    let token = login_token(&app).await;

    let (status, _) = send(&app, Method::GET, "/employees", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let tampered = format!("{token}x");
    let (status, body) = send(&app, Method::GET, "/employees", Some(&tampered), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "AUTH_002");

    let (status, _) = send(&app, Method::GET, "/employees", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, Method::GET, "/employees", Some("not.a.jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_token_from_another_server_is_rejected() {
    let app = test_app();
    login_token(&app).await;

    let mut other = test_utils::test_settings();
    other.auth.jwt_secret = "a-completely-different-secret-value!!".to_string();
    let other_app = backend_lib::create_router(backend_lib::AppState::from_settings(other).unwrap());
    let foreign = login_token(&other_app).await;

    let (status, _) = send(&app, Method::GET, "/employees", Some(&foreign), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_malformed_login_body() {
    let app = test_app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "identifier": "a@b.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VAL_001");
}
