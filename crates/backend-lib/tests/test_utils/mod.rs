//! Test utilities for the HTTP tests
//!
//! Builds a router over in-memory storage with a cheap password hash and
//! offers small helpers to drive it with `oneshot`.
#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use backend_lib::{
    config::{Settings, StorageBackend},
    create_router, AppState,
};
use records_common::bearer;
use serde_json::{json, Value};
use tower::ServiceExt;

pub const SECRET: &str = "integration-secret-0123456789abcdef";

pub fn test_settings() -> Settings {
    let mut settings = Settings::default();
    settings.storage = StorageBackend::Memory;
    settings.auth.jwt_secret = SECRET.to_string();
    settings.auth.scrypt_log_n = 4;
    settings
}

/// Router over fresh in-memory storage
pub fn test_app() -> Router {
    let state = AppState::from_settings(test_settings()).unwrap();
    create_router(state)
}

/// Send one request and return the status plus the JSON body (`Null` when empty)
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, bearer(token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

pub fn registration(username: &str, email: &str) -> Value {
    json!({
        "first_name": "A",
        "last_name": "B",
        "username": username,
        "email": email,
        "password": "secret1",
    })
}

pub fn employee(email: &str, designation: &str, department: &str) -> Value {
    json!({
        "first_name": "Ada",
        "last_name": "Lovelace",
        "email": email,
        "gender": "Female",
        "designation": designation,
        "salary": 5000.0,
        "date_of_joining": "2024-03-01",
        "department": department,
    })
}

/// Register `ab` / `a@b.com` and return a fresh access token
pub async fn login_token(app: &Router) -> String {
    let (status, _) = send(
        app,
        Method::POST,
        "/auth/register",
        None,
        Some(registration("ab", "a@b.com")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "identifier": "a@b.com", "password": "secret1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}
