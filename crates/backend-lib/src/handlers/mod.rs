// ============================
// crates/backend-lib/src/handlers/mod.rs
// ============================
//! HTTP handlers. They only translate between axum and the services.

pub mod auth;
pub mod employees;

use axum::Json;
use serde_json::{json, Value};

/// Liveness probe
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
