// ============================
// crates/backend-lib/src/router.rs
// ============================
//! HTTP router.
use axum::{
    http::{header, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

use crate::handlers::{self, auth, employees};
use crate::middleware::resolve_identity;
use crate::AppState;

/// Build the application router
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.settings.cors_allowed_origins);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/employees", get(employees::list).post(employees::create))
        .route("/employees/search", get(employees::search))
        .route(
            "/employees/{id}",
            get(employees::find)
                .put(employees::update)
                .delete(employees::delete),
        )
        .layer(from_fn_with_state(state.clone(), resolve_identity))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    if origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "ignoring unparsable CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(allowed)
}
