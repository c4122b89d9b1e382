// crates/backend-lib/src/middleware/auth_gate.rs

//! Soft authentication: resolve the caller's identity from the
//! `Authorization` header without ever rejecting the request here.
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use metrics::counter;
use records_common::BEARER_PREFIX;

use crate::auth::{CurrentIdentity, Identity, TokenError, TokenService};
use crate::metrics::{GATE_ANONYMOUS, GATE_REJECTED, GATE_RESOLVED};
use crate::AppState;

/// Why a request ended up without an identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateMiss {
    MissingHeader,
    NotUtf8,
    WrongScheme,
    EmptyToken,
    Token(TokenError),
}

/// Turns request headers into an optional identity
#[derive(Clone)]
pub struct AuthGate {
    tokens: Arc<TokenService>,
}

impl AuthGate {
    pub fn new(tokens: Arc<TokenService>) -> Self {
        Self { tokens }
    }

    /// Resolve the identity carried by `headers`, or the reason there is none
    pub fn inspect(&self, headers: &HeaderMap) -> Result<Identity, GateMiss> {
        let value = headers.get(AUTHORIZATION).ok_or(GateMiss::MissingHeader)?;
        let value = value.to_str().map_err(|_| GateMiss::NotUtf8)?;
        let token = value
            .strip_prefix(BEARER_PREFIX)
            .ok_or(GateMiss::WrongScheme)?
            .trim();
        if token.is_empty() {
            return Err(GateMiss::EmptyToken);
        }
        self.tokens.verify(token).map_err(GateMiss::Token)
    }

    /// Resolve the identity carried by `headers`; failures are logged and
    /// collapse to `None`.
    pub fn resolve(&self, headers: &HeaderMap) -> Option<Identity> {
        match self.inspect(headers) {
            Ok(identity) => {
                counter!(GATE_RESOLVED).increment(1);
                tracing::debug!(subject = %identity.subject, "identity resolved");
                Some(identity)
            },
            Err(GateMiss::MissingHeader) => {
                counter!(GATE_ANONYMOUS).increment(1);
                None
            },
            Err(miss) => {
                counter!(GATE_REJECTED).increment(1);
                tracing::warn!(reason = ?miss, "ignoring unusable authorization header");
                None
            },
        }
    }
}

/// Axum middleware: attaches a [`CurrentIdentity`] to every request.
pub async fn resolve_identity(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let identity = state.gate.resolve(request.headers());
    request.extensions_mut().insert(CurrentIdentity(identity));
    next.run(request).await
}
