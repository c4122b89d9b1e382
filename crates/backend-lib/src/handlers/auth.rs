//! Public registration and login endpoints.
use axum::{body::Bytes, extract::State, http::StatusCode, Json};
use records_common::{LoginRequest, PublicUser, RegisterRequest, TokenResponse};

use crate::{error::AppError, validation::decode_body, AppState};

/// `POST /auth/register`
pub async fn register(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<PublicUser>), AppError> {
    let req: RegisterRequest = decode_body(&body)?;
    let user = state.auth.register(req).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// `POST /auth/login`
pub async fn login(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<TokenResponse>, AppError> {
    let req: LoginRequest = decode_body(&body)?;
    Ok(Json(state.auth.login(req).await?))
}
