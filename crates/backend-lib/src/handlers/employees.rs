//! Employee endpoints.
//!
//! Bodies, ids and query strings are handed to [`EmployeeService`] raw so
//! that it can check the caller's identity before looking at any of them.
//! Only infallible extractors are used here.
//!
//! [`EmployeeService`]: crate::employees::EmployeeService
use axum::{
    body::Bytes,
    extract::{RawQuery, State},
    http::{StatusCode, Uri},
    Extension, Json,
};
use records_common::{DeleteResponse, Employee};

use crate::{auth::CurrentIdentity, error::AppError, AppState};

/// `GET /employees`
pub async fn list(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentIdentity>,
) -> Result<Json<Vec<Employee>>, AppError> {
    Ok(Json(state.employees.list(current.identity()).await?))
}

/// `GET /employees/search?term=`
pub async fn search(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentIdentity>,
    RawQuery(query): RawQuery,
) -> Result<Json<Vec<Employee>>, AppError> {
    Ok(Json(
        state
            .employees
            .search_query(current.identity(), query.as_deref())
            .await?,
    ))
}

/// Last path segment, still percent-encoded. Ids are UUIDs, so an encoded
/// segment never names an employee.
fn path_id(uri: &Uri) -> &str {
    uri.path().rsplit('/').next().unwrap_or_default()
}

/// `GET /employees/{id}`
pub async fn find(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentIdentity>,
    uri: Uri,
) -> Result<Json<Employee>, AppError> {
    Ok(Json(state.employees.find(current.identity(), path_id(&uri)).await?))
}

/// `POST /employees`
pub async fn create(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentIdentity>,
    body: Bytes,
) -> Result<(StatusCode, Json<Employee>), AppError> {
    let employee = state.employees.create(current.identity(), &body).await?;
    Ok((StatusCode::CREATED, Json(employee)))
}

/// `PUT /employees/{id}`
pub async fn update(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentIdentity>,
    uri: Uri,
    body: Bytes,
) -> Result<Json<Employee>, AppError> {
    Ok(Json(
        state
            .employees
            .update(current.identity(), path_id(&uri), &body)
            .await?,
    ))
}

/// `DELETE /employees/{id}`
pub async fn delete(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentIdentity>,
    uri: Uri,
) -> Result<Json<DeleteResponse>, AppError> {
    Ok(Json(state.employees.delete(current.identity(), path_id(&uri)).await?))
}
