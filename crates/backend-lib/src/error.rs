// crates/backend-lib/src/error.rs

//! Central error type + Axum integration.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use records_common::{ErrorBody, ErrorDetail};
use thiserror::Error;

use crate::validation::ValidationError;

/// Application error types with error codes and context
#[derive(Error, Debug)]
pub enum AppError {
    /// Wrong identifier or password. Lookup misses are reported the same way.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Unauthorized access")]
    Unauthorized,

    #[error("Identifier already registered: {0}")]
    DuplicateIdentifier(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error("Authentication rate limit exceeded")]
    AuthRateLimited,

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias used across the library
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidCredentials | AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::DuplicateIdentifier(_) | AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::AuthRateLimited => StatusCode::TOO_MANY_REQUESTS,
            AppError::Storage(_) | AppError::Internal(_) | AppError::Io(_) | AppError::Json(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            },
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::InvalidCredentials => "AUTH_001",
            AppError::Unauthorized => "AUTH_002",
            AppError::AuthRateLimited => "AUTH_003",
            AppError::DuplicateIdentifier(_) => "USER_001",
            AppError::Conflict(_) => "CONFLICT_001",
            AppError::NotFound(_) => "NF_001",
            AppError::Validation(_) => "VAL_001",
            AppError::Storage(_) => "STORE_001",
            AppError::Internal(_) => "INT_001",
            AppError::Io(_) => "IO_001",
            AppError::Json(_) => "JSON_001",
        }
    }

    /// Get a sanitized message suitable for production use
    pub fn sanitized_message(&self) -> String {
        match self {
            AppError::InvalidCredentials => "Invalid credentials".to_string(),
            AppError::Unauthorized => "Unauthorized access".to_string(),
            AppError::AuthRateLimited => {
                "Too many authentication attempts, please try again later".to_string()
            },
            AppError::DuplicateIdentifier(_) => "User already exists".to_string(),
            AppError::Conflict(_) => "Resource already exists".to_string(),
            AppError::NotFound(_) => "Resource not found".to_string(),
            // Validation messages only describe the caller's own input.
            AppError::Validation(e) => e.to_string(),
            AppError::Storage(_) | AppError::Io(_) | AppError::Json(_) => {
                "Storage unavailable, please try again".to_string()
            },
            AppError::Internal(_) => "An internal server error occurred".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        // Use detailed messages in development, sanitized in production
        let message = if cfg!(debug_assertions) {
            self.to_string()
        } else {
            self.sanitized_message()
        };

        let body = ErrorBody {
            error: ErrorDetail {
                code: self.error_code().to_string(),
                message,
            },
        };

        (status, axum::Json(body)).into_response()
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(e: tokio::task::JoinError) -> Self {
        AppError::Internal(format!("blocking task failed: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error as IoError, ErrorKind};

    #[test]
    fn test_app_error_display() {
        assert_eq!(AppError::InvalidCredentials.to_string(), "Invalid credentials");
        assert_eq!(
            AppError::DuplicateIdentifier("a@b.com".into()).to_string(),
            "Identifier already registered: a@b.com"
        );

        let io_error = AppError::Io(IoError::new(ErrorKind::NotFound, "File not found"));
        assert!(io_error.to_string().contains("IO error"));
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(AppError::InvalidCredentials.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AppError::DuplicateIdentifier("x".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Validation(ValidationError::Salary(10.0)).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::AuthRateLimited.status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            AppError::Storage("disk".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_storage_failures_do_not_look_like_auth_failures() {
        let storage = AppError::Storage("connection refused".into());
        assert_ne!(storage.status_code(), AppError::Unauthorized.status_code());
        assert_ne!(storage.error_code(), AppError::Unauthorized.error_code());
        assert!(!storage.sanitized_message().contains("connection refused"));
    }

    #[test]
    fn test_error_from_impls() {
        let io_err = IoError::new(ErrorKind::PermissionDenied, "Permission denied");
        let app_err: AppError = io_err.into();
        assert!(matches!(app_err, AppError::Io(_)));

        let json_err: serde_json::Error =
            serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let app_err: AppError = json_err.into();
        assert!(matches!(app_err, AppError::Json(_)));

        let app_err: AppError = ValidationError::EmptyField("last_name").into();
        assert!(matches!(app_err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_error_serialization() {
        let response = AppError::Unauthorized.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let content_type = response
            .headers()
            .get("content-type")
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(content_type.contains("application/json"));

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: ErrorBody = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.error.code, "AUTH_002");
    }
}
