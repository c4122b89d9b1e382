// ================
// common/src/lib.rs
// ================
//! Common types and structures
//! used for communication between employee-records clients and the server.
//! This module defines the JSON request/response bodies and the access token
//! payload.

use std::fmt;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Scheme prefix of the `Authorization` header
pub const BEARER_PREFIX: &str = "Bearer ";

/// Format a token as an `Authorization` header value
pub fn bearer(token: &str) -> String {
    format!("{BEARER_PREFIX}{token}")
}

/// Registration request
#[derive(Serialize, Deserialize, Clone)]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub password: String,
}

impl fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Login request
///
/// `identifier` is a username or an email, depending on how the server
/// is configured to match it. `email` and `usernameOrEmail` are accepted
/// as aliases so older clients keep working.
#[derive(Serialize, Deserialize, Clone)]
pub struct LoginRequest {
    #[serde(alias = "email", alias = "usernameOrEmail")]
    pub identifier: String,
    pub password: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("identifier", &self.identifier)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Response to a successful login
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TokenResponse {
    /// Signed access token
    pub token: String,
    /// Always `Bearer`
    pub token_type: String,
    /// Seconds until the token expires
    pub expires_in: u64,
}

/// Public view of a registered user. Never carries the password hash.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PublicUser {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
}

/// Employee gender
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Male,
    Female,
    Other,
}

/// Fields a client supplies when creating or updating an employee
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct EmployeeInput {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub gender: Gender,
    pub designation: String,
    /// Yearly salary, at least 1000
    pub salary: f64,
    /// ISO date (`YYYY-MM-DD`)
    pub date_of_joining: NaiveDate,
    pub department: String,
    /// URL or path of the employee photo
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee_photo: Option<String>,
}

/// A stored employee
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Employee {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub gender: Gender,
    pub designation: String,
    pub salary: f64,
    pub date_of_joining: NaiveDate,
    pub department: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee_photo: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Employee {
    /// Build a new employee record from client input
    pub fn from_input(id: Uuid, input: EmployeeInput, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            first_name: input.first_name,
            last_name: input.last_name,
            email: input.email,
            gender: input.gender,
            designation: input.designation,
            salary: input.salary,
            date_of_joining: input.date_of_joining,
            department: input.department,
            employee_photo: input.employee_photo,
            created_at,
        }
    }

    /// Overwrite every client-editable field, keeping id and creation time
    pub fn apply(&mut self, input: EmployeeInput) {
        self.first_name = input.first_name;
        self.last_name = input.last_name;
        self.email = input.email;
        self.gender = input.gender;
        self.designation = input.designation;
        self.salary = input.salary;
        self.date_of_joining = input.date_of_joining;
        self.department = input.department;
        self.employee_photo = input.employee_photo;
    }
}

/// Query string of the employee search endpoint
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SearchQuery {
    /// Matched against designation or department
    #[serde(default)]
    pub term: String,
}

/// Response to an employee deletion
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteResponse {
    /// Whether a record was removed
    pub deleted: bool,
}

/// Error body returned by every failing endpoint
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Stable code plus human readable message
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

/// Payload of an access token
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TokenClaims {
    /// Subject: the user id
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Issued at, seconds since the epoch
    pub iat: i64,
    /// Expiry, seconds since the epoch
    pub exp: i64,
}

/// Failure to read the payload segment of a token
#[derive(Error, Debug)]
pub enum ClaimsPeekError {
    #[error("token does not have three segments")]
    Segments,

    #[error("payload is not base64url: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("payload is not a claims object: {0}")]
    Json(#[from] serde_json::Error),
}

/// Decode the payload of a token WITHOUT checking its signature.
///
/// Meant for clients that want to show who is logged in. The result must
/// not be used for any access decision.
pub fn peek_claims(token: &str) -> Result<TokenClaims, ClaimsPeekError> {
    let mut parts = token.split('.');
    let (Some(_header), Some(payload), Some(_signature), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(ClaimsPeekError::Segments);
    };
    let bytes = URL_SAFE_NO_PAD.decode(payload)?;
    Ok(serde_json::from_slice(&bytes)?)
}
