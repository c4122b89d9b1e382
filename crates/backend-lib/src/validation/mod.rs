// ============================
// crates/backend-lib/src/validation/mod.rs
// ============================
//! Input validation for registration and employee payloads.

use records_common::{EmployeeInput, RegisterRequest, SearchQuery};
use regex::Regex;
use serde::de::DeserializeOwned;
use std::sync::LazyLock;
use thiserror::Error;
use url::form_urlencoded;

use crate::auth::{validate_password_strength, PasswordRequirements};

// Common validation constants
const MIN_USERNAME_LENGTH: usize = 2;
const MAX_USERNAME_LENGTH: usize = 32;
const MAX_NAME_LENGTH: usize = 100;
const MAX_EMAIL_LENGTH: usize = 254; // RFC 5321 SMTP limit
const MAX_PASSWORD_LENGTH: usize = 128;
const MAX_SEARCH_TERM_LENGTH: usize = 100;

/// Lowest salary the employee model accepts
pub const MIN_SALARY: f64 = 1000.0;

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("email regex")
});
static USERNAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_.-]+$").expect("username regex"));

/// Possible validation errors
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("{0} must not be empty")]
    EmptyField(&'static str),

    #[error("{0} is too long")]
    TooLong(&'static str),

    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    #[error("Invalid username: {0}")]
    InvalidUsername(String),

    #[error("Invalid password: {0}")]
    InvalidPassword(String),

    #[error("Salary must be at least {MIN_SALARY}, got {0}")]
    Salary(f64),

    #[error("Malformed request body: {0}")]
    MalformedBody(String),
}

/// Result type for validation operations
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Lower-case and trim an email so lookups and uniqueness are consistent
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn require_text(value: &str, field: &'static str, max: usize) -> ValidationResult<()> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField(field));
    }
    if trimmed.len() > max {
        return Err(ValidationError::TooLong(field));
    }
    Ok(())
}

/// Validate an email address
pub fn validate_email(email: &str) -> ValidationResult<&str> {
    if email.is_empty() {
        return Err(ValidationError::InvalidEmail(
            "Email address cannot be empty".to_string(),
        ));
    }

    if email.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::InvalidEmail(format!(
            "Email address cannot exceed {MAX_EMAIL_LENGTH} characters"
        )));
    }

    if !EMAIL_REGEX.is_match(email) {
        return Err(ValidationError::InvalidEmail(
            "Invalid email address format".to_string(),
        ));
    }

    Ok(email)
}

/// Validate a username
pub fn validate_username(username: &str) -> ValidationResult<&str> {
    if username.len() < MIN_USERNAME_LENGTH || username.len() > MAX_USERNAME_LENGTH {
        return Err(ValidationError::InvalidUsername(format!(
            "Username must be between {MIN_USERNAME_LENGTH} and {MAX_USERNAME_LENGTH} characters"
        )));
    }

    if !USERNAME_REGEX.is_match(username) {
        return Err(ValidationError::InvalidUsername(
            "Username may only contain letters, digits, '_', '.' and '-'".to_string(),
        ));
    }

    Ok(username)
}

/// Validate a password against the configured requirements
pub fn validate_password<'a>(
    password: &'a str,
    requirements: &PasswordRequirements,
) -> ValidationResult<&'a str> {
    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(ValidationError::InvalidPassword(format!(
            "Password cannot exceed {MAX_PASSWORD_LENGTH} characters"
        )));
    }

    if !validate_password_strength(password, requirements) {
        return Err(ValidationError::InvalidPassword(requirements.describe()));
    }

    Ok(password)
}

/// Validate a registration request. Expects the email to be normalized already.
pub fn validate_registration(
    req: &RegisterRequest,
    requirements: &PasswordRequirements,
) -> ValidationResult<()> {
    require_text(&req.first_name, "first_name", MAX_NAME_LENGTH)?;
    require_text(&req.last_name, "last_name", MAX_NAME_LENGTH)?;
    validate_username(&req.username)?;
    validate_email(&req.email)?;
    validate_password(&req.password, requirements)?;
    Ok(())
}

/// Trim the text fields of an employee payload and normalize its email
pub fn normalize_employee_input(input: EmployeeInput) -> EmployeeInput {
    EmployeeInput {
        first_name: input.first_name.trim().to_string(),
        last_name: input.last_name.trim().to_string(),
        email: normalize_email(&input.email),
        designation: input.designation.trim().to_string(),
        department: input.department.trim().to_string(),
        employee_photo: input
            .employee_photo
            .map(|photo| photo.trim().to_string())
            .filter(|photo| !photo.is_empty()),
        ..input
    }
}

/// Validate an employee payload
pub fn validate_employee_input(input: &EmployeeInput) -> ValidationResult<()> {
    require_text(&input.first_name, "first_name", MAX_NAME_LENGTH)?;
    require_text(&input.last_name, "last_name", MAX_NAME_LENGTH)?;
    validate_email(&input.email)?;
    require_text(&input.designation, "designation", MAX_NAME_LENGTH)?;
    require_text(&input.department, "department", MAX_NAME_LENGTH)?;

    if !input.salary.is_finite() || input.salary < MIN_SALARY {
        return Err(ValidationError::Salary(input.salary));
    }

    Ok(())
}

/// Validate a search term
pub fn validate_search_term(term: &str) -> ValidationResult<&str> {
    let term = term.trim();
    if term.is_empty() {
        return Err(ValidationError::EmptyField("term"));
    }
    if term.len() > MAX_SEARCH_TERM_LENGTH {
        return Err(ValidationError::TooLong("term"));
    }
    Ok(term)
}

/// Decode the raw query string of a search request.
///
/// A missing `term` decodes as empty and is rejected later by
/// [`validate_search_term`]; a repeated `term` is malformed.
pub fn decode_search_query(raw: Option<&str>) -> ValidationResult<SearchQuery> {
    let mut term = None;
    for (key, value) in form_urlencoded::parse(raw.unwrap_or_default().as_bytes()) {
        if key != "term" {
            continue;
        }
        if term.replace(value.into_owned()).is_some() {
            return Err(ValidationError::MalformedBody(
                "duplicate query parameter `term`".to_string(),
            ));
        }
    }
    Ok(SearchQuery {
        term: term.unwrap_or_default(),
    })
}

/// Decode a JSON request body into an employee payload
pub fn decode_employee_input(body: &[u8]) -> ValidationResult<EmployeeInput> {
    decode_body(body)
}

/// Parse a JSON request body
pub fn decode_body<T: DeserializeOwned>(body: &[u8]) -> ValidationResult<T> {
    serde_json::from_slice(body).map_err(|e| ValidationError::MalformedBody(e.to_string()))
}
