// ============================
// crates/backend-lib/src/auth/mod.rs
// ============================
//! Authentication module.

pub mod identity;
pub mod password;
pub mod rate_limit;
pub mod token;
mod service;
mod service_impl;

pub use identity::{require_identity, CurrentIdentity, Identity};
pub use password::{
    hash_password, validate_password_strength, verify_password, PasswordRequirements,
    DEFAULT_SCRYPT_LOG_N, MIN_PASSWORD_LENGTH,
};
pub use rate_limit::LoginThrottle;
pub use service::AuthService;
pub use service_impl::DefaultAuth;
pub use token::{TokenError, TokenService};
