// ============================
// crates/backend-lib/src/config.rs
// ============================
//! Configuration management.
use std::fmt;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::rate_limit::{DEFAULT_LOCKOUT_DURATION, DEFAULT_MAX_ATTEMPTS};
use crate::auth::{PasswordRequirements, DEFAULT_SCRYPT_LOG_N, MIN_PASSWORD_LENGTH};

/// Prefix of environment variables read by [`Settings::load`]
pub const ENV_PREFIX: &str = "RECORDS_";

/// Shortest signing secret accepted, in bytes
pub const MIN_SECRET_LENGTH: usize = 32;

/// Longest token lifetime accepted
pub const MAX_TOKEN_TTL_SECS: u64 = 24 * 60 * 60;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// How the login identifier is matched against stored users
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum IdentifierMatch {
    Email,
    Username,
    #[default]
    EmailOrUsername,
}

/// Which storage backend to run with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    #[default]
    FlatFile,
    Memory,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Server bind address
    pub bind_addr: SocketAddr,
    /// Data directory path
    pub data_dir: PathBuf,
    /// Log level
    pub log_level: String,
    /// Storage backend
    pub storage: StorageBackend,
    /// Origins allowed by CORS; any origin when empty
    pub cors_allowed_origins: Vec<String>,
    /// Token and login settings
    pub auth: AuthSettings,
    /// Password requirements
    pub password_requirements: PasswordRequirements,
}

/// Token and login settings
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    /// HMAC secret used to sign access tokens. No default.
    pub jwt_secret: String,
    /// Access token lifetime in seconds
    pub token_ttl_secs: u64,
    /// Which stored field a login identifier is compared with
    pub identifier_match: IdentifierMatch,
    /// Failed logins before an identifier is locked out
    pub max_failed_attempts: u32,
    /// Lockout duration in seconds
    pub lockout_secs: u64,
    /// scrypt cost (`log2(N)`)
    pub scrypt_log_n: u8,
}

impl fmt::Debug for AuthSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthSettings")
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl_secs", &self.token_ttl_secs)
            .field("identifier_match", &self.identifier_match)
            .field("max_failed_attempts", &self.max_failed_attempts)
            .field("lockout_secs", &self.lockout_secs)
            .field("scrypt_log_n", &self.scrypt_log_n)
            .finish()
    }
}

/// Configuration rejected by [`Settings::validate`]
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown log level '{0}'")]
    LogLevel(String),

    #[error("auth.jwt_secret is not set")]
    MissingSecret,

    #[error("auth.jwt_secret must be at least {MIN_SECRET_LENGTH} bytes")]
    WeakSecret,

    #[error("auth.token_ttl_secs must be between 1 and {MAX_TOKEN_TTL_SECS}")]
    TokenTtl,

    #[error("password_requirements.min_length must be at least {MIN_PASSWORD_LENGTH}")]
    PasswordLength,

    #[error("auth.max_failed_attempts must be positive")]
    MaxAttempts,

    #[error("auth.scrypt_log_n must be between 1 and 20")]
    ScryptCost,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 5000)),
            data_dir: PathBuf::from("data"),
            log_level: "info".to_string(),
            storage: StorageBackend::default(),
            cors_allowed_origins: Vec::new(),
            auth: AuthSettings::default(),
            password_requirements: PasswordRequirements::default(),
        }
    }
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            token_ttl_secs: 60 * 60, // 1 hour
            identifier_match: IdentifierMatch::default(),
            max_failed_attempts: DEFAULT_MAX_ATTEMPTS,
            lockout_secs: DEFAULT_LOCKOUT_DURATION.as_secs(),
            scrypt_log_n: DEFAULT_SCRYPT_LOG_N,
        }
    }
}

impl Settings {
    fn figment(file: Figment) -> Figment {
        file
            // Plain JWT_SECRET is honoured for compatibility with older deployments.
            .merge(
                Env::raw()
                    .only(&["JWT_SECRET"])
                    .map(|_| "auth.jwt_secret".into()),
            )
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Load settings: defaults, then `config.toml` if present, then environment
    pub fn load() -> anyhow::Result<Self> {
        let base = Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file("config.toml"));
        Ok(Self::figment(base).extract()?)
    }

    /// Load settings from an explicit TOML file, then environment
    pub fn load_from<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            anyhow::bail!("config file {} does not exist", path.display());
        }
        let base = Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path));
        Ok(Self::figment(base).extract()?)
    }

    /// Reject settings the server must not start with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !LOG_LEVELS.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(ConfigError::LogLevel(self.log_level.clone()));
        }
        if self.auth.jwt_secret.is_empty() {
            return Err(ConfigError::MissingSecret);
        }
        if self.auth.jwt_secret.len() < MIN_SECRET_LENGTH {
            return Err(ConfigError::WeakSecret);
        }
        if self.auth.token_ttl_secs == 0 || self.auth.token_ttl_secs > MAX_TOKEN_TTL_SECS {
            return Err(ConfigError::TokenTtl);
        }
        if self.password_requirements.min_length < MIN_PASSWORD_LENGTH {
            return Err(ConfigError::PasswordLength);
        }
        if self.auth.max_failed_attempts == 0 {
            return Err(ConfigError::MaxAttempts);
        }
        if !(1..=20).contains(&self.auth.scrypt_log_n) {
            return Err(ConfigError::ScryptCost);
        }
        Ok(())
    }
}
