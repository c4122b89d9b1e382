// ============================
// crates/backend-lib/src/auth/password.rs
// ============================
//! Password hashing and verification.
use scrypt::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Params, Scrypt,
};
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

/// Minimum password length accepted by any configuration
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Default scrypt cost (`log2(N)`)
pub const DEFAULT_SCRYPT_LOG_N: u8 = 15;

/// Password complexity requirements
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PasswordRequirements {
    pub min_length: usize,
    pub require_uppercase: bool,
    pub require_lowercase: bool,
    pub require_digit: bool,
    pub require_special: bool,
}

impl Default for PasswordRequirements {
    fn default() -> Self {
        Self {
            min_length: MIN_PASSWORD_LENGTH,
            require_uppercase: false,
            require_lowercase: false,
            require_digit: false,
            require_special: false,
        }
    }
}

impl PasswordRequirements {
    /// Human readable summary, used in validation errors
    pub fn describe(&self) -> String {
        let mut rules = vec![format!("at least {} characters", self.min_length)];
        if self.require_uppercase {
            rules.push("an uppercase letter".to_string());
        }
        if self.require_lowercase {
            rules.push("a lowercase letter".to_string());
        }
        if self.require_digit {
            rules.push("a digit".to_string());
        }
        if self.require_special {
            rules.push("a special character".to_string());
        }
        format!("Password must contain {}", rules.join(", "))
    }
}

/// Hash a password using scrypt with the given cost
pub fn hash_password(plain: &str, log_n: u8) -> anyhow::Result<String> {
    let salt = SaltString::encode_b64(&rand::random::<[u8; 16]>())?;
    let params = Params::new(log_n, Params::RECOMMENDED_R, Params::RECOMMENDED_P, Params::RECOMMENDED_LEN)
        .map_err(|e| anyhow::anyhow!("invalid scrypt params: {e}"))?;
    let hash = Scrypt
        .hash_password_customized(plain.as_bytes(), None, None, params, &salt)?
        .to_string();
    Ok(hash)
}

/// Verify a password against a hash
pub fn verify_password(hash: &str, plain: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };
    Scrypt.verify_password(plain.as_bytes(), &parsed_hash).is_ok()
}

/// Check if a password meets the complexity requirements
pub fn validate_password_strength(password: &str, requirements: &PasswordRequirements) -> bool {
    if password.chars().count() < requirements.min_length {
        return false;
    }

    if requirements.require_uppercase && !password.chars().any(char::is_uppercase) {
        return false;
    }

    if requirements.require_lowercase && !password.chars().any(char::is_lowercase) {
        return false;
    }

    if requirements.require_digit && !password.chars().any(|c| c.is_ascii_digit()) {
        return false;
    }

    if requirements.require_special && !password.chars().any(|c| !c.is_alphanumeric()) {
        return false;
    }

    true
}

/// Hash a password and zeroize the original
pub fn hash_password_secure(plain: &mut String, log_n: u8) -> anyhow::Result<String> {
    let hash = hash_password(plain, log_n);
    plain.zeroize();
    hash
}
