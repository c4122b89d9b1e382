use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use metrics::counter;
use records_common::{LoginRequest, PublicUser, RegisterRequest, TokenResponse};
use tokio::sync::OnceCell;
use tracing::{info, warn};

use super::password::hash_password_secure;
use super::{
    verify_password, AuthService, Identity, LoginThrottle, PasswordRequirements, TokenService,
};
use crate::config::{IdentifierMatch, Settings};
use crate::error::{AppError, AppResult};
use crate::metrics::{LOGIN_FAILURE, LOGIN_LOCKOUT, LOGIN_SUCCESS, USER_REGISTERED};
use crate::storage::{CredentialStore, NewCredential};
use crate::validation::{normalize_email, validate_registration, ValidationError};

pub struct DefaultAuth {
    store: Arc<dyn CredentialStore>,
    tokens: Arc<TokenService>,
    throttle: LoginThrottle,
    identifier_match: IdentifierMatch,
    password_requirements: PasswordRequirements,
    scrypt_log_n: u8,
    // Hash checked on lookup misses so they cost as much as a wrong password.
    decoy_hash: OnceCell<String>,
}

impl DefaultAuth {
    pub fn new(store: Arc<dyn CredentialStore>, tokens: Arc<TokenService>, settings: &Settings) -> Self {
        Self {
            store,
            tokens,
            throttle: LoginThrottle::new(
                settings.auth.max_failed_attempts,
                Duration::from_secs(settings.auth.lockout_secs),
            ),
            identifier_match: settings.auth.identifier_match,
            password_requirements: settings.password_requirements.clone(),
            scrypt_log_n: settings.auth.scrypt_log_n,
            decoy_hash: OnceCell::new(),
        }
    }

    /// Failed-login bookkeeping, shared with the background cleanup task
    pub fn throttle(&self) -> &LoginThrottle {
        &self.throttle
    }

    async fn hash(&self, mut password: String) -> AppResult<String> {
        let log_n = self.scrypt_log_n;
        tokio::task::spawn_blocking(move || hash_password_secure(&mut password, log_n))
            .await?
            .map_err(|e| AppError::Internal(format!("password hashing failed: {e}")))
    }

    async fn decoy_hash(&self) -> AppResult<String> {
        self.decoy_hash
            .get_or_try_init(|| self.hash("decoy-password".to_string()))
            .await
            .cloned()
    }

    async fn check_password(&self, hash: String, password: String) -> AppResult<bool> {
        Ok(tokio::task::spawn_blocking(move || verify_password(&hash, &password)).await?)
    }

    fn login_failed(&self, identifier: &str) -> AppError {
        counter!(LOGIN_FAILURE).increment(1);
        if self.throttle.record_failure(identifier) {
            counter!(LOGIN_LOCKOUT).increment(1);
            warn!(identifier, "too many failed logins, locking out");
        }
        AppError::InvalidCredentials
    }
}

#[async_trait]
impl AuthService for DefaultAuth {
    async fn register(&self, req: RegisterRequest) -> AppResult<PublicUser> {
        let req = RegisterRequest {
            first_name: req.first_name.trim().to_string(),
            last_name: req.last_name.trim().to_string(),
            username: req.username.trim().to_string(),
            email: normalize_email(&req.email),
            password: req.password,
        };
        validate_registration(&req, &self.password_requirements)?;

        // Checked up front to skip hashing; the store enforces it again on write.
        if self
            .store
            .find_by_identifier(&req.email, IdentifierMatch::Email)
            .await?
            .is_some()
        {
            return Err(AppError::DuplicateIdentifier(req.email));
        }
        if self
            .store
            .find_by_identifier(&req.username, IdentifierMatch::Username)
            .await?
            .is_some()
        {
            return Err(AppError::DuplicateIdentifier(req.username));
        }

        let password_hash = self.hash(req.password).await?;
        let record = self
            .store
            .create(NewCredential {
                first_name: req.first_name,
                last_name: req.last_name,
                username: req.username,
                email: req.email,
                password_hash,
            })
            .await?;

        counter!(USER_REGISTERED).increment(1);
        info!(user_id = %record.id, username = %record.username, "user registered");
        Ok(record.to_public())
    }

    async fn login(&self, req: LoginRequest) -> AppResult<TokenResponse> {
        let LoginRequest { identifier, password } = req;
        let identifier = identifier.trim().to_string();
        if identifier.is_empty() {
            return Err(ValidationError::EmptyField("identifier").into());
        }
        if password.is_empty() {
            return Err(ValidationError::EmptyField("password").into());
        }

        if !self.throttle.is_allowed(&identifier) {
            warn!(identifier = %identifier, "login attempt while locked out");
            return Err(AppError::AuthRateLimited);
        }

        let record = self
            .store
            .find_by_identifier(&identifier, self.identifier_match)
            .await?;

        let Some(record) = record else {
            // Burn the same work as a real comparison; the outcome is ignored.
            let decoy = self.decoy_hash().await?;
            self.check_password(decoy, password).await?;
            return Err(self.login_failed(&identifier));
        };

        if !self
            .check_password(record.stored_hash().to_string(), password)
            .await?
        {
            return Err(self.login_failed(&identifier));
        }

        self.throttle.record_success(&identifier);

        let identity = Identity {
            subject: record.id.to_string(),
            username: Some(record.username.clone()),
            email: Some(record.email.clone()),
        };
        let token = self
            .tokens
            .issue(&identity)
            .map_err(|e| AppError::Internal(e.to_string()))?;

        counter!(LOGIN_SUCCESS).increment(1);
        info!(user_id = %record.id, "user logged in");

        Ok(TokenResponse {
            token,
            token_type: "Bearer".to_string(),
            expires_in: self.tokens.ttl().num_seconds().max(0) as u64,
        })
    }
}
