use async_trait::async_trait;
use records_common::{LoginRequest, PublicUser, RegisterRequest, TokenResponse};

use crate::error::AppResult;

/// Registration and login
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Create a user and return its public fields
    async fn register(&self, req: RegisterRequest) -> AppResult<PublicUser>;

    /// Check credentials and issue an access token
    async fn login(&self, req: LoginRequest) -> AppResult<TokenResponse>;
}
