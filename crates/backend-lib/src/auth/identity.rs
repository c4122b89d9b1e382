//! Verified principal attached to a request.
use records_common::TokenClaims;

use crate::error::AppError;

/// A caller whose access token verified. Rebuilt for every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// User id the token was issued for
    pub subject: String,
    pub username: Option<String>,
    pub email: Option<String>,
}

impl From<TokenClaims> for Identity {
    fn from(claims: TokenClaims) -> Self {
        Self {
            subject: claims.sub,
            username: claims.username,
            email: claims.email,
        }
    }
}

/// Identity resolved by the auth gate for one request; `None` when the
/// request carried no valid token.
#[derive(Debug, Clone, Default)]
pub struct CurrentIdentity(pub Option<Identity>);

impl CurrentIdentity {
    pub fn identity(&self) -> Option<&Identity> {
        self.0.as_ref()
    }
}

/// Fail with `Unauthorized` unless an identity is present
pub fn require_identity(identity: Option<&Identity>) -> Result<&Identity, AppError> {
    identity.ok_or(AppError::Unauthorized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_identity() {
        assert!(matches!(require_identity(None), Err(AppError::Unauthorized)));

        let who = Identity {
            subject: "1".into(),
            username: None,
            email: None,
        };
        assert_eq!(require_identity(Some(&who)).unwrap().subject, "1");
    }
}
