/// Token validation seam for the WebSocket gateway
///
/// Credential issuance (password hashing, token signing for clients) lives
/// outside this crate; the gateway only needs the validate half. The
/// `TokenValidator` trait is the boundary, `SharedSecretValidator` is the
/// concrete binding the binary runs with.
use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use sha2::{Digest, Sha256};

use crate::errors::AuthError;

/// Identity established by a successful token validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenClaims {
    pub user_id: String,
    pub email: String,
}

/// Validates opaque bearer tokens into user identity
#[async_trait]
pub trait TokenValidator: Send + Sync {
    /// Validate a token, returning the owning identity or `AuthError::Failed`
    async fn validate(&self, token: &str) -> Result<TokenClaims, AuthError>;
}

/// Shared-secret token validator
///
/// Token format: `<user_id>:<email>:<sig>` where `sig` is the url-safe
/// base64 SHA-256 digest of `<secret>|<user_id>:<email>`. User ids must not
/// contain `:`.
pub struct SharedSecretValidator {
    secret: String,
}

impl SharedSecretValidator {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    fn signature(&self, user_id: &str, email: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.secret.as_bytes());
        hasher.update(b"|");
        hasher.update(user_id.as_bytes());
        hasher.update(b":");
        hasher.update(email.as_bytes());
        URL_SAFE_NO_PAD.encode(hasher.finalize())
    }

    /// Mint a token for a known identity. Development and test convenience;
    /// production issuance belongs to the auth service.
    pub fn mint_token(&self, user_id: &str, email: &str) -> String {
        format!("{}:{}:{}", user_id, email, self.signature(user_id, email))
    }
}

#[async_trait]
impl TokenValidator for SharedSecretValidator {
    async fn validate(&self, token: &str) -> Result<TokenClaims, AuthError> {
        let (payload, sig) = token.rsplit_once(':').ok_or(AuthError::Failed)?;
        let (user_id, email) = payload.split_once(':').ok_or(AuthError::Failed)?;

        if user_id.is_empty() || email.is_empty() {
            return Err(AuthError::Failed);
        }
        if self.signature(user_id, email) != sig {
            return Err(AuthError::Failed);
        }

        Ok(TokenClaims {
            user_id: user_id.to_string(),
            email: email.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mint_and_validate_roundtrip() {
        let validator = SharedSecretValidator::new("test-secret");
        let token = validator.mint_token("user-1", "dev@example.com");

        let claims = validator.validate(&token).await.unwrap();
        assert_eq!(claims.user_id, "user-1");
        assert_eq!(claims.email, "dev@example.com");
    }

    #[tokio::test]
    async fn test_tampered_signature_rejected() {
        let validator = SharedSecretValidator::new("test-secret");
        let mut token = validator.mint_token("user-1", "dev@example.com");
        token.push('x');

        assert_eq!(validator.validate(&token).await, Err(AuthError::Failed));
    }

    #[tokio::test]
    async fn test_wrong_secret_rejected() {
        let issuer = SharedSecretValidator::new("secret-a");
        let validator = SharedSecretValidator::new("secret-b");
        let token = issuer.mint_token("user-1", "dev@example.com");

        assert_eq!(validator.validate(&token).await, Err(AuthError::Failed));
    }

    #[tokio::test]
    async fn test_malformed_token_rejected() {
        let validator = SharedSecretValidator::new("test-secret");
        assert_eq!(validator.validate("garbage").await, Err(AuthError::Failed));
        assert_eq!(validator.validate("").await, Err(AuthError::Failed));
        assert_eq!(validator.validate("a:b").await, Err(AuthError::Failed));
    }
}
