//! Core traits and types for credential providers

use std::sync::Arc;
use std::time::SystemTime;

use async_trait::async_trait;
use thiserror::Error;

/// A bearer token and its expiry
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub token: String,
    pub expires_on: Option<SystemTime>,
}

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            expires_on: None,
        }
    }

    pub fn with_expiry(mut self, expires_on: SystemTime) -> Self {
        self.expires_on = Some(expires_on);
        self
    }

    pub fn is_expired(&self) -> bool {
        self.expires_on
            .map(|at| at <= SystemTime::now())
            .unwrap_or(false)
    }
}

// Never print the token itself
impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("token", &"<redacted>")
            .field("expires_on", &self.expires_on)
            .finish()
    }
}

/// Errors that can occur while acquiring a token
#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("Credential not available: {0}")]
    Unavailable(String),

    #[error("Identity endpoint returned {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("Invalid token response: {0}")]
    InvalidResponse(String),
}

pub type CredentialResult<T> = Result<T, CredentialError>;

/// Proves identity to the vault service
///
/// Implementations:
/// - `StaticTokenCredential`: fixed token (tests, local development)
/// - `ManagedIdentityCredential`: instance metadata identity endpoint
#[async_trait]
pub trait TokenCredential: Send + Sync {
    /// Acquire a token valid for `scopes`
    async fn get_token(&self, scopes: &[&str]) -> CredentialResult<AccessToken>;
}

pub type SharedCredential = Arc<dyn TokenCredential>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_access_token_expiry() {
        let token = AccessToken::new("abc");
        assert!(!token.is_expired());

        let past = SystemTime::now() - Duration::from_secs(60);
        assert!(AccessToken::new("abc").with_expiry(past).is_expired());

        let future = SystemTime::now() + Duration::from_secs(3600);
        assert!(!AccessToken::new("abc").with_expiry(future).is_expired());
    }

    #[test]
    fn test_access_token_debug_is_redacted() {
        let rendered = format!("{:?}", AccessToken::new("super-secret"));
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
