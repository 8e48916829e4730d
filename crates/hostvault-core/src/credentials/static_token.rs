//! Fixed-token credential

use async_trait::async_trait;

use super::traits::{AccessToken, CredentialResult, TokenCredential};

/// Hands out the same token for every scope
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use hostvault_core::credentials::{SharedCredential, StaticTokenCredential};
///
/// let credential: SharedCredential = Arc::new(StaticTokenCredential::new("dev-token"));
/// ```
#[derive(Clone)]
pub struct StaticTokenCredential {
    token: AccessToken,
}

impl StaticTokenCredential {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: AccessToken::new(token),
        }
    }

    pub fn from_token(token: AccessToken) -> Self {
        Self { token }
    }
}

impl std::fmt::Debug for StaticTokenCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticTokenCredential")
            .field("token", &self.token)
            .finish()
    }
}

#[async_trait]
impl TokenCredential for StaticTokenCredential {
    async fn get_token(&self, _scopes: &[&str]) -> CredentialResult<AccessToken> {
        Ok(self.token.clone())
    }
}
