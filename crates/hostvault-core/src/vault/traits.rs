//! Core traits and types for vault access

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{self, StreamExt, TryStreamExt};
use thiserror::Error;

use crate::credentials::CredentialError;

/// Upper bound on secret fetches in flight at once for one vault
pub const MAX_CONCURRENT_FETCHES: usize = 4;

/// A secret as it appears in a listing: metadata only, no value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretItem {
    pub name: String,
    pub enabled: bool,
    pub content_type: Option<String>,
    pub tags: HashMap<String, String>,
}

impl SecretItem {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            enabled: true,
            content_type: None,
            tags: HashMap::new(),
        }
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

/// A secret with its current value
#[derive(Clone, PartialEq, Eq)]
pub struct SecretBundle {
    pub name: String,
    pub value: String,
    pub content_type: Option<String>,
}

impl SecretBundle {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            content_type: None,
        }
    }
}

impl std::fmt::Debug for SecretBundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretBundle")
            .field("name", &self.name)
            .field("value", &"<redacted>")
            .field("content_type", &self.content_type)
            .finish()
    }
}

/// Vault access errors. Raw response bodies are never included.
#[derive(Error, Debug)]
pub enum VaultError {
    #[error("Invalid vault uri '{0}'")]
    InvalidVaultUri(String),

    #[error("Failed to acquire vault credential: {0}")]
    Credential(#[from] CredentialError),

    #[error("Vault HTTP client could not be created: {0}")]
    ClientInit(String),

    #[error("Network error communicating with the vault")]
    Network(#[source] reqwest::Error),

    #[error("Vault authentication failed (check identity permissions)")]
    Unauthorized,

    #[error("Vault resource not found: {0}")]
    NotFound(String),

    #[error("Vault rate limit exceeded")]
    RateLimited,

    #[error("Vault server error: status {0}")]
    ServerError(u16),

    #[error("Unexpected vault response: status {0}")]
    UnexpectedStatus(u16),

    #[error("Invalid vault response: {0}")]
    InvalidResponse(String),
}

pub type VaultResult<T> = Result<T, VaultError>;

/// Read access to a secret vault
///
/// `vault_uri` is the endpoint handed to the registrar. Implementations own
/// any validation deeper than the scheme check done at registration.
#[async_trait]
pub trait VaultClient: Send + Sync {
    /// List every secret in the vault (metadata only)
    async fn list_secrets(&self, vault_uri: &str) -> VaultResult<Vec<SecretItem>>;

    /// Fetch the current value of one secret
    async fn get_secret(&self, vault_uri: &str, name: &str) -> VaultResult<SecretBundle>;

    /// Fetch several secrets, results in the order of `names`
    ///
    /// At most `MAX_CONCURRENT_FETCHES` requests are in flight; the first
    /// error stops the batch.
    async fn get_secrets(&self, vault_uri: &str, names: &[String]) -> VaultResult<Vec<SecretBundle>> {
        let fetches: Vec<_> = names.iter().map(|name| self.get_secret(vault_uri, name)).collect();
        stream::iter(fetches)
            .buffered(MAX_CONCURRENT_FETCHES)
            .try_collect()
            .await
    }
}

pub type SharedVaultClient = Arc<dyn VaultClient>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_item_builder() {
        let item = SecretItem::new("Database--Password");
        assert!(item.enabled);
        assert!(!item.disabled().enabled);
    }

    #[test]
    fn test_secret_bundle_debug_is_redacted() {
        let rendered = format!("{:?}", SecretBundle::new("ApiKey", "sk-live-123"));
        assert!(rendered.contains("ApiKey"));
        assert!(!rendered.contains("sk-live-123"));
    }
}
