//! In-memory vault client

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;

use super::traits::{SecretBundle, SecretItem, VaultClient, VaultError, VaultResult};

#[derive(Debug, Clone)]
struct StoredSecret {
    value: String,
    enabled: bool,
}

/// Vault client that serves secrets from memory
///
/// Stands in for `KeyVaultClient` in tests and local runs. The vault uri is
/// ignored; every endpoint sees the same secrets. Request counters let tests
/// check when the vault was actually contacted.
///
/// # Example
///
/// ```
/// use hostvault_core::vault::MemoryVaultClient;
///
/// let vault = MemoryVaultClient::new();
/// vault.set_secret("Database--Password", "hunter2");
/// assert_eq!(vault.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct MemoryVaultClient {
    secrets: RwLock<BTreeMap<String, StoredSecret>>,
    list_calls: AtomicUsize,
    get_calls: AtomicUsize,
}

impl MemoryVaultClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a vault with initial enabled secrets
    pub fn with_secrets<K, V>(secrets: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let vault = Self::new();
        for (name, value) in secrets {
            vault.set_secret(name, value);
        }
        vault
    }

    pub fn set_secret(&self, name: impl Into<String>, value: impl Into<String>) {
        self.secrets.write().insert(
            name.into(),
            StoredSecret {
                value: value.into(),
                enabled: true,
            },
        );
    }

    /// Store a secret that is listed as disabled
    pub fn set_disabled_secret(&self, name: impl Into<String>, value: impl Into<String>) {
        self.secrets.write().insert(
            name.into(),
            StoredSecret {
                value: value.into(),
                enabled: false,
            },
        );
    }

    pub fn remove_secret(&self, name: &str) -> bool {
        self.secrets.write().remove(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.secrets.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of `list_secrets` calls served
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    /// Number of `get_secret` calls served
    pub fn get_calls(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VaultClient for MemoryVaultClient {
    async fn list_secrets(&self, _vault_uri: &str) -> VaultResult<Vec<SecretItem>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .secrets
            .read()
            .iter()
            .map(|(name, secret)| {
                let item = SecretItem::new(name.clone());
                if secret.enabled {
                    item
                } else {
                    item.disabled()
                }
            })
            .collect())
    }

    async fn get_secret(&self, _vault_uri: &str, name: &str) -> VaultResult<SecretBundle> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        self.secrets
            .read()
            .get(name)
            .map(|secret| SecretBundle::new(name, secret.value.clone()))
            .ok_or_else(|| VaultError::NotFound(format!("secret '{}'", name)))
    }
}
