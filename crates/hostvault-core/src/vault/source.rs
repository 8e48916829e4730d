//! Configuration source reading every secret from a vault

use async_trait::async_trait;

use super::manager::SharedSecretNameMapper;
use super::traits::SharedVaultClient;
use crate::config::{ConfigError, ConfigResult, ConfigurationSource};
use crate::logging;

/// Loads all enabled secrets the mapper accepts
///
/// Constructed by the registrar inside the deferred configuration callback.
/// The vault is contacted only when the configuration is built.
pub struct VaultConfigurationSource {
    vault_uri: String,
    client: SharedVaultClient,
    mapper: SharedSecretNameMapper,
}

impl VaultConfigurationSource {
    pub fn new(
        vault_uri: impl Into<String>,
        client: SharedVaultClient,
        mapper: SharedSecretNameMapper,
    ) -> Self {
        Self {
            vault_uri: vault_uri.into(),
            client,
            mapper,
        }
    }

    pub fn vault_uri(&self) -> &str {
        &self.vault_uri
    }

    fn failed(&self, err: impl std::fmt::Display) -> ConfigError {
        ConfigError::source_failed(self.name(), err.to_string())
    }
}

impl std::fmt::Debug for VaultConfigurationSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultConfigurationSource")
            .field("vault_uri", &self.vault_uri)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ConfigurationSource for VaultConfigurationSource {
    fn name(&self) -> String {
        format!("vault:{}", self.vault_uri)
    }

    async fn load(&self) -> ConfigResult<Vec<(String, String)>> {
        let items = self
            .client
            .list_secrets(&self.vault_uri)
            .await
            .map_err(|e| self.failed(e))?;

        let wanted: Vec<String> = items
            .iter()
            .filter(|item| item.enabled && self.mapper.load(item))
            .map(|item| item.name.clone())
            .collect();

        logging::debug(
            "vault::source",
            &format!("Loading {} of {} secrets from {}", wanted.len(), items.len(), self.vault_uri),
        );

        let bundles = self
            .client
            .get_secrets(&self.vault_uri, &wanted)
            .await
            .map_err(|e| self.failed(e))?;

        Ok(bundles
            .into_iter()
            .map(|bundle| (self.mapper.get_key(&bundle), bundle.value))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use crate::vault::{DefaultSecretNameMapper, MemoryVaultClient, PrefixSecretNameMapper};

    const VAULT: &str = "https://my-vault.vault.example.com";

    #[tokio::test]
    async fn test_loads_enabled_secrets_with_mapped_keys() {
        let vault = Arc::new(MemoryVaultClient::with_secrets(vec![
            ("ConnectionStrings--Orders", "Server=prod"),
            ("ApiKey", "sk-live"),
        ]));
        vault.set_disabled_secret("Retired", "old");

        let source = VaultConfigurationSource::new(VAULT, vault.clone(), Arc::new(DefaultSecretNameMapper));
        let mut pairs = source.load().await.unwrap();
        pairs.sort();

        assert_eq!(
            pairs,
            vec![
                ("ApiKey".to_string(), "sk-live".to_string()),
                ("ConnectionStrings:Orders".to_string(), "Server=prod".to_string()),
            ]
        );
        // disabled secrets are never fetched
        assert_eq!(vault.get_calls(), 2);
    }

    #[tokio::test]
    async fn test_mapper_filters_secrets() {
        let vault = Arc::new(MemoryVaultClient::with_secrets(vec![
            ("OrdersApi-Token", "a"),
            ("BillingApi-Token", "b"),
        ]));
        let source = VaultConfigurationSource::new(
            VAULT,
            vault.clone(),
            Arc::new(PrefixSecretNameMapper::new("OrdersApi")),
        );

        let pairs = source.load().await.unwrap();
        assert_eq!(pairs, vec![("Token".to_string(), "a".to_string())]);
        assert_eq!(vault.get_calls(), 1);
    }

    #[tokio::test]
    async fn test_vault_errors_become_source_errors() {
        use crate::vault::{SecretBundle, SecretItem, VaultClient, VaultError, VaultResult};

        struct Unauthorized;

        #[async_trait]
        impl VaultClient for Unauthorized {
            async fn list_secrets(&self, _vault_uri: &str) -> VaultResult<Vec<SecretItem>> {
                Err(VaultError::Unauthorized)
            }

            async fn get_secret(&self, _vault_uri: &str, _name: &str) -> VaultResult<SecretBundle> {
                Err(VaultError::Unauthorized)
            }
        }

        let source = VaultConfigurationSource::new(VAULT, Arc::new(Unauthorized), Arc::new(DefaultSecretNameMapper));
        let err = source.load().await.unwrap_err();

        match err {
            ConfigError::Source { source_name, message } => {
                assert_eq!(source_name, format!("vault:{}", VAULT));
                assert!(message.contains("authentication failed"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_secret_fetches_are_bounded() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::time::Duration;
        use crate::vault::{SecretBundle, SecretItem, VaultClient, VaultResult, MAX_CONCURRENT_FETCHES};

        #[derive(Default)]
        struct SlowVault {
            in_flight: AtomicUsize,
            peak: AtomicUsize,
        }

        #[async_trait]
        impl VaultClient for SlowVault {
            async fn list_secrets(&self, _vault_uri: &str) -> VaultResult<Vec<SecretItem>> {
                Ok((0..40).map(|i| SecretItem::new(format!("Secret{i:02}"))).collect())
            }

            async fn get_secret(&self, _vault_uri: &str, name: &str) -> VaultResult<SecretBundle> {
                let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                self.peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(5)).await;
                self.in_flight.fetch_sub(1, Ordering::SeqCst);
                Ok(SecretBundle::new(name, format!("v-{name}")))
            }
        }

        let vault = Arc::new(SlowVault::default());
        let source = VaultConfigurationSource::new(VAULT, vault.clone(), Arc::new(DefaultSecretNameMapper));
        let pairs = source.load().await.unwrap();

        assert_eq!(pairs.len(), 40);
        assert_eq!(pairs[0], ("Secret00".to_string(), "v-Secret00".to_string()));
        assert_eq!(pairs[39], ("Secret39".to_string(), "v-Secret39".to_string()));
        let peak = vault.peak.load(Ordering::SeqCst);
        assert!(peak >= 1 && peak <= MAX_CONCURRENT_FETCHES, "peak {peak}");
    }

    #[tokio::test]
    async fn test_http_client_init_failure_surfaces_at_load() {
        use crate::credentials::StaticTokenCredential;
        use crate::vault::KeyVaultClient;

        let client = KeyVaultClient::with_http_error(
            Arc::new(StaticTokenCredential::new("vault-token")),
            "no TLS backend",
        );
        let source = VaultConfigurationSource::new(VAULT, Arc::new(client), Arc::new(DefaultSecretNameMapper));

        match source.load().await.unwrap_err() {
            ConfigError::Source { message, .. } => assert!(message.contains("no TLS backend")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
