//! Vault-backed configuration
//!
//! - `VaultClient` trait with the HTTP `KeyVaultClient` and an in-memory `MemoryVaultClient`
//! - `SecretNameMapper` policies turning secret names into configuration keys
//! - `VaultConfigurationSource`, the configuration source the registrar installs

mod traits;
mod client;
mod memory;
mod manager;
mod source;

pub use traits::{
    SecretBundle, SecretItem, SharedVaultClient, VaultClient, VaultError, VaultResult,
    MAX_CONCURRENT_FETCHES,
};
pub use client::{KeyVaultClient, KEY_VAULT_API_VERSION, KEY_VAULT_SCOPE};
pub use memory::MemoryVaultClient;
pub use manager::{DefaultSecretNameMapper, PrefixSecretNameMapper, SecretNameMapper, SharedSecretNameMapper};
pub use source::VaultConfigurationSource;
