//! Hostvault Core
//!
//! Loads secrets from a vault into an application's configuration during
//! host startup. The endpoint is checked when the vault is registered; the
//! secrets themselves are fetched when the host builds its configuration.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use hostvault_core::credentials::ManagedIdentityCredential;
//! use hostvault_core::host::HostBuilder;
//! use hostvault_core::registrar::VaultSecretsExt;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let mut builder = HostBuilder::new("orders-worker");
//! builder
//!     .add_secrets_to_configuration(
//!         "https://orders.vault.azure.net",
//!         Arc::new(ManagedIdentityCredential::new()),
//!     )?
//!     .configure_app_configuration(|_, config| {
//!         config.add_source(Arc::new(hostvault_core::config::EnvironmentVariablesSource::with_prefix("ORDERS_")));
//!     });
//!
//! let host = builder.build().await?;
//! println!("{:?}", host.configuration().get("ConnectionStrings:Orders"));
//! # Ok(())
//! # }
//! ```

pub mod logging;
pub mod endpoint;
pub mod config;
pub mod credentials;
pub mod vault;
pub mod host;
pub mod registrar;

// Re-export commonly used types
pub use endpoint::{validate_endpoint, parse_endpoint, InvalidEndpointFormat, VaultEndpoint};

pub use logging::{Logger, NoOpLogger, ConsoleLogger, MemoryLogger, SharedLogger};

pub use config::{
    ConfigurationSource, ConfigurationBuilder, Configuration, ConfigError, ConfigResult,
    MemoryConfigurationSource, EnvironmentVariablesSource, YamlFileSource,
};

pub use credentials::{
    TokenCredential, AccessToken, CredentialError, SharedCredential,
    StaticTokenCredential, ManagedIdentityCredential,
};

pub use vault::{
    VaultClient, VaultError, KeyVaultClient, MemoryVaultClient,
    SecretNameMapper, DefaultSecretNameMapper, PrefixSecretNameMapper,
    VaultConfigurationSource,
};

pub use host::{
    AppConfigurationBuilder, HostBuilderContext, HostBuilder, Host,
    WebHostBuilder, WebHost, HostError,
};

pub use registrar::{register_secret_source, register_secret_source_with, VaultSecretsExt};
