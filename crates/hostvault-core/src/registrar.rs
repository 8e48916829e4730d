//! Registers a vault as a configuration source on a host builder
//!
//! Registration validates the endpoint, then appends one deferred
//! configuration step. The vault is not contacted until the host is built.
//! An invalid endpoint is rejected before the builder is touched.

use std::sync::Arc;

use crate::config::ConfigurationBuilder;
use crate::credentials::SharedCredential;
use crate::endpoint::{parse_endpoint, InvalidEndpointFormat, VaultEndpoint};
use crate::host::{AppConfigurationBuilder, HostBuilderContext};
use crate::vault::{
    DefaultSecretNameMapper, KeyVaultClient, SharedSecretNameMapper, SharedVaultClient,
    VaultConfigurationSource,
};
use crate::{log_error, log_info};

/// Add a vault configuration source authenticated with `credential`
///
/// Uses the HTTP `KeyVaultClient` and `DefaultSecretNameMapper`. Returns the
/// same builder for chaining. Registering the same endpoint twice adds two
/// sources.
pub fn register_secret_source<'b, B>(
    builder: &'b mut B,
    endpoint: &str,
    credential: SharedCredential,
) -> Result<&'b mut B, InvalidEndpointFormat>
where
    B: AppConfigurationBuilder + ?Sized,
{
    let endpoint = validated(builder, endpoint)?;
    let client: SharedVaultClient = Arc::new(KeyVaultClient::new(credential));
    attach(builder, endpoint, client, Arc::new(DefaultSecretNameMapper));
    Ok(builder)
}

/// Add a vault configuration source with an explicit client and name mapper
pub fn register_secret_source_with<'b, B>(
    builder: &'b mut B,
    endpoint: &str,
    client: SharedVaultClient,
    mapper: SharedSecretNameMapper,
) -> Result<&'b mut B, InvalidEndpointFormat>
where
    B: AppConfigurationBuilder + ?Sized,
{
    let endpoint = validated(builder, endpoint)?;
    attach(builder, endpoint, client, mapper);
    Ok(builder)
}

fn validated<B>(builder: &B, endpoint: &str) -> Result<VaultEndpoint, InvalidEndpointFormat>
where
    B: AppConfigurationBuilder + ?Sized,
{
    parse_endpoint(endpoint).inspect_err(|e| {
        log_error!(builder.logger(), "Rejected vault endpoint: {}", e);
    })
}

fn attach<B>(
    builder: &mut B,
    endpoint: VaultEndpoint,
    client: SharedVaultClient,
    mapper: SharedSecretNameMapper,
) where
    B: AppConfigurationBuilder + ?Sized,
{
    let vault_uri = endpoint.as_str().to_string();
    log_info!(builder.logger(), "Registering vault secrets source for {}", vault_uri);

    builder.add_configure_delegate(Box::new(
        move |_: &HostBuilderContext, config: &mut ConfigurationBuilder| {
            config.add_source(Arc::new(VaultConfigurationSource::new(vault_uri, client, mapper)));
        },
    ));
}

/// Vault registration for any host builder
///
/// ```
/// use std::sync::Arc;
/// use hostvault_core::credentials::StaticTokenCredential;
/// use hostvault_core::host::{AppConfigurationBuilder, WebHostBuilder};
/// use hostvault_core::registrar::VaultSecretsExt;
///
/// let mut builder = WebHostBuilder::new("orders-api");
/// builder
///     .add_secrets_to_configuration(
///         "https://my-vault.vault.example.com",
///         Arc::new(StaticTokenCredential::new("dev-token")),
///     )
///     .unwrap()
///     .use_urls(&["http://0.0.0.0:8080"]);
///
/// assert_eq!(builder.app_configuration_delegates(), 1);
/// assert!(builder
///     .add_secrets_to_configuration("http://insecure.example.com", Arc::new(StaticTokenCredential::new("t")))
///     .is_err());
/// ```
pub trait VaultSecretsExt: AppConfigurationBuilder {
    fn add_secrets_to_configuration(
        &mut self,
        endpoint: &str,
        credential: SharedCredential,
    ) -> Result<&mut Self, InvalidEndpointFormat> {
        register_secret_source(self, endpoint, credential)
    }

    fn add_secrets_to_configuration_with(
        &mut self,
        endpoint: &str,
        client: SharedVaultClient,
        mapper: SharedSecretNameMapper,
    ) -> Result<&mut Self, InvalidEndpointFormat> {
        register_secret_source_with(self, endpoint, client, mapper)
    }
}

impl<T: AppConfigurationBuilder + ?Sized> VaultSecretsExt for T {}
