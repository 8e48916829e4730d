//! Generic process host

use super::pipeline::ConfigurationPipeline;
use super::traits::{AppConfigurationBuilder, ConfigureDelegate, HostBuilderContext, HostResult};
use crate::config::{Configuration, ConfigurationBuilder};
use crate::logging::SharedLogger;

/// Builder for a non-web host
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use hostvault_core::credentials::ManagedIdentityCredential;
/// use hostvault_core::host::HostBuilder;
/// use hostvault_core::registrar::VaultSecretsExt;
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let mut builder = HostBuilder::new("orders-worker");
/// builder.add_secrets_to_configuration(
///     "https://orders.vault.azure.net",
///     Arc::new(ManagedIdentityCredential::new()),
/// )?;
///
/// let host = builder.build().await?;
/// let password = host.configuration().get("Database:Password");
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct HostBuilder {
    pipeline: ConfigurationPipeline,
}

impl HostBuilder {
    pub fn new(application_name: &str) -> Self {
        Self {
            pipeline: ConfigurationPipeline::new(application_name),
        }
    }

    /// Override the environment read from `HOSTVAULT_ENVIRONMENT`
    pub fn use_environment(&mut self, environment_name: impl Into<String>) -> &mut Self {
        self.pipeline.context.environment_name = environment_name.into();
        self
    }

    pub fn with_logger(&mut self, logger: SharedLogger) -> &mut Self {
        self.pipeline.logger = logger;
        self
    }

    pub fn context(&self) -> &HostBuilderContext {
        &self.pipeline.context
    }

    /// Register a configuration step to run at build time
    pub fn configure_app_configuration<F>(&mut self, configure: F) -> &mut Self
    where
        F: FnOnce(&HostBuilderContext, &mut ConfigurationBuilder) + Send + 'static,
    {
        self.pipeline.push(Box::new(configure));
        self
    }

    /// Run the configuration steps and load every source
    pub async fn build(self) -> HostResult<Host> {
        let (context, configuration) = self.pipeline.build().await?;
        Ok(Host {
            context,
            configuration,
        })
    }
}

impl AppConfigurationBuilder for HostBuilder {
    fn add_configure_delegate(&mut self, delegate: ConfigureDelegate) {
        self.pipeline.push(delegate);
    }

    fn app_configuration_delegates(&self) -> usize {
        self.pipeline.len()
    }

    fn logger(&self) -> SharedLogger {
        self.pipeline.logger.clone()
    }
}

/// A built host
#[derive(Debug, Clone)]
pub struct Host {
    context: HostBuilderContext,
    configuration: Configuration,
}

impl Host {
    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    pub fn environment(&self) -> &str {
        &self.context.environment_name
    }

    pub fn context(&self) -> &HostBuilderContext {
        &self.context
    }
}
