//! Host builder capability trait and shared types

use thiserror::Error;

use crate::config::{ConfigError, ConfigurationBuilder};
use crate::logging::SharedLogger;

/// Environment variable naming the hosting environment
pub const ENVIRONMENT_ENV: &str = "HOSTVAULT_ENVIRONMENT";

pub const DEFAULT_ENVIRONMENT: &str = "Production";

/// Deferred configuration step, run when the host is built
pub type ConfigureDelegate = Box<dyn FnOnce(&HostBuilderContext, &mut ConfigurationBuilder) + Send>;

/// What a configuration delegate knows about the host being built
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostBuilderContext {
    pub environment_name: String,
    pub application_name: String,
}

impl HostBuilderContext {
    /// Read the environment name from `HOSTVAULT_ENVIRONMENT`
    pub fn from_env(application_name: impl Into<String>) -> Self {
        let environment_name = std::env::var(ENVIRONMENT_ENV)
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string());
        Self {
            environment_name,
            application_name: application_name.into(),
        }
    }

    pub fn is_environment(&self, name: &str) -> bool {
        self.environment_name.eq_ignore_ascii_case(name)
    }

    pub fn is_development(&self) -> bool {
        self.is_environment("Development")
    }

    pub fn is_production(&self) -> bool {
        self.is_environment(DEFAULT_ENVIRONMENT)
    }
}

/// A builder that accepts deferred configuration steps
///
/// Implemented by `HostBuilder` and `WebHostBuilder`.
pub trait AppConfigurationBuilder {
    /// Append a configuration step. Steps run in registration order.
    fn add_configure_delegate(&mut self, delegate: ConfigureDelegate);

    /// Number of configuration steps registered so far
    fn app_configuration_delegates(&self) -> usize;

    /// Logger for startup diagnostics
    fn logger(&self) -> SharedLogger;
}

/// Errors raised while building a host
#[derive(Error, Debug)]
pub enum HostError {
    #[error("Failed to build configuration: {0}")]
    Configuration(#[from] ConfigError),

    #[error("Invalid server url '{url}': {reason}")]
    InvalidServerUrl { url: String, reason: String },
}

pub type HostResult<T> = Result<T, HostError>;
