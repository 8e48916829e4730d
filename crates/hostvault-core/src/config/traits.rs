//! Configuration source trait

use async_trait::async_trait;

/// Separator between section names in a configuration key (`Database:Host`)
pub const KEY_DELIMITER: &str = ":";

/// A provider of key/value pairs merged into the application configuration
///
/// Implementations:
/// - `MemoryConfigurationSource`: fixed pairs
/// - `EnvironmentVariablesSource`: process environment
/// - `YamlFileSource`: flattened YAML document
/// - `VaultConfigurationSource`: secrets read from a vault
#[async_trait]
pub trait ConfigurationSource: Send + Sync {
    /// Human-readable name, used in errors and logs
    fn name(&self) -> String;

    /// Read every pair this source provides
    ///
    /// Called once, when the owning `ConfigurationBuilder` is built.
    async fn load(&self) -> ConfigResult<Vec<(String, String)>>;
}

/// Errors that can occur while loading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse {path}: {message}")]
    Parse { path: String, message: String },

    #[error("Configuration source '{source_name}' failed: {message}")]
    Source { source_name: String, message: String },

    #[error("Configuration error: {0}")]
    Other(String),
}

impl ConfigError {
    pub fn source_failed(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Source {
            source_name: source_name.into(),
            message: message.into(),
        }
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;
