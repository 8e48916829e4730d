//! Secret name mapping policies
//!
//! Secret names cannot contain `:`, so `--` stands in for the configuration
//! section delimiter: `Database--Password` becomes `Database:Password`.

use std::sync::Arc;

use super::traits::{SecretBundle, SecretItem};
use crate::config::KEY_DELIMITER;

const SECRET_DELIMITER: &str = "--";

/// Decides which secrets are loaded and what configuration key each gets
pub trait SecretNameMapper: Send + Sync {
    /// Whether the listed secret should be loaded at all
    fn load(&self, secret: &SecretItem) -> bool;

    /// Configuration key for a loaded secret
    fn get_key(&self, secret: &SecretBundle) -> String;
}

pub type SharedSecretNameMapper = Arc<dyn SecretNameMapper>;

/// Loads every secret and maps `--` to `:`
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultSecretNameMapper;

impl DefaultSecretNameMapper {
    pub fn new() -> Self {
        Self
    }
}

impl SecretNameMapper for DefaultSecretNameMapper {
    fn load(&self, _secret: &SecretItem) -> bool {
        true
    }

    fn get_key(&self, secret: &SecretBundle) -> String {
        secret.name.replace(SECRET_DELIMITER, KEY_DELIMITER)
    }
}

/// Loads only secrets named `{prefix}-...` and strips the prefix
///
/// Lets several applications share one vault: with prefix `OrdersApi`,
/// `OrdersApi-Database--Password` becomes `Database:Password` and
/// `BillingApi-Database--Password` is skipped.
#[derive(Debug, Clone)]
pub struct PrefixSecretNameMapper {
    prefix: String,
}

impl PrefixSecretNameMapper {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: format!("{}-", prefix.into()),
        }
    }
}

impl SecretNameMapper for PrefixSecretNameMapper {
    fn load(&self, secret: &SecretItem) -> bool {
        secret.name.starts_with(&self.prefix)
    }

    fn get_key(&self, secret: &SecretBundle) -> String {
        secret
            .name
            .strip_prefix(&self.prefix)
            .unwrap_or(&secret.name)
            .replace(SECRET_DELIMITER, KEY_DELIMITER)
    }
}
