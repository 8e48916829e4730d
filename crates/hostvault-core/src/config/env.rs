//! Environment variable configuration source

use async_trait::async_trait;

use super::traits::{ConfigurationSource, ConfigResult, KEY_DELIMITER};

/// Double underscore stands in for `:` in variable names
const ENV_DELIMITER: &str = "__";

/// Reads the process environment
///
/// With a prefix, only variables starting with it are read and the prefix is
/// stripped: `ORDERS_Database__Host` with prefix `ORDERS_` becomes
/// `Database:Host`.
#[derive(Debug, Clone, Default)]
pub struct EnvironmentVariablesSource {
    prefix: Option<String>,
}

impl EnvironmentVariablesSource {
    /// Read every environment variable
    pub fn new() -> Self {
        Self { prefix: None }
    }

    /// Read only variables starting with `prefix` (case-insensitive)
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
        }
    }

    fn map_key(&self, name: &str) -> Option<String> {
        let stripped = match &self.prefix {
            Some(prefix) => {
                let head = name.get(..prefix.len())?;
                if !head.eq_ignore_ascii_case(prefix) {
                    return None;
                }
                &name[prefix.len()..]
            }
            None => name,
        };
        if stripped.is_empty() {
            return None;
        }
        Some(stripped.replace(ENV_DELIMITER, KEY_DELIMITER))
    }
}

#[async_trait]
impl ConfigurationSource for EnvironmentVariablesSource {
    fn name(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("env:{}", prefix),
            None => "env".to_string(),
        }
    }

    async fn load(&self) -> ConfigResult<Vec<(String, String)>> {
        // Variables that are not valid UTF-8 are skipped, not fatal
        Ok(std::env::vars_os()
            .filter_map(|(name, value)| Some((name.into_string().ok()?, value.into_string().ok()?)))
            .filter_map(|(name, value)| self.map_key(&name).map(|key| (key, value)))
            .collect())
    }
}
