//! Configuration builder and the merged configuration tree

use std::collections::BTreeMap;
use std::sync::Arc;

use super::traits::{ConfigurationSource, ConfigResult, KEY_DELIMITER};
use crate::logging;

/// Ordered list of configuration sources
///
/// Sources are loaded in the order they were added; a key provided by a later
/// source overrides the same key from an earlier one.
#[derive(Default)]
pub struct ConfigurationBuilder {
    sources: Vec<Arc<dyn ConfigurationSource>>,
}

impl ConfigurationBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a source. Nothing is loaded until `build`.
    pub fn add_source(&mut self, source: Arc<dyn ConfigurationSource>) -> &mut Self {
        self.sources.push(source);
        self
    }

    pub fn sources_len(&self) -> usize {
        self.sources.len()
    }

    /// Names of the registered sources, in load order
    pub fn source_names(&self) -> Vec<String> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    /// Load every source and merge the results
    pub async fn build(&self) -> ConfigResult<Configuration> {
        let mut configuration = Configuration::default();

        for source in &self.sources {
            let name = source.name();
            let pairs = source.load().await.inspect_err(|e| {
                logging::error("config::builder", &format!("Source {} failed: {}", name, e));
            })?;
            logging::debug(
                "config::builder",
                &format!("Loaded {} keys from {}", pairs.len(), name),
            );
            for (key, value) in pairs {
                configuration.set(key, value);
            }
        }

        Ok(configuration)
    }
}

impl std::fmt::Debug for ConfigurationBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigurationBuilder")
            .field("sources", &self.source_names())
            .finish()
    }
}

/// Merged application configuration
///
/// Keys are case-insensitive and use `:` between sections. Iteration yields
/// keys in the casing of the source that wrote them last.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Configuration {
    // lower-cased key -> (key as written, value)
    entries: BTreeMap<String, (String, String)>,
}

impl Configuration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value, replacing any existing value for the same key
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        self.entries.insert(key.to_lowercase(), (key, value.into()));
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .get(&key.to_lowercase())
            .map(|(_, value)| value.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(&key.to_lowercase())
    }

    /// All values below `section`, keyed relative to it
    ///
    /// `get_section("Database")` on `Database:Host=db` yields `Host=db`.
    pub fn get_section(&self, section: &str) -> Configuration {
        let section_lower = section.to_lowercase();
        let section_chars = section.chars().count();
        let mut child = Configuration::default();
        for (key, value) in self.entries.values() {
            if let Some(relative) = relative_key(key, &section_lower, section_chars) {
                child.set(relative, value.clone());
            }
        }
        child
    }

    pub fn keys(&self) -> Vec<&str> {
        self.entries.values().map(|(key, _)| key.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .values()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The part of `key` after `<section>:`, split on the key as written
///
/// Lower-casing can change byte length (`İ`), so the split point is found by
/// counting chars in the original key.
fn relative_key<'k>(key: &'k str, section_lower: &str, section_chars: usize) -> Option<&'k str> {
    let split = key.char_indices().nth(section_chars).map(|(i, _)| i)?;
    let (head, rest) = key.split_at(split);
    if head.to_lowercase() != section_lower {
        return None;
    }
    rest.strip_prefix(KEY_DELIMITER)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigError, MemoryConfigurationSource};
    use async_trait::async_trait;

    struct FailingSource;

    #[async_trait]
    impl ConfigurationSource for FailingSource {
        fn name(&self) -> String {
            "failing".to_string()
        }

        async fn load(&self) -> ConfigResult<Vec<(String, String)>> {
            Err(ConfigError::source_failed("failing", "unreachable"))
        }
    }

    #[test]
    fn test_configuration_keys_are_case_insensitive() {
        let mut config = Configuration::new();
        config.set("Database:Host", "db.internal");

        assert_eq!(config.get("database:host"), Some("db.internal"));
        assert!(config.contains_key("DATABASE:HOST"));
        assert_eq!(config.keys(), vec!["Database:Host"]);

        config.set("DATABASE:HOST", "db2.internal");
        assert_eq!(config.len(), 1);
        assert_eq!(config.keys(), vec!["DATABASE:HOST"]);
        assert_eq!(config.get("Database:Host"), Some("db2.internal"));
    }

    #[test]
    fn test_get_section() {
        let mut config = Configuration::new();
        config.set("Database:Host", "db.internal");
        config.set("Database:Port", "5432");
        config.set("DatabaseName", "orders");
        config.set("Logging:Level", "info");

        let section = config.get_section("database");
        assert_eq!(section.len(), 2);
        assert_eq!(section.get("Host"), Some("db.internal"));
        assert_eq!(section.get("port"), Some("5432"));
        assert!(config.get_section("missing").is_empty());
    }

    #[test]
    fn test_get_section_with_non_ascii_name() {
        let mut config = Configuration::new();
        config.set("İstanbul:Host", "ist.internal");
        config.set("İstanbul:Port", "5432");
        config.set("Ankara:Host", "ank.internal");

        let section = config.get_section("İSTANBUL");
        assert_eq!(section.len(), 2);
        assert_eq!(section.keys(), vec!["Host", "Port"]);
        assert_eq!(section.get("host"), Some("ist.internal"));
    }

    #[tokio::test]
    async fn test_later_sources_override_earlier_ones() {
        let mut builder = ConfigurationBuilder::new();
        builder
            .add_source(Arc::new(MemoryConfigurationSource::new(vec![
                ("ConnectionStrings:Orders", "Server=local"),
                ("FeatureFlags:Beta", "false"),
            ])))
            .add_source(Arc::new(MemoryConfigurationSource::new(vec![(
                "connectionstrings:orders",
                "Server=prod",
            )])));

        assert_eq!(builder.sources_len(), 2);

        let config = builder.build().await.unwrap();
        assert_eq!(config.len(), 2);
        assert_eq!(config.get("ConnectionStrings:Orders"), Some("Server=prod"));
        assert_eq!(config.get("FeatureFlags:Beta"), Some("false"));
    }

    #[tokio::test]
    async fn test_build_fails_when_a_source_fails() {
        let mut builder = ConfigurationBuilder::new();
        builder
            .add_source(Arc::new(MemoryConfigurationSource::new(vec![("a", "1")])))
            .add_source(Arc::new(FailingSource));

        let err = builder.build().await.unwrap_err();
        assert!(matches!(err, ConfigError::Source { ref source_name, .. } if source_name == "failing"));
    }

    #[tokio::test]
    async fn test_empty_builder() {
        let config = ConfigurationBuilder::new().build().await.unwrap();
        assert!(config.is_empty());
    }
}
