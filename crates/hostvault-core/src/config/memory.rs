//! In-memory configuration source

use async_trait::async_trait;

use super::traits::{ConfigurationSource, ConfigResult};

/// Fixed key/value pairs, typically defaults or test fixtures
#[derive(Debug, Clone, Default)]
pub struct MemoryConfigurationSource {
    pairs: Vec<(String, String)>,
}

impl MemoryConfigurationSource {
    pub fn new<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            pairs: pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

#[async_trait]
impl ConfigurationSource for MemoryConfigurationSource {
    fn name(&self) -> String {
        "memory".to_string()
    }

    async fn load(&self) -> ConfigResult<Vec<(String, String)>> {
        Ok(self.pairs.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_source_returns_pairs_in_order() {
        let source = MemoryConfigurationSource::new(vec![("b", "2"), ("a", "1")]);
        assert_eq!(source.len(), 2);

        let pairs = source.load().await.unwrap();
        assert_eq!(pairs[0], ("b".to_string(), "2".to_string()));
        assert_eq!(pairs[1], ("a".to_string(), "1".to_string()));
    }
}
