//! YAML file configuration source
//!
//! Nested mappings are flattened into `:`-separated keys and sequence items
//! are indexed (`Servers:0`, `Servers:1`).

use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_yaml::Value;

use super::traits::{ConfigError, ConfigurationSource, ConfigResult, KEY_DELIMITER};

/// Reads a YAML document
///
/// # Example
///
/// ```no_run
/// use hostvault_core::config::YamlFileSource;
///
/// // ~/.config/orders-api/config.yaml, skipped when absent
/// let user = YamlFileSource::user("orders-api");
///
/// let settings = YamlFileSource::new("appsettings.yaml");
/// ```
#[derive(Debug, Clone)]
pub struct YamlFileSource {
    path: PathBuf,
    optional: bool,
}

impl YamlFileSource {
    /// A required file: loading fails if it does not exist
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            optional: false,
        }
    }

    /// A file that is skipped when missing
    pub fn optional(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            optional: true,
        }
    }

    /// Optional user-level file: `<config dir>/<app>/config.yaml`
    pub fn user(app_name: &str) -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")).join(".config"));
        Self::optional(config_dir.join(app_name).join("config.yaml"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    fn parse(&self, content: &str) -> ConfigResult<Vec<(String, String)>> {
        let document: Value = serde_yaml::from_str(content).map_err(|e| ConfigError::Parse {
            path: self.path.display().to_string(),
            message: e.to_string(),
        })?;

        let mut pairs = Vec::new();
        flatten(None, &document, &mut pairs);
        Ok(pairs)
    }
}

fn flatten(prefix: Option<&str>, value: &Value, out: &mut Vec<(String, String)>) {
    let join = |segment: &str| match prefix {
        Some(p) => format!("{}{}{}", p, KEY_DELIMITER, segment),
        None => segment.to_string(),
    };

    match value {
        Value::Mapping(map) => {
            for (k, v) in map {
                if let Some(segment) = scalar_to_string(k) {
                    flatten(Some(&join(&segment)), v, out);
                }
            }
        }
        Value::Sequence(items) => {
            for (index, item) in items.iter().enumerate() {
                flatten(Some(&join(&index.to_string())), item, out);
            }
        }
        Value::Tagged(tagged) => flatten(prefix, &tagged.value, out),
        scalar => {
            if let (Some(key), Some(text)) = (prefix, scalar_to_string(scalar)) {
                out.push((key.to_string(), text));
            }
        }
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => Some(String::new()),
        _ => None,
    }
}

#[async_trait]
impl ConfigurationSource for YamlFileSource {
    fn name(&self) -> String {
        format!("yaml:{}", self.path.display())
    }

    async fn load(&self) -> ConfigResult<Vec<(String, String)>> {
        if !self.path.exists() {
            if self.optional {
                return Ok(Vec::new());
            }
            return Err(ConfigError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("configuration file not found: {}", self.path.display()),
            )));
        }

        let content = fs::read_to_string(&self.path)?;
        self.parse(&content)
    }
}
