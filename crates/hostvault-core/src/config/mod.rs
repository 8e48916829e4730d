//! Application configuration assembled from ordered sources
//!
//! - `ConfigurationBuilder`: ordered list of sources, later sources win
//! - `Configuration`: the merged, case-insensitive key/value tree
//! - Built-in sources: `MemoryConfigurationSource`, `EnvironmentVariablesSource`, `YamlFileSource`

mod traits;
mod builder;
mod memory;
mod env;
mod file;

pub use traits::{ConfigurationSource, ConfigError, ConfigResult, KEY_DELIMITER};
pub use builder::{ConfigurationBuilder, Configuration};
pub use memory::MemoryConfigurationSource;
pub use env::EnvironmentVariablesSource;
pub use file::YamlFileSource;
