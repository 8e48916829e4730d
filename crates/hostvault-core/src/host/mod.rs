//! Host builders
//!
//! Two builder variants share one configuration pipeline:
//! - `HostBuilder`: generic process host
//! - `WebHostBuilder`: web-serving host, additionally resolving server URLs
//!
//! Both implement `AppConfigurationBuilder`, the only capability the vault
//! registrar needs, so `VaultSecretsExt` works on either.

mod traits;
mod pipeline;
mod generic;
mod web;

pub use traits::{
    AppConfigurationBuilder, ConfigureDelegate, HostBuilderContext, HostError, HostResult,
    DEFAULT_ENVIRONMENT, ENVIRONMENT_ENV,
};
pub use generic::{Host, HostBuilder};
pub use web::{WebHost, WebHostBuilder, DEFAULT_URL, URLS_KEY};
