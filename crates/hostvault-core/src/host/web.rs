//! Web-serving host
//!
//! Same configuration pipeline as `HostBuilder`, plus the URLs the server
//! listens on. URLs come from `use_urls`, else the `urls` configuration key
//! (semicolon separated), else `http://localhost:5000`.

use url::Url;

use super::pipeline::ConfigurationPipeline;
use super::traits::{
    AppConfigurationBuilder, ConfigureDelegate, HostBuilderContext, HostError, HostResult,
};
use crate::config::{Configuration, ConfigurationBuilder};
use crate::logging::SharedLogger;

pub const DEFAULT_URL: &str = "http://localhost:5000";

/// Configuration key holding server URLs
pub const URLS_KEY: &str = "urls";

#[derive(Debug)]
pub struct WebHostBuilder {
    pipeline: ConfigurationPipeline,
    urls: Option<Vec<String>>,
}

impl WebHostBuilder {
    pub fn new(application_name: &str) -> Self {
        Self {
            pipeline: ConfigurationPipeline::new(application_name),
            urls: None,
        }
    }

    pub fn use_environment(&mut self, environment_name: impl Into<String>) -> &mut Self {
        self.pipeline.context.environment_name = environment_name.into();
        self
    }

    pub fn with_logger(&mut self, logger: SharedLogger) -> &mut Self {
        self.pipeline.logger = logger;
        self
    }

    /// Listen on these URLs regardless of configuration
    pub fn use_urls(&mut self, urls: &[&str]) -> &mut Self {
        self.urls = Some(urls.iter().map(|u| u.to_string()).collect());
        self
    }

    pub fn context(&self) -> &HostBuilderContext {
        &self.pipeline.context
    }

    pub fn configure_app_configuration<F>(&mut self, configure: F) -> &mut Self
    where
        F: FnOnce(&HostBuilderContext, &mut ConfigurationBuilder) + Send + 'static,
    {
        self.pipeline.push(Box::new(configure));
        self
    }

    pub async fn build(self) -> HostResult<WebHost> {
        let Self { pipeline, urls } = self;
        let (context, configuration) = pipeline.build().await?;

        let raw = match urls {
            Some(urls) => urls,
            None => configuration
                .get(URLS_KEY)
                .map(|v| {
                    v.split(';')
                        .map(str::trim)
                        .filter(|u| !u.is_empty())
                        .map(str::to_string)
                        .collect::<Vec<_>>()
                })
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| vec![DEFAULT_URL.to_string()]),
        };

        let urls = raw
            .iter()
            .map(|u| {
                Url::parse(u).map_err(|e| HostError::InvalidServerUrl {
                    url: u.clone(),
                    reason: e.to_string(),
                })
            })
            .collect::<HostResult<Vec<_>>>()?;

        Ok(WebHost {
            context,
            configuration,
            urls,
        })
    }
}

impl AppConfigurationBuilder for WebHostBuilder {
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

/// A built web host
#[derive(Debug, Clone)]
pub struct WebHost {
    context: HostBuilderContext,
    configuration: Configuration,
    urls: Vec<Url>,
}

impl WebHost {
    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    pub fn environment(&self) -> &str {
        &self.context.environment_name
    }

    pub fn context(&self) -> &HostBuilderContext {
        &self.context
    }

    /// Server URLs, in the order given
    pub fn urls(&self) -> &[Url] {
        &self.urls
    }
}
