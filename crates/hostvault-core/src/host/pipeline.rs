//! Configuration pipeline shared by both host builders

use std::sync::Arc;

use super::traits::{ConfigureDelegate, HostBuilderContext, HostResult};
use crate::config::{Configuration, ConfigurationBuilder};
use crate::logging::{NoOpLogger, SharedLogger};

pub(crate) struct ConfigurationPipeline {
    pub(crate) context: HostBuilderContext,
    pub(crate) logger: SharedLogger,
    delegates: Vec<ConfigureDelegate>,
}

impl ConfigurationPipeline {
    pub(crate) fn new(application_name: &str) -> Self {
        Self {
            context: HostBuilderContext::from_env(application_name),
            logger: Arc::new(NoOpLogger),
            delegates: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, delegate: ConfigureDelegate) {
        self.delegates.push(delegate);
    }

    pub(crate) fn len(&self) -> usize {
        self.delegates.len()
    }

    /// Run every delegate, then load the sources they registered
    pub(crate) async fn build(self) -> HostResult<(HostBuilderContext, Configuration)> {
        let Self {
            context,
            logger,
            delegates,
        } = self;

        let mut builder = ConfigurationBuilder::new();
        for delegate in delegates {
            delegate(&context, &mut builder);
        }

        logger.debug(&format!(
            "Building configuration for {} ({}) from {} sources",
            context.application_name,
            context.environment_name,
            builder.sources_len()
        ));

        let configuration = builder.build().await.inspect_err(|e| {
            logger.error(&format!("Configuration build failed: {}", e));
        })?;

        Ok((context, configuration))
    }
}

impl std::fmt::Debug for ConfigurationPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigurationPipeline")
            .field("context", &self.context)
            .field("delegates", &self.delegates.len())
            .finish()
    }
}
