//! No-op logger implementation

use super::traits::Logger;

/// A logger that discards everything
///
/// Host builders start with this logger until `with_logger` replaces it.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpLogger;

impl NoOpLogger {
    pub fn new() -> Self {
        Self
    }
}

impl Logger for NoOpLogger {
    fn debug(&self, _message: &str) {}
    fn info(&self, _message: &str) {}
    fn warn(&self, _message: &str) {}
    fn error(&self, _message: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use crate::logging::SharedLogger;

    #[test]
    fn test_noop_logger_as_shared() {
        let logger: SharedLogger = Arc::new(NoOpLogger::new());
        logger.debug("startup");
        logger.error("ignored");
    }
}
