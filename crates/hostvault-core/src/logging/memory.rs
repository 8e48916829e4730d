//! Logger that keeps entries in memory

use parking_lot::Mutex;

use super::file_logger::LogLevel;
use super::traits::Logger;

/// A single captured log line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
}

/// Captures log entries so tests can assert on what startup code reported
#[derive(Debug, Default)]
pub struct MemoryLogger {
    entries: Mutex<Vec<LogEntry>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything logged so far
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().clone()
    }

    /// Messages logged at exactly `level`
    pub fn messages_at(&self, level: LogLevel) -> Vec<String> {
        self.entries
            .lock()
            .iter()
            .filter(|e| e.level == level)
            .map(|e| e.message.clone())
            .collect()
    }

    fn push(&self, level: LogLevel, message: &str) {
        self.entries.lock().push(LogEntry {
            level,
            message: message.to_string(),
        });
    }
}

impl Logger for MemoryLogger {
    fn debug(&self, message: &str) {
        self.push(LogLevel::Debug, message);
    }

    fn info(&self, message: &str) {
        self.push(LogLevel::Info, message);
    }

    fn warn(&self, message: &str) {
        self.push(LogLevel::Warn, message);
    }

    fn error(&self, message: &str) {
        self.push(LogLevel::Error, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_logger_captures_in_order() {
        let logger = MemoryLogger::new();
        logger.info("first");
        logger.error("second");
        logger.info("third");

        let entries = logger.entries();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[1].level, LogLevel::Error);
        assert_eq!(logger.messages_at(LogLevel::Info), vec!["first", "third"]);
    }

    #[test]
    fn test_memory_logger_macros() {
        let logger = MemoryLogger::new();
        crate::log_warn!(logger, "retrying {} of {}", 1, 3);
        assert_eq!(logger.messages_at(LogLevel::Warn), vec!["retrying 1 of 3"]);
    }
}
