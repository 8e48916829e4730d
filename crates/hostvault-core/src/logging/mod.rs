//! Logging abstractions used by host builders and vault clients
//!
//! - `Logger` trait, injected into host builders (`with_logger`)
//! - `NoOpLogger`, `ConsoleLogger`, `MemoryLogger` implementations
//! - `file_logger`: global debug log enabled with `HOSTVAULT_DEBUG=1`

mod traits;
mod noop;
mod console;
mod memory;
pub mod file_logger;

pub use traits::{Logger, SharedLogger};
pub use noop::NoOpLogger;
pub use console::ConsoleLogger;
pub use memory::{MemoryLogger, LogEntry};

pub use file_logger::{
    log, trace, debug, info, warn, error,
    log_file_path, LogLevel,
};
