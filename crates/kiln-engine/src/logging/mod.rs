//! Logging utilities.
//!
//! Centralizes logger initialization behind the standard `log` facade so
//! binaries and tests configure diagnostics the same way.

mod init;

pub use init::{init_logging, LoggingConfig};
