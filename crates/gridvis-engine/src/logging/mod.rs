//! Logging utilities.
//!
//! Logger initialization lives here; everything else logs through the
//! standard `log` facade.

mod init;

pub use init::{init_logging, LoggingConfig};
