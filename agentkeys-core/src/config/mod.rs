//! Configuration module for agentkeys.
//!
//! Manages application settings stored in SQLite.

mod settings;

pub use settings::{Settings, DEFAULT_LOG_LEVEL, DEFAULT_REQUEST_TIMEOUT_SECS};
