//! Persistence error type.

use thiserror::Error;

/// Failure in the durable storage underneath a record.
///
/// Propagated to callers unmodified; nothing at this layer retries.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("Storage backend error: {0}")]
    Backend(String),
}
