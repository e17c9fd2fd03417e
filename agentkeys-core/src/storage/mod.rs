//! Persisted record storage.
//!
//! This module provides:
//! - `RecordBackend` - Durable key-value storage for serialized records
//! - `SqliteBackend` / `MemoryBackend` - Production and test backends
//! - `RecordStore` - A typed record with whole-record updates and change notification

mod backend;
mod error;
mod record;

pub use backend::{MemoryBackend, RecordBackend, SqliteBackend};
pub use error::PersistenceError;
pub use record::RecordStore;
