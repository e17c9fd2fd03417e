//! Storage backends holding serialized records.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tracing::debug;

use super::error::PersistenceError;
use crate::db::Database;

/// Durable key-value storage for whole serialized records.
///
/// Every write replaces the complete value stored under a key.
#[async_trait]
pub trait RecordBackend: Send + Sync {
    /// Load the serialized value stored under `key`, if any.
    async fn load(&self, key: &str) -> Result<Option<String>, PersistenceError>;

    /// Replace the value stored under `key`.
    async fn store(&self, key: &str, value: &str) -> Result<(), PersistenceError>;
}

// =============================================================================
// SQLite
// =============================================================================

/// Backend writing records into the `records` table of a [`Database`].
///
/// The connection is shared behind a mutex and every call runs on the
/// blocking thread pool.
#[derive(Debug, Clone)]
pub struct SqliteBackend {
    db: Arc<Mutex<Database>>,
}

impl SqliteBackend {
    /// Wrap an opened (and migrated) database.
    pub fn new(db: Database) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
        }
    }

    async fn with_db<T, F>(&self, f: F) -> Result<T, PersistenceError>
    where
        T: Send + 'static,
        F: FnOnce(&Database) -> Result<T, rusqlite::Error> + Send + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || {
            let guard = db
                .lock()
                .map_err(|_| PersistenceError::Backend("database lock poisoned".to_string()))?;
            f(&*guard).map_err(PersistenceError::from)
        })
        .await
        .map_err(|e| PersistenceError::Backend(e.to_string()))?
    }
}

#[async_trait]
impl RecordBackend for SqliteBackend {
    async fn load(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        let key = key.to_string();
        self.with_db(move |db| db.get_record(&key)).await
    }

    async fn store(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        let key = key.to_string();
        let value = value.to_string();
        debug!(key = %key, bytes = value.len(), "Writing record to database");
        self.with_db(move |db| db.put_record(&key, &value)).await
    }
}

// =============================================================================
// In-memory
// =============================================================================

/// Volatile backend for tests and ephemeral sessions.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    values: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryBackend {
    /// Create an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    fn values(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, PersistenceError> {
        self.values
            .lock()
            .map_err(|_| PersistenceError::Backend("memory backend lock poisoned".to_string()))
    }
}

#[async_trait]
impl RecordBackend for MemoryBackend {
    async fn load(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        Ok(self.values()?.get(key).cloned())
    }

    async fn store(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        self.values()?.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_memory_backend_roundtrip() {
        let backend = MemoryBackend::new();
        assert!(backend.load("key").await.unwrap().is_none());

        backend.store("key", "value").await.unwrap();
        assert_eq!(backend.load("key").await.unwrap(), Some("value".to_string()));
    }

    #[test]
    fn test_memory_backend_clones_share_state() {
        let backend = MemoryBackend::new();
        let other = backend.clone();

        tokio_test::block_on(backend.store("key", "value")).unwrap();
        assert_eq!(
            tokio_test::block_on(other.load("key")).unwrap(),
            Some("value".to_string())
        );
    }

    #[tokio::test]
    async fn test_sqlite_backend_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let db = Database::open_at(tmp.path().join("test.db")).unwrap();
        db.migrate().unwrap();
        let backend = SqliteBackend::new(db);

        backend.store("key", "one").await.unwrap();
        backend.store("key", "two").await.unwrap();

        assert_eq!(backend.load("key").await.unwrap(), Some("two".to_string()));
    }

    #[tokio::test]
    async fn test_sqlite_backend_surfaces_database_errors() {
        let tmp = TempDir::new().unwrap();
        // Not migrated: the records table does not exist.
        let db = Database::open_at(tmp.path().join("bare.db")).unwrap();
        let backend = SqliteBackend::new(db);

        let err = backend.store("key", "value").await.unwrap_err();
        assert!(matches!(err, PersistenceError::Database(_)));
    }
}
