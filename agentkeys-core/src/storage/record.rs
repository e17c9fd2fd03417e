//! Typed, persisted, observable record.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, warn};

use super::backend::RecordBackend;
use super::error::PersistenceError;

/// Capacity of the change channel. Slow subscribers see `Lagged` and skip
/// to the newest value.
const CHANGE_CHANNEL_CAPACITY: usize = 16;

/// A single JSON document persisted under a fixed storage key.
///
/// The record reads as `T::default()` until something is written. A stored
/// value that doesn't parse is an error, and writes refuse to run over it.
///
/// Mutations go through [`RecordStore::update`], which reads the whole
/// record, applies the change and writes the whole record back while holding
/// this store's write lock. Writers sharing one `RecordStore` never drop each
/// other's keys. The lock and the change channel belong to the instance:
/// two stores over the same backend and key, or two processes sharing one
/// database, get last-writer-wins on the whole record.
///
/// Every write that changes the value is published to this store's
/// subscribers.
pub struct RecordStore<T> {
    key: &'static str,
    backend: Arc<dyn RecordBackend>,
    write_lock: Mutex<()>,
    changes: broadcast::Sender<T>,
}

impl<T> std::fmt::Debug for RecordStore<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordStore")
            .field("key", &self.key)
            .field("subscribers", &self.changes.receiver_count())
            .finish()
    }
}

impl<T> RecordStore<T>
where
    T: Serialize + DeserializeOwned + Default + Clone + PartialEq + Send + Sync + 'static,
{
    /// Create a store for `key` on top of `backend`.
    pub fn new(key: &'static str, backend: Arc<dyn RecordBackend>) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            key,
            backend,
            write_lock: Mutex::new(()),
            changes,
        }
    }

    /// Read the current value.
    ///
    /// A missing value reads as the default. A stored value that doesn't
    /// parse is returned as [`PersistenceError::Serialize`] and left in place.
    pub async fn get(&self) -> Result<T, PersistenceError> {
        let Some(json) = self.backend.load(self.key).await? else {
            return Ok(T::default());
        };

        serde_json::from_str::<T>(&json).map_err(|e| {
            warn!(key = %self.key, error = %e, "Stored record does not parse");
            PersistenceError::from(e)
        })
    }

    /// Read-modify-write the value.
    ///
    /// Nothing is written (and nobody is notified) when `f` leaves the value
    /// unchanged.
    pub async fn update<R, F>(&self, f: F) -> Result<R, PersistenceError>
    where
        F: FnOnce(&mut T) -> R,
    {
        let _guard = self.write_lock.lock().await;
        let current = self.get().await?;
        let mut next = current.clone();
        let result = f(&mut next);

        if next != current {
            self.write(next).await?;
        } else {
            debug!(key = %self.key, "Record unchanged, skipping write");
        }

        Ok(result)
    }

    /// Receive every value written after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<T> {
        self.changes.subscribe()
    }

    async fn write(&self, value: T) -> Result<(), PersistenceError> {
        let json = serde_json::to_string(&value)?;
        self.backend.store(self.key, &json).await?;
        debug!(key = %self.key, "Record persisted");

        // No subscribers is fine.
        let _ = self.changes.send(value);
        Ok(())
    }
}
