//! Provider credential store.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::storage::{RecordBackend, RecordStore};

use super::types::{ProviderConfig, ProviderConfigRecord, StoreResult, ValidationError};

/// Storage key of the provider credentials record.
pub const PROVIDER_CREDENTIALS_KEY: &str = "provider-credentials";

/// Persisted provider credentials, keyed by provider identifier.
///
/// Writes are validated before any I/O; reads and removals of missing
/// providers never fail.
#[derive(Debug)]
pub struct ProviderConfigStore {
    record: RecordStore<ProviderConfigRecord>,
}

impl ProviderConfigStore {
    /// Create a store on top of `backend`.
    pub fn new(backend: Arc<dyn RecordBackend>) -> Self {
        Self {
            record: RecordStore::new(PROVIDER_CREDENTIALS_KEY, backend),
        }
    }

    /// Insert or overwrite the credentials for `provider`.
    pub async fn set_provider(&self, provider: &str, config: ProviderConfig) -> StoreResult<()> {
        if provider.is_empty() {
            return Err(ValidationError::EmptyProvider.into());
        }
        if config.api_key.is_empty() {
            return Err(ValidationError::EmptyApiKey.into());
        }

        info!(
            provider = %provider,
            has_base_url = config.base_url().is_some(),
            "Saving provider credentials"
        );
        self.record
            .update(|record| {
                record.providers.insert(provider.to_string(), config);
            })
            .await?;
        Ok(())
    }

    /// Get the credentials for `provider`.
    ///
    /// Returns `None` if the provider isn't configured.
    pub async fn get_provider(&self, provider: &str) -> StoreResult<Option<ProviderConfig>> {
        let mut record = self.record.get().await?;
        Ok(record.providers.remove(provider))
    }

    /// Remove the credentials for `provider`.
    ///
    /// No-op if the provider isn't configured.
    pub async fn remove_provider(&self, provider: &str) -> StoreResult<()> {
        let removed = self
            .record
            .update(|record| record.providers.remove(provider).is_some())
            .await?;
        debug!(provider = %provider, removed, "Remove provider");
        Ok(())
    }

    /// Check if credentials exist for `provider`.
    pub async fn has_provider(&self, provider: &str) -> StoreResult<bool> {
        Ok(self.record.get().await?.providers.contains_key(provider))
    }

    /// Identifiers of all configured providers, sorted.
    pub async fn get_configured_providers(&self) -> StoreResult<Vec<String>> {
        Ok(self.record.get().await?.providers.into_keys().collect())
    }

    /// Snapshot of every configured provider.
    ///
    /// The returned map is owned by the caller; changing it doesn't touch the store.
    pub async fn get_all_providers(&self) -> StoreResult<BTreeMap<String, ProviderConfig>> {
        Ok(self.record.get().await?.providers)
    }

    /// Receive the full record after every change.
    pub fn subscribe(&self) -> broadcast::Receiver<ProviderConfigRecord> {
        self.record.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryBackend, PersistenceError};
    use crate::stores::StoreError;

    fn setup_store() -> (MemoryBackend, ProviderConfigStore) {
        let backend = MemoryBackend::new();
        let store = ProviderConfigStore::new(Arc::new(backend.clone()));
        (backend, store)
    }

    #[tokio::test]
    async fn test_set_then_get_returns_same_config() {
        let (_backend, store) = setup_store();

        let config = ProviderConfig::new("sk-123").with_base_url("https://api.example.com/v1");
        store.set_provider("unieai", config.clone()).await.unwrap();

        assert_eq!(store.get_provider("unieai").await.unwrap(), Some(config));
    }

    #[tokio::test]
    async fn test_set_overwrites_existing() {
        let (_backend, store) = setup_store();

        store
            .set_provider("unieai", ProviderConfig::new("old"))
            .await
            .unwrap();
        store
            .set_provider("unieai", ProviderConfig::new("new"))
            .await
            .unwrap();

        let config = store.get_provider("unieai").await.unwrap().unwrap();
        assert_eq!(config.api_key, "new");
        assert_eq!(store.get_configured_providers().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_provider_rejected_without_write() {
        let (backend, store) = setup_store();

        let err = store
            .set_provider("", ProviderConfig::new("sk-123"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            StoreError::Validation(ValidationError::EmptyProvider)
        ));
        assert!(backend.load(PROVIDER_CREDENTIALS_KEY).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_empty_api_key_rejected_without_mutation() {
        let (_backend, store) = setup_store();
        store
            .set_provider("unieai", ProviderConfig::new("sk-123"))
            .await
            .unwrap();

        let err = store
            .set_provider("unieai", ProviderConfig::new(""))
            .await
            .unwrap_err();

        assert_eq!(err.as_validation(), Some(&ValidationError::EmptyApiKey));
        let config = store.get_provider("unieai").await.unwrap().unwrap();
        assert_eq!(config.api_key, "sk-123");
    }

    #[tokio::test]
    async fn test_get_missing_provider_returns_none() {
        let (_backend, store) = setup_store();
        assert!(store.get_provider("nobody").await.unwrap().is_none());
        assert!(!store.has_provider("nobody").await.unwrap());
    }

    #[tokio::test]
    async fn test_remove_absent_provider_is_noop() {
        let (_backend, store) = setup_store();
        store
            .set_provider("unieai", ProviderConfig::new("sk-123"))
            .await
            .unwrap();
        let before = store.get_all_providers().await.unwrap();

        store.remove_provider("never-configured").await.unwrap();

        assert_eq!(store.get_all_providers().await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_remove_provider() {
        let (_backend, store) = setup_store();
        store
            .set_provider("unieai", ProviderConfig::new("sk-123"))
            .await
            .unwrap();

        store.remove_provider("unieai").await.unwrap();

        assert!(!store.has_provider("unieai").await.unwrap());
    }

    #[tokio::test]
    async fn test_configured_providers_reflect_survivors() {
        let (_backend, store) = setup_store();

        for name in ["zeta", "alpha", "mid", "beta", "alpha"] {
            store
                .set_provider(name, ProviderConfig::new("key"))
                .await
                .unwrap();
        }
        store.remove_provider("mid").await.unwrap();
        store.remove_provider("zeta").await.unwrap();

        assert_eq!(
            store.get_configured_providers().await.unwrap(),
            vec!["alpha", "beta"]
        );
    }

    #[tokio::test]
    async fn test_get_all_providers_is_a_copy() {
        let (_backend, store) = setup_store();
        store
            .set_provider("unieai", ProviderConfig::new("sk-123"))
            .await
            .unwrap();

        let mut all = store.get_all_providers().await.unwrap();
        all.clear();

        assert!(store.has_provider("unieai").await.unwrap());
    }

    #[tokio::test]
    async fn test_persisted_layout() {
        let (backend, store) = setup_store();
        store
            .set_provider("unieai", ProviderConfig::new("sk-123"))
            .await
            .unwrap();

        let raw = backend.load(PROVIDER_CREDENTIALS_KEY).await.unwrap().unwrap();
        assert_eq!(raw, r#"{"providers":{"unieai":{"apiKey":"sk-123"}}}"#);
    }

    #[tokio::test]
    async fn test_subscribers_see_writes() {
        let (_backend, store) = setup_store();
        let mut rx = store.subscribe();

        store
            .set_provider("unieai", ProviderConfig::new("sk-123"))
            .await
            .unwrap();

        let record = rx.recv().await.unwrap();
        assert!(record.providers.contains_key("unieai"));
    }

    #[tokio::test]
    async fn test_unreadable_record_is_not_overwritten() {
        let (backend, store) = setup_store();
        let stored = r#"{"providers":{"unieai":{"apiKey":"sk-123"},"broken":{"baseUrl":"https://x"}}}"#;
        backend
            .store(PROVIDER_CREDENTIALS_KEY, stored)
            .await
            .unwrap();

        assert!(matches!(
            store.has_provider("unieai").await,
            Err(StoreError::Persistence(PersistenceError::Serialize(_)))
        ));

        let err = store
            .set_provider("other", ProviderConfig::new("k"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::Persistence(PersistenceError::Serialize(_))
        ));
        assert_eq!(
            backend
                .load(PROVIDER_CREDENTIALS_KEY)
                .await
                .unwrap()
                .as_deref(),
            Some(stored)
        );
    }

    #[tokio::test]
    async fn test_second_store_on_same_backend_sees_writes() {
        let backend = MemoryBackend::new();
        let writer = ProviderConfigStore::new(Arc::new(backend.clone()));
        let reader = ProviderConfigStore::new(Arc::new(backend));

        writer
            .set_provider("unieai", ProviderConfig::new("sk-123"))
            .await
            .unwrap();

        assert!(reader.has_provider("unieai").await.unwrap());
    }
}
