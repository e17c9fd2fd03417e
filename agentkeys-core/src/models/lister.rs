//! Listing the models a provider advertises.

use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::config::{Settings, DEFAULT_REQUEST_TIMEOUT_SECS};
use crate::stores::{ProviderConfig, ProviderConfigStore, StoreResult};

use super::resolution::ModelResolution;
use super::types::ModelListError;

/// Source of a provider's model identifiers.
#[async_trait]
pub trait ModelLister: Send + Sync {
    /// Model identifiers advertised by `provider`.
    async fn list_models(
        &self,
        provider: &str,
        config: &ProviderConfig,
    ) -> Result<Vec<String>, ModelListError>;
}

// ============================================================================
// HTTP
// ============================================================================

/// Model info from an OpenAI-compatible `/models` endpoint
#[derive(Debug, Deserialize)]
struct ModelInfo {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ModelsResponse {
    #[serde(default)]
    data: Vec<ModelInfo>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<String>,
}

/// Lists models with `GET {base_url}/models`.
#[derive(Debug, Clone)]
pub struct HttpModelLister {
    client: reqwest::Client,
    default_base_url: Option<String>,
    timeout: Duration,
}

impl Default for HttpModelLister {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpModelLister {
    /// Lister with no default base URL and the default timeout.
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            default_base_url: None,
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }

    /// Lister configured from application settings.
    pub fn from_settings(settings: &Settings) -> Self {
        let mut lister = Self::new().with_timeout(settings.request_timeout());
        if let Some(url) = &settings.default_base_url {
            lister = lister.with_default_base_url(url.clone());
        }
        lister
    }

    /// Base URL for providers without their own.
    pub fn with_default_base_url(mut self, url: impl Into<String>) -> Self {
        self.default_base_url = Some(url.into());
        self
    }

    /// Per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn models_url(&self, provider: &str, config: &ProviderConfig) -> Result<String, ModelListError> {
        let base_url = config
            .base_url()
            .or(self.default_base_url.as_deref())
            .filter(|url| !url.is_empty())
            .ok_or_else(|| ModelListError::MissingBaseUrl(provider.to_string()))?;
        Ok(format!("{}/models", base_url.trim_end_matches('/')))
    }
}

#[async_trait]
impl ModelLister for HttpModelLister {
    async fn list_models(
        &self,
        provider: &str,
        config: &ProviderConfig,
    ) -> Result<Vec<String>, ModelListError> {
        let url = self.models_url(provider, config)?;
        debug!(provider = %provider, url = %url, "Fetching model list");

        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", config.api_key))
            .header("Content-Type", "application/json")
            .timeout(self.timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorBody>(&text)
                .ok()
                .and_then(|body| body.detail)
                .or_else(|| status.canonical_reason().map(str::to_string))
                .unwrap_or_else(|| "Unknown error".to_string());
            warn!(provider = %provider, status = %status, detail = %detail, "Failed to fetch models");
            return Err(ModelListError::Status {
                status: status.as_u16(),
                detail,
            });
        }

        let models: ModelsResponse = response.json().await?;
        let ids: Vec<String> = models.data.into_iter().map(|m| m.id).collect();

        info!(provider = %provider, count = ids.len(), "Fetched models");
        Ok(ids)
    }
}

// ============================================================================
// Discovery
// ============================================================================

/// Query every credentialed provider and resolve the selectable models.
///
/// Providers are queried concurrently. A provider whose listing fails
/// contributes no models; the failure is logged, not returned.
pub async fn discover_models(
    providers: &ProviderConfigStore,
    lister: &dyn ModelLister,
) -> StoreResult<ModelResolution> {
    let configured = providers.get_all_providers().await?;

    let queries = configured
        .iter()
        .filter(|(_, config)| !config.api_key.is_empty())
        .map(|(provider, config)| async move {
            let models = match lister.list_models(provider, config).await {
                Ok(models) => models,
                Err(e) => {
                    warn!(provider = %provider, error = %e, "Model listing failed, treating as empty");
                    Vec::new()
                }
            };
            (provider.clone(), models)
        });
    let advertised = join_all(queries).await;

    Ok(ModelResolution::new(&configured, advertised))
}
