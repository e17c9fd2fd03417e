//! Which models are selectable, and which provider serves each.

use std::collections::{BTreeMap, HashSet};

use tracing::debug;

use crate::stores::ProviderConfig;

/// Models advertised by the currently credentialed providers.
///
/// Providers are kept in ascending order of their identifier. When two
/// providers advertise the same model, the one that sorts first owns it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelResolution {
    models_by_provider: BTreeMap<String, Vec<String>>,
}

impl ModelResolution {
    /// Build from the configured providers and the model list each one advertised.
    ///
    /// Lists from providers that are not configured, or whose API key is
    /// empty, are ignored.
    pub fn new<I>(providers: &BTreeMap<String, ProviderConfig>, advertised: I) -> Self
    where
        I: IntoIterator<Item = (String, Vec<String>)>,
    {
        let mut models_by_provider = BTreeMap::new();

        for (provider, models) in advertised {
            let credentialed = providers
                .get(&provider)
                .is_some_and(|config| !config.api_key.is_empty());
            if !credentialed {
                debug!(provider = %provider, "Ignoring models from unconfigured provider");
                continue;
            }
            models_by_provider.insert(provider, models);
        }

        Self { models_by_provider }
    }

    /// All selectable models, without duplicates, grouped by provider order.
    pub fn available_models(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.models_by_provider
            .values()
            .flatten()
            .filter(|model| seen.insert(model.as_str()))
            .cloned()
            .collect()
    }

    /// Provider that serves `model`.
    pub fn provider_for(&self, model: &str) -> Option<&str> {
        self.models_by_provider
            .iter()
            .find(|(_, models)| models.iter().any(|m| m == model))
            .map(|(provider, _)| provider.as_str())
    }

    /// Check if `model` is selectable.
    pub fn is_available(&self, model: &str) -> bool {
        self.provider_for(model).is_some()
    }

    /// Models advertised by one provider.
    pub fn models_for(&self, provider: &str) -> Option<&[String]> {
        self.models_by_provider.get(provider).map(Vec::as_slice)
    }

    /// Providers that contributed a model list, in resolution order.
    pub fn providers(&self) -> impl Iterator<Item = &str> {
        self.models_by_provider.keys().map(String::as_str)
    }

    /// Check if no provider contributed any model.
    pub fn is_empty(&self) -> bool {
        self.models_by_provider.values().all(Vec::is_empty)
    }
}
