//! Core store type definitions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::storage::PersistenceError;

/// Input rejected before anything is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Provider name cannot be empty")]
    EmptyProvider,
    #[error("API key cannot be empty")]
    EmptyApiKey,
    #[error("Model name must be specified")]
    MissingModelName,
    #[error("Invalid model \"{0}\"")]
    InvalidModel(String),
}

/// Errors returned by the provider and agent model stores.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

impl StoreError {
    /// The validation failure, if this was one.
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            StoreError::Validation(e) => Some(e),
            StoreError::Persistence(_) => None,
        }
    }
}

/// Convenience type alias for store results.
pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// Agents
// =============================================================================

/// The fixed set of agent roles that can be assigned a model.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum AgentName {
    /// Breaks a task into steps.
    Planner,
    /// Drives the browser.
    Navigator,
    /// Checks the outcome.
    Validator,
}

impl AgentName {
    /// Get all agents in display order.
    pub fn all() -> &'static [AgentName] {
        &[Self::Planner, Self::Navigator, Self::Validator]
    }

    /// Identifier used in storage and on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Planner => "planner",
            Self::Navigator => "navigator",
            Self::Validator => "validator",
        }
    }
}

impl std::fmt::Display for AgentName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error parsing an [`AgentName`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown agent: {0}")]
pub struct UnknownAgent(pub String);

impl std::str::FromStr for AgentName {
    type Err = UnknownAgent;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "planner" => Ok(Self::Planner),
            "navigator" => Ok(Self::Navigator),
            "validator" => Ok(Self::Validator),
            _ => Err(UnknownAgent(s.to_string())),
        }
    }
}

// =============================================================================
// Records
// =============================================================================

/// Credentials for one provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfig {
    /// Bearer credential sent to the provider.
    pub api_key: String,
    /// Endpoint override (e.g. "https://api.example.com/v1").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl ProviderConfig {
    /// Config with an API key and no base URL.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: None,
        }
    }

    /// Set the base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Base URL, treating an empty string as unset.
    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref().filter(|url| !url.is_empty())
    }
}

/// Persisted mapping of provider identifier to credentials.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfigRecord {
    #[serde(default)]
    pub providers: BTreeMap<String, ProviderConfig>,
}

/// Model selected for one agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentModelConfig {
    pub model_name: String,
}

impl AgentModelConfig {
    pub fn new(model_name: impl Into<String>) -> Self {
        Self {
            model_name: model_name.into(),
        }
    }
}

/// Persisted mapping of agent to selected model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentModelRecord {
    #[serde(default)]
    pub agents: BTreeMap<AgentName, AgentModelConfig>,
}
