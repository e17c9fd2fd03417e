//! Provider credential and agent model stores.
//!
//! This module provides:
//! - `ProviderConfigStore` - Credentials keyed by provider identifier
//! - `AgentModelStore` - Model selection keyed by agent, validated on write
//! - `AgentName`, `ProviderConfig`, `AgentModelConfig` - Record types
//! - `ValidationError`, `StoreError` - Error types

mod agent_models;
mod providers;
mod types;

pub use agent_models::{AgentModelStore, AGENT_MODEL_ASSIGNMENTS_KEY};
pub use providers::{ProviderConfigStore, PROVIDER_CREDENTIALS_KEY};
pub use types::{
    AgentModelConfig, AgentModelRecord, AgentName, ProviderConfig, ProviderConfigRecord,
    StoreError, StoreResult, UnknownAgent, ValidationError,
};
