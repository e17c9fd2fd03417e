//! agentkeys Core Library
//!
//! This crate stores LLM provider credentials and per-agent model selections,
//! and turns them into chat client parameters. It includes:
//!
//! - Provider credential store (API key, optional base URL per provider)
//! - Agent model store (one validated model selection per agent)
//! - Model discovery and model-to-provider resolution
//! - Persisted, observable records over SQLite or memory
//! - Configuration management (settings)
//! - Chat client parameter translation

pub mod chat;
pub mod config;
pub mod db;
pub mod models;
pub mod storage;
pub mod stores;

// Re-exports for convenience
pub use config::Settings;
pub use db::Database;

// Re-export stores
pub use stores::{
    AgentModelConfig, AgentModelRecord, AgentModelStore, AgentName, ProviderConfig,
    ProviderConfigRecord, ProviderConfigStore, StoreError, StoreResult, ValidationError,
};

// Re-export storage
pub use storage::{MemoryBackend, PersistenceError, RecordBackend, RecordStore, SqliteBackend};

// Re-export models
pub use models::{discover_models, HttpModelLister, ModelListError, ModelLister, ModelResolution};

// Re-export chat integration
pub use chat::{chat_params_for, ChatMessage, ChatModelParams};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
