//! Per-agent model assignment store.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::storage::{RecordBackend, RecordStore};

use super::types::{AgentModelConfig, AgentModelRecord, AgentName, StoreResult, ValidationError};

/// Storage key of the agent model assignment record.
pub const AGENT_MODEL_ASSIGNMENTS_KEY: &str = "agent-model-assignments";

/// Check a model selection against the models the caller can currently reach.
fn validate_model_config<S: AsRef<str>>(
    config: &AgentModelConfig,
    available_models: &[S],
) -> Result<(), ValidationError> {
    if config.model_name.is_empty() {
        return Err(ValidationError::MissingModelName);
    }

    if !available_models
        .iter()
        .any(|model| model.as_ref() == config.model_name)
    {
        return Err(ValidationError::InvalidModel(config.model_name.clone()));
    }

    Ok(())
}

/// Persisted model selection for each agent.
///
/// Assignments are validated against a caller-supplied list of available
/// models at write time only. Removing a provider does not touch them; call
/// [`AgentModelStore::retain_available`] with a fresh list to drop stale ones.
#[derive(Debug)]
pub struct AgentModelStore {
    record: RecordStore<AgentModelRecord>,
}

impl AgentModelStore {
    /// Create a store on top of `backend`.
    pub fn new(backend: Arc<dyn RecordBackend>) -> Self {
        Self {
            record: RecordStore::new(AGENT_MODEL_ASSIGNMENTS_KEY, backend),
        }
    }

    /// Assign a model to `agent`.
    ///
    /// `available_models` is the list of models currently reachable through
    /// configured providers; the model must be one of them.
    pub async fn set_agent_model<S: AsRef<str>>(
        &self,
        agent: AgentName,
        config: AgentModelConfig,
        available_models: &[S],
    ) -> StoreResult<()> {
        validate_model_config(&config, available_models)?;

        info!(agent = %agent, model = %config.model_name, "Saving agent model");
        self.record
            .update(|record| {
                record.agents.insert(agent, config);
            })
            .await?;
        Ok(())
    }

    /// Get the model assigned to `agent`.
    pub async fn get_agent_model(&self, agent: AgentName) -> StoreResult<Option<AgentModelConfig>> {
        let mut record = self.record.get().await?;
        Ok(record.agents.remove(&agent))
    }

    /// Clear the assignment for `agent`. No error if there was none.
    pub async fn reset_agent_model(&self, agent: AgentName) -> StoreResult<()> {
        let removed = self
            .record
            .update(|record| record.agents.remove(&agent).is_some())
            .await?;
        debug!(agent = %agent, removed, "Reset agent model");
        Ok(())
    }

    /// Check if `agent` has a model assigned.
    pub async fn has_agent_model(&self, agent: AgentName) -> StoreResult<bool> {
        Ok(self.record.get().await?.agents.contains_key(&agent))
    }

    /// Agents that currently have a model assigned, in [`AgentName::all`] order.
    pub async fn get_configured_agents(&self) -> StoreResult<Vec<AgentName>> {
        Ok(self.record.get().await?.agents.into_keys().collect())
    }

    /// Snapshot of every assignment.
    pub async fn get_all_agent_models(&self) -> StoreResult<BTreeMap<AgentName, AgentModelConfig>> {
        Ok(self.record.get().await?.agents)
    }

    /// Drop every assignment whose model is not in `available_models`.
    ///
    /// Returns the agents that were reset.
    pub async fn retain_available<S: AsRef<str>>(
        &self,
        available_models: &[S],
    ) -> StoreResult<Vec<AgentName>> {
        let dropped = self
            .record
            .update(|record| {
                let stale: Vec<AgentName> = record
                    .agents
                    .iter()
                    .filter(|(_, config)| {
                        !available_models
                            .iter()
                            .any(|model| model.as_ref() == config.model_name)
                    })
                    .map(|(agent, _)| *agent)
                    .collect();
                for agent in &stale {
                    record.agents.remove(agent);
                }
                stale
            })
            .await?;

        if !dropped.is_empty() {
            info!(agents = ?dropped, "Reset agents whose model is no longer available");
        }
        Ok(dropped)
    }

    /// Receive the full record after every change.
    pub fn subscribe(&self) -> broadcast::Receiver<AgentModelRecord> {
        self.record.subscribe()
    }
}
