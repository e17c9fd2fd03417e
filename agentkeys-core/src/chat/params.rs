//! Chat client parameters for an agent.
//!
//! Translates an agent's model selection and its provider's credentials into
//! the parameters of an OpenAI-compatible chat-completions client.
//!
//! **Important**: reasoning models (names starting with `o`) reject sampling
//! parameters and `max_tokens`; they only get `max_completion_tokens`.

use serde::Serialize;
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::models::ModelResolution;
use crate::stores::{AgentModelStore, AgentName, ProviderConfig, ProviderConfigStore, StoreResult};

/// Response length limit for regular models.
pub const MAX_TOKENS: u32 = 2000;

/// Response length limit for reasoning models.
pub const MAX_COMPLETION_TOKENS: u32 = 5000;

const DEFAULT_TEMPERATURE: f32 = 0.0;
const PLANNER_TEMPERATURE: f32 = 0.02;
const TOP_P: f32 = 0.001;

fn is_reasoning_model(model_name: &str) -> bool {
    model_name.starts_with('o')
}

/// One message of a chat request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Parameters for a chat client serving one agent.
#[derive(Clone, PartialEq, Serialize)]
pub struct ChatModelParams {
    pub model: String,
    #[serde(skip)]
    pub api_key: String,
    #[serde(skip)]
    pub base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_completion_tokens: Option<u32>,
}

impl std::fmt::Debug for ChatModelParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatModelParams")
            .field("model", &self.model)
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("temperature", &self.temperature)
            .field("top_p", &self.top_p)
            .field("max_tokens", &self.max_tokens)
            .field("max_completion_tokens", &self.max_completion_tokens)
            .finish()
    }
}

impl ChatModelParams {
    /// Parameters for `agent` talking to `model_name` through `config`.
    ///
    /// # Example
    ///
    /// ```
    /// use agentkeys_core::{AgentName, ChatModelParams, ProviderConfig};
    ///
    /// let config = ProviderConfig::new("sk-123");
    /// let params = ChatModelParams::for_agent(AgentName::Planner, &config, "model-a");
    /// assert_eq!(params.temperature, Some(0.02));
    /// ```
    pub fn for_agent(agent: AgentName, config: &ProviderConfig, model_name: &str) -> Self {
        let mut params = Self {
            model: model_name.to_string(),
            api_key: config.api_key.clone(),
            base_url: config.base_url().map(str::to_string),
            temperature: None,
            top_p: None,
            max_tokens: None,
            max_completion_tokens: None,
        };

        if is_reasoning_model(model_name) {
            params.max_completion_tokens = Some(MAX_COMPLETION_TOKENS);
        } else {
            params.temperature = Some(match agent {
                AgentName::Planner => PLANNER_TEMPERATURE,
                _ => DEFAULT_TEMPERATURE,
            });
            params.top_p = Some(TOP_P);
            params.max_tokens = Some(MAX_TOKENS);
        }

        debug!(agent = %agent, params = ?params, "Built chat parameters");
        params
    }

    /// Chat-completions request body for `messages`.
    pub fn to_request_body(&self, messages: &[ChatMessage]) -> JsonValue {
        let mut body =
            serde_json::to_value(self).unwrap_or_else(|_| JsonValue::Object(Default::default()));
        if let JsonValue::Object(map) = &mut body {
            map.insert(
                "messages".to_string(),
                serde_json::to_value(messages).unwrap_or_default(),
            );
        }
        body
    }
}

/// Chat parameters for `agent` from the stored configuration.
///
/// Returns `None` when the agent has no model, no configured provider
/// serves that model, or the provider's credentials are gone.
pub async fn chat_params_for(
    agent: AgentName,
    agents: &AgentModelStore,
    providers: &ProviderConfigStore,
    resolution: &ModelResolution,
) -> StoreResult<Option<ChatModelParams>> {
    let Some(selection) = agents.get_agent_model(agent).await? else {
        debug!(agent = %agent, "No model assigned");
        return Ok(None);
    };

    let Some(provider) = resolution.provider_for(&selection.model_name) else {
        debug!(agent = %agent, model = %selection.model_name, "No provider serves model");
        return Ok(None);
    };

    let Some(config) = providers.get_provider(provider).await? else {
        return Ok(None);
    };

    Ok(Some(ChatModelParams::for_agent(
        agent,
        &config,
        &selection.model_name,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryBackend;
    use crate::stores::AgentModelConfig;
    use serde_json::json;
    use std::sync::Arc;

    #[test]
    fn test_planner_gets_its_own_temperature() {
        let config = ProviderConfig::new("sk-123");

        let planner = ChatModelParams::for_agent(AgentName::Planner, &config, "model-a");
        let navigator = ChatModelParams::for_agent(AgentName::Navigator, &config, "model-a");

        assert_eq!(planner.temperature, Some(0.02));
        assert_eq!(navigator.temperature, Some(0.0));
        assert_eq!(navigator.top_p, Some(0.001));
        assert_eq!(navigator.max_tokens, Some(MAX_TOKENS));
        assert_eq!(navigator.max_completion_tokens, None);
    }

    #[test]
    fn test_reasoning_models_only_get_completion_limit() {
        let config = ProviderConfig::new("sk-123");
        let params = ChatModelParams::for_agent(AgentName::Planner, &config, "o3-mini");

        assert_eq!(params.max_completion_tokens, Some(MAX_COMPLETION_TOKENS));
        assert_eq!(params.temperature, None);
        assert_eq!(params.top_p, None);
        assert_eq!(params.max_tokens, None);
    }

    #[test]
    fn test_base_url_only_when_configured() {
        let plain = ChatModelParams::for_agent(
            AgentName::Validator,
            &ProviderConfig::new("sk").with_base_url(""),
            "m",
        );
        assert_eq!(plain.base_url, None);

        let custom = ChatModelParams::for_agent(
            AgentName::Validator,
            &ProviderConfig::new("sk").with_base_url("https://api.example.com/v1"),
            "m",
        );
        assert_eq!(custom.base_url.as_deref(), Some("https://api.example.com/v1"));
    }

    #[test]
    fn test_request_body_omits_credentials() {
        let params = ChatModelParams::for_agent(
            AgentName::Navigator,
            &ProviderConfig::new("sk-secret"),
            "o1",
        );
        let body = params.to_request_body(&[ChatMessage::user("hi")]);

        assert_eq!(
            body,
            json!({
                "model": "o1",
                "max_completion_tokens": 5000,
                "messages": [{"role": "user", "content": "hi"}]
            })
        );
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let params =
            ChatModelParams::for_agent(AgentName::Planner, &ProviderConfig::new("sk-secret"), "m");
        assert!(!format!("{params:?}").contains("sk-secret"));
    }

    #[tokio::test]
    async fn test_chat_params_for_resolves_provider() {
        let backend = MemoryBackend::new();
        let providers = ProviderConfigStore::new(Arc::new(backend.clone()));
        let agents = AgentModelStore::new(Arc::new(backend));

        providers
            .set_provider("unieai", ProviderConfig::new("sk-123"))
            .await
            .unwrap();
        let configured = providers.get_all_providers().await.unwrap();
        let resolution = ModelResolution::new(
            &configured,
            vec![("unieai".to_string(), vec!["model-a".to_string()])],
        );
        agents
            .set_agent_model(
                AgentName::Planner,
                AgentModelConfig::new("model-a"),
                &resolution.available_models(),
            )
            .await
            .unwrap();

        let params = chat_params_for(AgentName::Planner, &agents, &providers, &resolution)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(params.model, "model-a");
        assert_eq!(params.api_key, "sk-123");

        // Unassigned agent
        assert!(
            chat_params_for(AgentName::Navigator, &agents, &providers, &resolution)
                .await
                .unwrap()
                .is_none()
        );

        // Provider removed after the assignment
        providers.remove_provider("unieai").await.unwrap();
        assert!(
            chat_params_for(AgentName::Planner, &agents, &providers, &resolution)
                .await
                .unwrap()
                .is_none()
        );
    }
}
