//! Subcommand execution.

use std::io::Write;
use std::sync::Arc;

use agentkeys_core::{
    chat_params_for, discover_models, AgentModelConfig, AgentModelStore, AgentName, ChatMessage,
    Database, HttpModelLister, ModelResolution, ProviderConfig, ProviderConfigStore,
    RecordBackend, Settings, SqliteBackend,
};
use anyhow::Context;
use tracing::debug;

use crate::cli::{AgentCommand, Command, ProviderCommand, SettingsArgs, SettingsCommand};

/// Both stores over one backend.
struct Stores {
    providers: ProviderConfigStore,
    agents: AgentModelStore,
}

impl Stores {
    fn new(backend: Arc<dyn RecordBackend>) -> Self {
        Self {
            providers: ProviderConfigStore::new(Arc::clone(&backend)),
            agents: AgentModelStore::new(backend),
        }
    }

    fn open(db: Database) -> Self {
        Self::new(Arc::new(SqliteBackend::new(db)))
    }
}

/// Show only the first few characters of a secret.
fn mask_key(key: &str) -> String {
    let visible: String = key.chars().take(4).collect();
    if key.chars().count() <= 4 {
        "*".repeat(key.chars().count())
    } else {
        format!("{visible}****")
    }
}

/// Run one command against the database, writing its output to `out`.
pub async fn run(
    command: Command,
    db: Database,
    settings: Settings,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let lister = HttpModelLister::from_settings(&settings);

    match command {
        Command::Settings(cmd) => run_settings(cmd, &db, settings, out),
        Command::Provider(cmd) => run_provider(cmd, &Stores::open(db), out).await,
        Command::Agent(cmd) => run_agent(cmd, &Stores::open(db), &lister, out).await,
        Command::Models { prune } => run_models(prune, &Stores::open(db), &lister, out).await,
    }
}

async fn run_provider(
    command: ProviderCommand,
    stores: &Stores,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    match command {
        ProviderCommand::Set {
            provider,
            api_key,
            base_url,
        } => {
            let mut config = ProviderConfig::new(api_key.trim());
            if let Some(url) = base_url.map(|u| u.trim().to_string()) {
                config = config.with_base_url(url);
            }
            stores.providers.set_provider(&provider, config).await?;
            writeln!(out, "Saved credentials for {provider}")?;
        }
        ProviderCommand::Get { provider } => match stores.providers.get_provider(&provider).await? {
            Some(config) => {
                writeln!(out, "provider: {provider}")?;
                writeln!(out, "api key:  {}", mask_key(&config.api_key))?;
                writeln!(out, "base url: {}", config.base_url().unwrap_or("(default)"))?;
            }
            None => writeln!(out, "{provider} is not configured")?,
        },
        ProviderCommand::Remove { provider } => {
            stores.providers.remove_provider(&provider).await?;
            writeln!(out, "Removed {provider}")?;
        }
        ProviderCommand::List => {
            for provider in stores.providers.get_configured_providers().await? {
                writeln!(out, "{provider}")?;
            }
        }
    }
    Ok(())
}

async fn run_agent(
    command: AgentCommand,
    stores: &Stores,
    lister: &HttpModelLister,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    match command {
        AgentCommand::Set { agent, model } => {
            let resolution = discover_models(&stores.providers, lister).await?;
            let available = resolution.available_models();
            debug!(available = ?available, "Validating against available models");

            stores
                .agents
                .set_agent_model(agent, AgentModelConfig::new(model.trim()), &available)
                .await?;
            writeln!(out, "{agent} now uses {}", model.trim())?;
        }
        AgentCommand::Get { agent } => match stores.agents.get_agent_model(agent).await? {
            Some(config) => writeln!(out, "{}", config.model_name)?,
            None => writeln!(out, "{agent} has no model assigned")?,
        },
        AgentCommand::Reset { agent } => {
            stores.agents.reset_agent_model(agent).await?;
            writeln!(out, "Reset {agent}")?;
        }
        AgentCommand::List => {
            let assigned = stores.agents.get_all_agent_models().await?;
            for agent in AgentName::all() {
                let model = assigned
                    .get(agent)
                    .map(|config| config.model_name.as_str())
                    .unwrap_or("-");
                writeln!(out, "{:<10} {model}", agent.as_str())?;
            }
        }
        AgentCommand::Params { agent } => {
            let resolution = discover_models(&stores.providers, lister).await?;
            let params = chat_params_for(agent, &stores.agents, &stores.providers, &resolution)
                .await?
                .with_context(|| format!("{agent} has no usable model configuration"))?;
            let body = params.to_request_body(&[ChatMessage::user("...")]);
            writeln!(out, "{}", serde_json::to_string_pretty(&body)?)?;
        }
    }
    Ok(())
}

async fn run_models(
    prune: bool,
    stores: &Stores,
    lister: &HttpModelLister,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let resolution: ModelResolution = discover_models(&stores.providers, lister).await?;

    for model in resolution.available_models() {
        let provider = resolution.provider_for(&model).unwrap_or("?");
        writeln!(out, "{model}\t{provider}")?;
    }

    if prune {
        let dropped = stores
            .agents
            .retain_available(&resolution.available_models())
            .await?;
        for agent in dropped {
            writeln!(out, "Reset {agent}: model no longer available")?;
        }
    }
    Ok(())
}

fn run_settings(
    command: SettingsCommand,
    db: &Database,
    mut settings: Settings,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    match command {
        SettingsCommand::Show => {
            writeln!(out, "{}", serde_json::to_string_pretty(&settings)?)?;
        }
        SettingsCommand::Set(SettingsArgs {
            default_base_url,
            timeout,
            log_level,
        }) => {
            if let Some(url) = default_base_url {
                settings.default_base_url = Some(url);
            }
            if let Some(secs) = timeout {
                settings.request_timeout_secs = secs;
            }
            if let Some(level) = log_level {
                settings.log_level = level;
            }
            settings.validate();
            settings.save(db)?;
            writeln!(out, "Settings saved")?;
        }
    }
    Ok(())
}
