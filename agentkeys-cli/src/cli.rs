//! Command-line interface for agentkeys
//!
//! Argument parsing for the `agentkeys` binary:
//! - agentkeys provider set|get|remove|list
//! - agentkeys agent set|get|reset|list|params
//! - agentkeys models [--prune]
//! - agentkeys settings show|set

use std::path::PathBuf;

use agentkeys_core::AgentName;
use clap::{Args, Parser, Subcommand};

/// Manage LLM provider credentials and per-agent model selection
#[derive(Debug, Parser)]
#[command(name = "agentkeys")]
#[command(version)]
#[command(about = "Manage LLM provider credentials and per-agent model selection")]
pub struct Cli {
    /// Path to the database file (defaults to the platform data directory)
    #[arg(long, env = "AGENTKEYS_DB", global = true)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage provider credentials
    #[command(subcommand)]
    Provider(ProviderCommand),

    /// Manage the model assigned to each agent
    #[command(subcommand)]
    Agent(AgentCommand),

    /// List the models available from configured providers
    Models {
        /// Reset agents whose model is no longer offered
        #[arg(long)]
        prune: bool,
    },

    /// Show or change application settings
    #[command(subcommand)]
    Settings(SettingsCommand),
}

#[derive(Debug, Subcommand)]
pub enum ProviderCommand {
    /// Save credentials for a provider (overwrites existing)
    Set {
        /// Provider identifier (e.g. "unieai")
        provider: String,
        /// API key sent as a bearer credential
        #[arg(long)]
        api_key: String,
        /// Endpoint override (e.g. "https://api.example.com/v1")
        #[arg(long)]
        base_url: Option<String>,
    },
    /// Show a provider's credentials (key masked)
    Get { provider: String },
    /// Delete a provider's credentials
    Remove { provider: String },
    /// List configured providers
    List,
}

#[derive(Debug, Subcommand)]
pub enum AgentCommand {
    /// Assign a model to an agent (checked against the live model list)
    Set {
        #[arg(value_parser = parse_agent)]
        agent: AgentName,
        model: String,
    },
    /// Show an agent's model
    Get {
        #[arg(value_parser = parse_agent)]
        agent: AgentName,
    },
    /// Clear an agent's model
    Reset {
        #[arg(value_parser = parse_agent)]
        agent: AgentName,
    },
    /// List every agent and its model
    List,
    /// Print the chat request parameters an agent would use
    Params {
        #[arg(value_parser = parse_agent)]
        agent: AgentName,
    },
}

#[derive(Debug, Subcommand)]
pub enum SettingsCommand {
    /// Print the current settings as JSON
    Show,
    /// Update one or more settings
    Set(SettingsArgs),
}

#[derive(Debug, Args)]
pub struct SettingsArgs {
    /// Base URL for providers without their own (empty string clears it)
    #[arg(long)]
    pub default_base_url: Option<String>,
    /// Model listing timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,
    /// Log level (e.g. "info", "debug")
    #[arg(long)]
    pub log_level: Option<String>,
}

fn parse_agent(s: &str) -> Result<AgentName, String> {
    s.parse::<AgentName>().map_err(|e| {
        let known: Vec<&str> = AgentName::all().iter().map(AgentName::as_str).collect();
        format!("{e} (expected one of: {})", known.join(", "))
    })
}
