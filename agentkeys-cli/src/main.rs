//! agentkeys command-line application
//!
//! Manages LLM provider credentials and the model each agent uses.

mod cli;
mod commands;

use agentkeys_core::{Database, Settings};
use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::Cli;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Settings decide the log level, so the database is opened first.
    let db = match &cli.db {
        Some(path) => Database::open_at(path.clone()),
        None => Database::open(),
    }
    .context("Failed to open database")?;
    db.migrate().context("Failed to migrate database")?;
    let settings = Settings::load(&db);

    init_tracing(&settings.log_level);
    tracing::info!(db = %db.path().display(), "Starting agentkeys v{}", agentkeys_core::VERSION);

    let runtime = tokio::runtime::Runtime::new().context("Failed to create tokio runtime")?;
    runtime.block_on(commands::run(
        cli.command,
        db,
        settings,
        &mut std::io::stdout().lock(),
    ))
}

/// Initialize logging to stderr.
///
/// `RUST_LOG` wins over the configured level.
fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("agentkeys={level},agentkeys_core={level},warn"))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
