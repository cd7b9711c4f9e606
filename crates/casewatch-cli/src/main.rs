//! Casewatch CLI - track case status pages and report what changed.

use casewatch_cli::commands;
use casewatch_cli::{Cli, Command, Config, Formatter};
use casewatch_store::SqliteStore;
use casewatch_tracker::Tracker;
use clap::Parser;
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> casewatch_cli::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_env("CASEWATCH_LOG").unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let config = match &cli.config {
        Some(path) => Config::load_from(&PathBuf::from(path))?,
        None => Config::load_or_init(&Config::path()?)?,
    };

    let format = cli.format.map(Into::into).unwrap_or(config.settings.format);
    let color_enabled = !cli.no_color && config.settings.color;
    let formatter = Formatter::new(format, color_enabled);

    let database_path = config.database_path()?;
    if let Some(parent) = database_path.parent() {
        fs::create_dir_all(parent)?;
    }
    tracing::debug!(path = %database_path.display(), "Opening database");
    let store = SqliteStore::new(&database_path)?;
    let sources = config.tracker.source_set()?;
    let tracker = Tracker::new(store, sources);

    let output = match cli.command {
        Command::Observe(args) => commands::execute_observe(args, &tracker, &formatter).await?,
        Command::List => commands::execute_list(&tracker, &formatter)?,
        Command::Forget(args) => {
            commands::execute_forget(args, &tracker, &formatter, commands::prompt_confirmation).await?
        }
        Command::Diff(args) => commands::execute_diff(args, &tracker, &formatter)?,
        Command::Show(args) => commands::execute_show(args, &tracker, &formatter)?,
        Command::Watch(args) => commands::execute_watch(args, &tracker, &config.tracker).await?,
    };

    println!("{}", output);
    Ok(())
}
