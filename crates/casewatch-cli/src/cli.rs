//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};

/// Casewatch CLI - Track immigration cases and see what changed.
#[derive(Debug, Parser)]
#[command(name = "casewatch")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true, env = "CASEWATCH_CONFIG")]
    pub config: Option<String>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch a case now and record what changed
    Observe(ObserveArgs),

    /// List tracked cases
    List,

    /// Stop tracking cases
    Forget(ForgetArgs),

    /// Show what changed between the last two observations
    Diff(DiffArgs),

    /// Summarize the latest observation of a case
    Show(ShowArgs),

    /// Re-observe every tracked case on a schedule
    Watch(WatchArgs),
}

/// Arguments for the observe command.
#[derive(Debug, Parser)]
pub struct ObserveArgs {
    /// Receipt numbers to observe
    #[arg(required = true)]
    pub ids: Vec<String>,
}

/// Arguments for the forget command.
#[derive(Debug, Parser)]
pub struct ForgetArgs {
    /// Receipt numbers to forget
    #[arg(required = true)]
    pub ids: Vec<String>,

    /// Skip confirmation prompt
    #[arg(short = 'y', long)]
    pub yes: bool,
}

/// Arguments for the diff command.
#[derive(Debug, Parser)]
pub struct DiffArgs {
    /// Receipt number
    pub id: String,

    /// Only this source (caseDetails, caseStatus, receiptInfo)
    #[arg(short, long)]
    pub source: Option<String>,

    /// Render rows side by side instead of a unified patch
    #[arg(long)]
    pub side_by_side: bool,
}

/// Arguments for the show command.
#[derive(Debug, Parser)]
pub struct ShowArgs {
    /// Receipt number
    pub id: String,
}

/// Arguments for the watch command.
#[derive(Debug, Parser)]
pub struct WatchArgs {
    /// Stop after this many cycles instead of running until Ctrl+C
    #[arg(short = 'n', long)]
    pub cycles: Option<usize>,

    /// Override the poll interval (in minutes)
    #[arg(short, long)]
    pub interval: Option<u64>,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
        }
    }
}
