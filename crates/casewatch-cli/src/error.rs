//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Tracker error
    #[error(transparent)]
    Tracker(#[from] casewatch_tracker::TrackerError),

    /// Storage error
    #[error(transparent)]
    Store(#[from] casewatch_store::StoreError),

    /// Invalid case identifier or source name
    #[error("Invalid input: {0}")]
    Domain(#[from] casewatch_domain::DomainError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The case has never been observed
    #[error("Case {0} is not tracked. Run 'casewatch observe {0}' first.")]
    NotTracked(String),
}
