//! Error types for tracker operations

use thiserror::Error;

/// Errors that can occur during tracker operations
///
/// Source failures never show up here: they become absent payloads, and a
/// total failure is reported on the observation result instead.
#[derive(Error, Debug)]
pub enum TrackerError {
    /// Storage layer error
    #[error("Storage error: {0}")]
    Store(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
