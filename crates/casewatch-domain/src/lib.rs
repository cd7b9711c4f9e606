//! Casewatch Domain Layer
//!
//! This crate contains the data model shared by every other Casewatch crate.
//! It defines what a tracked case looks like at rest and the trait seam through
//! which the tracker talks to persistence.
//!
//! ## Key Concepts
//!
//! - **Entity**: the tracked case, identified by a stable receipt number
//! - **Source**: one of three independent remote endpoints describing the case
//! - **Snapshot**: every source's payload captured in one observation
//! - **Version record**: the current snapshot, one previous generation, and the
//!   fingerprints and change flags derived when the current one was stored
//! - **Index entry**: a lightweight summary used to enumerate tracked cases
//!
//! ## Architecture
//!
//! - Pure data and small helpers only
//! - No I/O; storage, HTTP, and hashing live in other crates
//! - Trait definitions for all external interactions

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod codes;
pub mod entity;
pub mod payload;
pub mod record;
pub mod snapshot;
pub mod source;
pub mod traits;

use thiserror::Error;

// Re-exports for convenience
pub use codes::describe;
pub use entity::EntityId;
pub use payload::SourcePayload;
pub use record::{IndexEntry, ObservationResult, RecordUpdate, VersionRecord, ALL_SOURCES_FAILED};
pub use snapshot::{Fingerprint, Snapshot};
pub use source::{PerSource, SourceId};

/// Errors raised while constructing domain values
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Entity identifiers must contain at least one non-whitespace character
    #[error("Entity identifier must not be empty")]
    EmptyEntityId,

    /// Source name did not match any known source
    #[error("Unknown source: {0}")]
    UnknownSource(String),
}
