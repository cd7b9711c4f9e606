//! Version records, index entries, and observation results

use crate::{EntityId, Fingerprint, PerSource, Snapshot};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Persisted state for one tracked case
///
/// Retention depth is exactly one generation: accepting a new snapshot moves
/// `current` into `previous` and discards whatever `previous` held.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionRecord {
    /// Case identifier
    pub entity_id: EntityId,
    /// Most recent accepted snapshot
    pub current: Snapshot,
    /// Snapshot that was current before the latest one; `None` after the first observation
    pub previous: Option<Snapshot>,
    /// Fingerprint of each source in `current`
    pub fingerprints: PerSource<Fingerprint>,
    /// Which sources changed when `current` was accepted
    pub change_flags: PerSource<bool>,
    /// When `current` was captured
    pub last_observed_at: DateTime<Utc>,
}

impl VersionRecord {
    /// Apply an update on top of the stored record (if any)
    ///
    /// This is the generation shift every store performs inside `put`: the old
    /// `current` becomes `previous`, the new snapshot becomes `current`, and
    /// fingerprints and flags are replaced wholesale.
    pub fn advance(existing: Option<VersionRecord>, entity_id: &EntityId, update: &RecordUpdate) -> Self {
        Self {
            entity_id: entity_id.clone(),
            previous: existing.map(|r| r.current),
            current: update.snapshot.clone(),
            fingerprints: update.fingerprints.clone(),
            change_flags: update.change_flags.clone(),
            last_observed_at: update.snapshot.captured_at,
        }
    }

    /// True if any source changed in the latest observation
    pub fn has_changes(&self) -> bool {
        self.change_flags.any()
    }
}

/// Everything a store needs to accept a new generation
#[derive(Debug, Clone, PartialEq)]
pub struct RecordUpdate {
    /// The newly observed snapshot
    pub snapshot: Snapshot,
    /// Per-source change flags computed against the stored fingerprints
    pub change_flags: PerSource<bool>,
    /// Fingerprints of the new snapshot
    pub fingerprints: PerSource<Fingerprint>,
    /// Display label for the index entry
    pub label: String,
}

/// Lightweight summary of a tracked case
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexEntry {
    /// Case identifier
    pub entity_id: EntityId,
    /// Display label (form type), possibly empty
    pub label: String,
    /// When the case was last observed
    pub last_observed_at: DateTime<Utc>,
    /// True if any source changed in the latest observation
    pub has_changes: bool,
}

impl IndexEntry {
    /// Index entry describing an accepted update
    pub fn for_update(entity_id: &EntityId, update: &RecordUpdate) -> Self {
        Self {
            entity_id: entity_id.clone(),
            label: update.label.clone(),
            last_observed_at: update.snapshot.captured_at,
            has_changes: update.change_flags.any(),
        }
    }
}

/// Message returned when every source failed
pub const ALL_SOURCES_FAILED: &str =
    "All sources failed. Make sure you are signed in and the receipt number is correct.";

/// Outcome of one observation, as returned to the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObservationResult {
    /// Case identifier
    pub entity_id: EntityId,
    /// Snapshot captured by this observation
    pub current: Snapshot,
    /// Snapshot that was current before this observation, if any
    pub previous: Option<Snapshot>,
    /// Per-source change flags
    pub change_flags: PerSource<bool>,
    /// When the observation completed its fetches
    pub observed_at: DateTime<Utc>,
    /// Set only when every source failed; the store was left untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ObservationResult {
    /// Result for an observation in which every source failed
    pub fn total_failure(entity_id: &EntityId, observed_at: DateTime<Utc>) -> Self {
        Self {
            entity_id: entity_id.clone(),
            current: Snapshot::empty(observed_at),
            previous: None,
            change_flags: PerSource::default(),
            observed_at,
            error: Some(ALL_SOURCES_FAILED.to_string()),
        }
    }

    /// True if any source changed
    pub fn has_changes(&self) -> bool {
        self.change_flags.any()
    }

    /// True if this observation failed for every source
    pub fn is_failure(&self) -> bool {
        self.error.is_some()
    }
}
