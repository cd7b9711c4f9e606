//! Trait definitions for external interactions
//!
//! These traits define the boundaries between domain logic and infrastructure.
//! Infrastructure implementations live in other crates.

use crate::{EntityId, IndexEntry, RecordUpdate, VersionRecord};

/// Trait for persisting version records and the index of tracked cases
///
/// Implemented by the infrastructure layer (casewatch-store)
///
/// Every method is all-or-nothing for the entity it touches: a failed `put`
/// leaves the previously stored record and index entry exactly as they were,
/// and `remove` deletes both or neither.
pub trait VersionStore {
    /// Error type for store operations
    type Error;

    /// Load the record for a case
    fn get(&self, entity_id: &EntityId) -> Result<Option<VersionRecord>, Self::Error>;

    /// Accept a new generation for a case
    ///
    /// The stored `current` becomes `previous`, the update's snapshot becomes
    /// `current`, fingerprints and flags are replaced, and the index entry is
    /// inserted (new case) or refreshed (known case) in the same operation.
    fn put(&self, entity_id: &EntityId, update: RecordUpdate) -> Result<(), Self::Error>;

    /// Delete the record and index entry for a case; unknown ids are a no-op
    fn remove(&self, entity_id: &EntityId) -> Result<(), Self::Error>;

    /// Every tracked case in the order it was first tracked
    fn list_index(&self) -> Result<Vec<IndexEntry>, Self::Error>;
}
