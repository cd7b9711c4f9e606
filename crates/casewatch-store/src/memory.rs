//! In-memory VersionStore
//!
//! Same semantics as [`SqliteStore`](crate::SqliteStore) without persistence.
//! The record and the index are updated under one write lock, so readers
//! never see one without the other.

use crate::StoreError;
use casewatch_domain::traits::VersionStore;
use casewatch_domain::{EntityId, IndexEntry, RecordUpdate, VersionRecord};
use std::collections::HashMap;
use std::sync::RwLock;

#[derive(Default)]
struct MemoryState {
    records: HashMap<EntityId, VersionRecord>,
    index: Vec<IndexEntry>,
}

/// Volatile store for tests and one-shot runs
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<MemoryState>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tracked cases
    pub fn len(&self) -> usize {
        self.inner.read().map(|s| s.records.len()).unwrap_or(0)
    }

    /// True if nothing is tracked
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl VersionStore for MemoryStore {
    type Error = StoreError;

    fn get(&self, entity_id: &EntityId) -> Result<Option<VersionRecord>, Self::Error> {
        let state = self.inner.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(state.records.get(entity_id).cloned())
    }

    fn put(&self, entity_id: &EntityId, update: RecordUpdate) -> Result<(), Self::Error> {
        let mut state = self.inner.write().map_err(|_| StoreError::LockPoisoned)?;

        let existing = state.records.remove(entity_id);
        let record = VersionRecord::advance(existing, entity_id, &update);
        state.records.insert(entity_id.clone(), record);

        let entry = IndexEntry::for_update(entity_id, &update);
        match state.index.iter_mut().find(|e| &e.entity_id == entity_id) {
            Some(existing) => {
                if !entry.label.is_empty() {
                    existing.label = entry.label;
                }
                existing.last_observed_at = entry.last_observed_at;
                existing.has_changes = entry.has_changes;
            }
            None => state.index.push(entry),
        }
        Ok(())
    }

    fn remove(&self, entity_id: &EntityId) -> Result<(), Self::Error> {
        let mut state = self.inner.write().map_err(|_| StoreError::LockPoisoned)?;
        state.records.remove(entity_id);
        state.index.retain(|e| &e.entity_id != entity_id);
        Ok(())
    }

    fn list_index(&self) -> Result<Vec<IndexEntry>, Self::Error> {
        let state = self.inner.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(state.index.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use casewatch_domain::{Fingerprint, PerSource, Snapshot, SourcePayload};
    use chrono::Utc;
    use serde_json::json;

    fn update(label: &str, changed: bool) -> RecordUpdate {
        let mut flags = PerSource::default();
        flags.case_status = changed;
        RecordUpdate {
            snapshot: Snapshot::new(
                PerSource::from_fn(|_| SourcePayload::Present(json!({"label": label}))),
                Utc::now(),
            ),
            change_flags: flags,
            fingerprints: PerSource::from_fn(|s| Fingerprint::from_hex(s.as_str())),
            label: label.to_string(),
        }
    }

    #[test]
    fn test_put_and_get() {
        let store = MemoryStore::new();
        let id = EntityId::new("X-1").unwrap();
        assert!(store.get(&id).unwrap().is_none());

        store.put(&id, update("I-485", false)).unwrap();
        let record = store.get(&id).unwrap().unwrap();
        assert!(record.previous.is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_blank_label_keeps_previous_label() {
        let store = MemoryStore::new();
        let id = EntityId::new("X-1").unwrap();
        store.put(&id, update("I-485", false)).unwrap();
        store.put(&id, update("", true)).unwrap();

        let index = store.list_index().unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(index[0].label, "I-485");
        assert!(index[0].has_changes);
    }

    #[test]
    fn test_remove_clears_record_and_index() {
        let store = MemoryStore::new();
        let id = EntityId::new("X-1").unwrap();
        store.put(&id, update("I-485", false)).unwrap();
        store.remove(&id).unwrap();
        store.remove(&id).unwrap();

        assert!(store.is_empty());
        assert!(store.list_index().unwrap().is_empty());
    }
}
