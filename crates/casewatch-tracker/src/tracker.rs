//! Core tracker: observe, list, forget, and inspect tracked cases

use crate::detect::detect;
use crate::TrackerError;
use casewatch_diff::{diff, UnifiedDiff};
use casewatch_domain::traits::VersionStore;
use casewatch_domain::{
    EntityId, IndexEntry, ObservationResult, RecordUpdate, SourceId, VersionRecord,
};
use casewatch_sources::SourceSet;
use std::collections::HashMap;
use std::fmt::Display;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type LockMap = Mutex<HashMap<EntityId, Arc<AsyncMutex<()>>>>;

/// Tracks cases by re-fetching their sources and keeping one prior generation
///
/// Operations on the same case are serialized: an observation holds the case's
/// lock from the first fetch until the store has accepted the new snapshot,
/// and `forget` takes the same lock. Different cases never wait on each other.
///
/// # Examples
///
/// ```no_run
/// use casewatch_domain::EntityId;
/// use casewatch_store::SqliteStore;
/// use casewatch_tracker::{Tracker, TrackerConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = TrackerConfig::default();
/// let tracker = Tracker::new(SqliteStore::new("casewatch.db")?, config.source_set()?);
///
/// let result = tracker.observe(&EntityId::new("IOE0000000001")?).await?;
/// if result.has_changes() {
///     println!("changed: {:?}", result.change_flags.flagged());
/// }
/// # Ok(())
/// # }
/// ```
pub struct Tracker<S> {
    store: S,
    sources: SourceSet,
    locks: LockMap,
}

impl<S> Tracker<S>
where
    S: VersionStore,
    S::Error: Display,
{
    /// Create a tracker over `store`, fetching from `sources`
    pub fn new(store: S, sources: SourceSet) -> Self {
        Self {
            store,
            sources,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// The underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Fetch every source for a case, detect changes, and store the result
    ///
    /// When every source fails the result carries an error message and the
    /// store is not touched. Otherwise the snapshot becomes the new current
    /// generation, absent sources included.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::Store` if the stored record cannot be read or
    /// the new generation cannot be written. A failed write leaves the prior
    /// record intact.
    pub async fn observe(&self, entity_id: &EntityId) -> Result<ObservationResult, TrackerError> {
        let _guard = self.lock_entity(entity_id).await;

        let snapshot = self.sources.fetch_all(entity_id).await;
        let observed_at = snapshot.captured_at;

        if snapshot.is_empty() {
            tracing::warn!(entity = %entity_id, "All sources failed, store left untouched");
            return Ok(ObservationResult::total_failure(entity_id, observed_at));
        }

        let existing = self.store.get(entity_id).map_err(store_error)?;
        let detection = detect(existing.as_ref().map(|r| &r.fingerprints), &snapshot);
        let previous = existing.map(|r| r.current);

        let update = RecordUpdate {
            snapshot: snapshot.clone(),
            change_flags: detection.change_flags.clone(),
            fingerprints: detection.fingerprints,
            label: snapshot.form_label(),
        };
        self.store.put(entity_id, update).map_err(store_error)?;

        tracing::info!(
            entity = %entity_id,
            present = snapshot.present_count(),
            changed = ?detection.change_flags.flagged(),
            "Observation stored"
        );

        Ok(ObservationResult {
            entity_id: entity_id.clone(),
            current: snapshot,
            previous,
            change_flags: detection.change_flags,
            observed_at,
            error: None,
        })
    }

    /// Every tracked case, in the order it was first observed
    pub fn list_tracked(&self) -> Result<Vec<IndexEntry>, TrackerError> {
        self.store.list_index().map_err(store_error)
    }

    /// Stop tracking a case; forgetting an unknown case is a no-op
    pub async fn forget(&self, entity_id: &EntityId) -> Result<(), TrackerError> {
        let _guard = self.lock_entity(entity_id).await;
        self.store.remove(entity_id).map_err(store_error)?;
        tracing::info!(entity = %entity_id, "Case forgotten");
        Ok(())
    }

    /// The stored record for a case, if tracked
    pub fn record(&self, entity_id: &EntityId) -> Result<Option<VersionRecord>, TrackerError> {
        self.store.get(entity_id).map_err(store_error)
    }

    /// Diff of one source between the previous and current generation
    ///
    /// `None` when the case is untracked, has only one generation, or the
    /// source did not change.
    pub fn diff(&self, entity_id: &EntityId, source: SourceId) -> Result<Option<UnifiedDiff>, TrackerError> {
        Ok(self
            .record(entity_id)?
            .and_then(|record| source_diff(&record, source)))
    }

    /// Diffs of every source that differs between the two stored generations
    pub fn diffs(&self, entity_id: &EntityId) -> Result<Vec<(SourceId, UnifiedDiff)>, TrackerError> {
        let Some(record) = self.record(entity_id)? else {
            return Ok(Vec::new());
        };
        Ok(SourceId::ALL
            .into_iter()
            .filter_map(|source| source_diff(&record, source).map(|d| (source, d)))
            .collect())
    }

    async fn lock_entity(&self, entity_id: &EntityId) -> EntityGuard<'_> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            locks.entry(entity_id.clone()).or_default().clone()
        };
        EntityGuard {
            locks: &self.locks,
            entity_id: entity_id.clone(),
            guard: Some(lock.lock_owned().await),
        }
    }

    #[cfg(test)]
    fn held_locks(&self) -> usize {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

fn source_diff(record: &VersionRecord, source: SourceId) -> Option<UnifiedDiff> {
    let previous = record.previous.as_ref()?;
    diff(source.label(), previous.payload(source), record.current.payload(source))
}

fn store_error<E: Display>(e: E) -> TrackerError {
    TrackerError::Store(e.to_string())
}

/// Holds one case's lock; drops the map entry once nobody else wants it
struct EntityGuard<'a> {
    locks: &'a LockMap,
    entity_id: EntityId,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for EntityGuard<'_> {
    fn drop(&mut self) {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        self.guard.take();
        // Waiters hold their own clone, so a count of one means only the map is left
        if locks
            .get(&self.entity_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(&self.entity_id);
        }
    }
}
