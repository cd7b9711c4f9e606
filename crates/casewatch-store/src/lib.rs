//! Casewatch Storage Layer
//!
//! Implements the VersionStore trait using SQLite, plus an in-memory store for
//! tests and short-lived processes.
//!
//! # Architecture
//!
//! - `version_records`: one row per tracked case (current + previous snapshot,
//!   fingerprints, change flags)
//! - `tracked_index`: ordered summary rows used to list tracked cases
//! - Every `put` and `remove` runs in a single transaction touching both tables
//!
//! # Examples
//!
//! ```no_run
//! use casewatch_store::SqliteStore;
//!
//! let store = SqliteStore::new(":memory:").unwrap();
//! // Store is now ready for version records
//! ```

#![warn(missing_docs)]

pub mod memory;

pub use memory::MemoryStore;

use casewatch_domain::traits::VersionStore;
use casewatch_domain::{EntityId, IndexEntry, RecordUpdate, Snapshot, VersionRecord};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Stored JSON could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid data format
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// A previous holder of the store lock panicked
    #[error("Store lock poisoned")]
    LockPoisoned,
}

/// SQLite-based implementation of VersionStore
///
/// The connection sits behind a mutex so one store can be shared between
/// concurrent observations. Each operation holds the lock for its whole
/// transaction.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

/// Raw column values of a `version_records` row
type RecordRow = (String, String, Option<String>, String, String, String);

impl SqliteStore {
    /// Create a new SqliteStore with the given database path
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use casewatch_store::SqliteStore;
    ///
    /// let store = SqliteStore::new("casewatch.db").unwrap();
    /// ```
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create a store backed by a private in-memory database
    pub fn in_memory() -> Result<Self, StoreError> {
        Self::new(":memory:")
    }

    /// Initialize the database schema
    fn initialize_schema(conn: &Connection) -> Result<(), StoreError> {
        let schema = include_str!("schema.sql");
        conn.execute_batch(schema)?;
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::LockPoisoned)
    }

    fn read_record(conn: &Connection, entity_id: &EntityId) -> Result<Option<VersionRecord>, StoreError> {
        let row: Option<RecordRow> = conn
            .query_row(
                "SELECT entity_id, current_snapshot, previous_snapshot, fingerprints, change_flags, last_observed_at
                 FROM version_records WHERE entity_id = ?1",
                params![entity_id.as_str()],
                |row| {
                    Ok((
                        row.get(0)?,
                        row.get(1)?,
                        row.get(2)?,
                        row.get(3)?,
                        row.get(4)?,
                        row.get(5)?,
                    ))
                },
            )
            .optional()?;

        row.map(Self::decode_record).transpose()
    }

    fn decode_record(row: RecordRow) -> Result<VersionRecord, StoreError> {
        let (entity_id, current, previous, fingerprints, change_flags, last_observed_at) = row;
        Ok(VersionRecord {
            entity_id: Self::parse_entity_id(&entity_id)?,
            current: serde_json::from_str::<Snapshot>(&current)?,
            previous: previous
                .map(|p| serde_json::from_str::<Snapshot>(&p))
                .transpose()?,
            fingerprints: serde_json::from_str(&fingerprints)?,
            change_flags: serde_json::from_str(&change_flags)?,
            last_observed_at: Self::parse_timestamp(&last_observed_at)?,
        })
    }

    fn parse_entity_id(value: &str) -> Result<EntityId, StoreError> {
        EntityId::new(value).map_err(|e| StoreError::InvalidData(format!("{}: {:?}", e, value)))
    }

    fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, StoreError> {
        DateTime::parse_from_rfc3339(value)
            .map(|t| t.with_timezone(&Utc))
            .map_err(|e| StoreError::InvalidData(format!("Bad timestamp {:?}: {}", value, e)))
    }
}

impl VersionStore for SqliteStore {
    type Error = StoreError;

    fn get(&self, entity_id: &EntityId) -> Result<Option<VersionRecord>, Self::Error> {
        let conn = self.lock()?;
        Self::read_record(&conn, entity_id)
    }

    fn put(&self, entity_id: &EntityId, update: RecordUpdate) -> Result<(), Self::Error> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let existing = Self::read_record(&tx, entity_id)?;
        let is_new = existing.is_none();
        let record = VersionRecord::advance(existing, entity_id, &update);
        let entry = IndexEntry::for_update(entity_id, &update);
        let observed_at = record.last_observed_at.to_rfc3339();

        tx.execute(
            "INSERT INTO version_records
                 (entity_id, current_snapshot, previous_snapshot, fingerprints, change_flags, last_observed_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(entity_id) DO UPDATE SET
                 current_snapshot = excluded.current_snapshot,
                 previous_snapshot = excluded.previous_snapshot,
                 fingerprints = excluded.fingerprints,
                 change_flags = excluded.change_flags,
                 last_observed_at = excluded.last_observed_at",
            params![
                entity_id.as_str(),
                serde_json::to_string(&record.current)?,
                record.previous.as_ref().map(serde_json::to_string).transpose()?,
                serde_json::to_string(&record.fingerprints)?,
                serde_json::to_string(&record.change_flags)?,
                &observed_at,
            ],
        )?;

        // A blank label never replaces a known one
        tx.execute(
            "INSERT INTO tracked_index (entity_id, label, last_observed_at, has_changes)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(entity_id) DO UPDATE SET
                 label = CASE WHEN excluded.label = '' THEN tracked_index.label ELSE excluded.label END,
                 last_observed_at = excluded.last_observed_at,
                 has_changes = excluded.has_changes",
            params![entity_id.as_str(), &entry.label, &observed_at, entry.has_changes],
        )?;

        tx.commit()?;
        tracing::debug!(entity = %entity_id, new = is_new, "Stored new generation");
        Ok(())
    }

    fn remove(&self, entity_id: &EntityId) -> Result<(), Self::Error> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let removed = tx.execute(
            "DELETE FROM version_records WHERE entity_id = ?1",
            params![entity_id.as_str()],
        )?;
        tx.execute(
            "DELETE FROM tracked_index WHERE entity_id = ?1",
            params![entity_id.as_str()],
        )?;
        tx.commit()?;

        tracing::debug!(entity = %entity_id, existed = removed > 0, "Removed case");
        Ok(())
    }

    fn list_index(&self) -> Result<Vec<IndexEntry>, Self::Error> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT entity_id, label, last_observed_at, has_changes
             FROM tracked_index ORDER BY seq",
        )?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, bool>(3)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(entity_id, label, observed, has_changes)| {
                Ok(IndexEntry {
                    entity_id: Self::parse_entity_id(&entity_id)?,
                    label,
                    last_observed_at: Self::parse_timestamp(&observed)?,
                    has_changes,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use casewatch_domain::{Fingerprint, PerSource, SourcePayload};
    use serde_json::json;

    fn update(status: &str) -> RecordUpdate {
        RecordUpdate {
            snapshot: Snapshot::new(
                PerSource::from_fn(|_| SourcePayload::Present(json!({"status": status}))),
                Utc::now(),
            ),
            change_flags: PerSource::default(),
            fingerprints: PerSource::from_fn(|_| Fingerprint::from_hex(status)),
            label: "I-485".to_string(),
        }
    }

    #[test]
    fn test_put_is_atomic_when_index_write_fails() {
        let store = SqliteStore::in_memory().unwrap();
        let id = EntityId::new("X-1").unwrap();
        store.put(&id, update("pending")).unwrap();

        store
            .lock()
            .unwrap()
            .execute_batch("DROP TABLE tracked_index")
            .unwrap();

        assert!(store.put(&id, update("approved")).is_err());

        let record = store.get(&id).unwrap().unwrap();
        assert_eq!(record.fingerprints.case_status.as_str(), "pending");
        assert!(record.previous.is_none());
    }

    #[test]
    fn test_corrupt_row_is_invalid_data() {
        let store = SqliteStore::in_memory().unwrap();
        store
            .lock()
            .unwrap()
            .execute(
                "INSERT INTO tracked_index (entity_id, label, last_observed_at, has_changes)
                 VALUES ('X-1', '', 'yesterday', 0)",
                [],
            )
            .unwrap();

        let result = store.list_index();
        assert!(matches!(result, Err(StoreError::InvalidData(_))));
    }
}
