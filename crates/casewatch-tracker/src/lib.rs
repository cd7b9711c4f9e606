//! Casewatch Tracker
//!
//! Observes cases, detects which sources changed, and keeps the current and
//! previous snapshot of every tracked case.
//!
//! # Overview
//!
//! The tracker is responsible for:
//! - **Observation**: fetching every source concurrently and assembling a snapshot
//! - **Change detection**: comparing fresh fingerprints with the stored ones
//! - **Versioning**: handing the new generation to the store in one atomic step
//! - **Watching**: re-observing every tracked case on a schedule
//!
//! ## Failure handling
//!
//! | Failure | Outcome |
//! |---------|---------|
//! | One or two sources fail | Recorded as absent; observation proceeds |
//! | Every source fails | `ObservationResult::error` is set; store untouched |
//! | Storage read or write fails | `TrackerError::Store`; prior record intact |
//!
//! # Usage
//!
//! ## One-time Observation
//!
//! ```no_run
//! use casewatch_domain::EntityId;
//! use casewatch_store::SqliteStore;
//! use casewatch_tracker::{Tracker, TrackerConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = TrackerConfig::default();
//! let tracker = Tracker::new(SqliteStore::new("casewatch.db")?, config.source_set()?);
//!
//! let id = EntityId::new("IOE0000000001")?;
//! let result = tracker.observe(&id).await?;
//! for (source, diff) in tracker.diffs(&id)? {
//!     println!("{}:\n{}", source, diff);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Background Worker
//!
//! ```no_run
//! use casewatch_store::SqliteStore;
//! use casewatch_tracker::{Tracker, TrackerConfig, TrackerWorker};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = TrackerConfig::default();
//!     let tracker = Tracker::new(SqliteStore::new("casewatch.db")?, config.source_set()?);
//!     let mut worker = TrackerWorker::new(&config);
//!
//!     worker.run_cycles(&tracker, 3).await?;
//!     println!("{}", worker.metrics().summary());
//!     Ok(())
//! }
//! ```
//!
//! # Configuration
//!
//! The tracker can be configured via TOML:
//!
//! ```toml
//! [tracker]
//! base_url = "https://my.uscis.gov"
//! request_timeout_secs = 30
//! poll_interval_minutes = 60
//! session_cookie = "..."
//!
//! [tracker.endpoints]
//! caseDetails = "/account/case-service/api/cases/{id}"
//! caseStatus = "/account/case-service/api/case_status/{id}"
//! receiptInfo = "/secure-messaging/api/case-service/receipt_info/{id}"
//! ```

#![warn(missing_docs)]

mod config;
mod detect;
mod error;
mod metrics;
mod tracker;
mod worker;

pub use config::{TrackerConfig, MAX_POLL_INTERVAL_MINUTES};
pub use detect::{detect, Detection};
pub use error::TrackerError;
pub use metrics::WatchMetrics;
pub use tracker::Tracker;
pub use worker::TrackerWorker;
