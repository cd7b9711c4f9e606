//! Casewatch Source Layer
//!
//! Fetches the three payloads that describe a case and assembles them into a
//! [`Snapshot`].
//!
//! # Architecture
//!
//! Every endpoint implements [`PayloadSource`]. A [`SourceSet`] holds one
//! source per [`SourceId`], fans the fetches out concurrently, and turns every
//! failure into [`SourcePayload::Absent`], so a snapshot is always produced.
//!
//! # Sources
//!
//! - `HttpSource`: GET against the case service with an optional session cookie
//! - `MockSource`: scripted responses for testing
//!
//! # Examples
//!
//! ```
//! use casewatch_domain::{EntityId, PerSource};
//! use casewatch_sources::{MockSource, PayloadSource, SourceSet};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! let set = SourceSet::new(PerSource::from_fn(|id| {
//!     Arc::new(MockSource::always(id, json!({"id": id.as_str()}))) as Arc<dyn PayloadSource>
//! }));
//! let rt = tokio::runtime::Runtime::new().unwrap();
//! let snapshot = rt.block_on(set.fetch_all(&EntityId::new("IOE0000000001").unwrap()));
//! assert_eq!(snapshot.present_count(), 3);
//! ```

#![warn(missing_docs)]

pub mod http;
pub mod mock;

use async_trait::async_trait;
use casewatch_domain::{EntityId, PerSource, Snapshot, SourceId, SourcePayload};
use chrono::Utc;
use futures::future::join_all;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

pub use http::{unwrap_envelope, HttpSource};
pub use mock::MockSource;

/// Default host of the case service
pub const DEFAULT_BASE_URL: &str = "https://my.uscis.gov";

/// Errors that can occur while fetching a payload
#[derive(Error, Debug)]
pub enum SourceError {
    /// Network or connection failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// The endpoint answered with a non-success status
    #[error("Unexpected HTTP status {0}")]
    Status(u16),

    /// The body was not valid JSON
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Scripted failure from a mock source
    #[error("Mock error: {0}")]
    Mock(String),
}

/// One remote endpoint contributing a payload to each snapshot
#[async_trait]
pub trait PayloadSource: Send + Sync {
    /// Which slot of the snapshot this source fills
    fn id(&self) -> SourceId;

    /// Fetch the payload for one case
    async fn fetch(&self, entity_id: &EntityId) -> Result<Value, SourceError>;
}

/// Path template (with `{id}`) for each source on the default host
pub fn default_endpoints() -> PerSource<String> {
    PerSource {
        case_details: "/account/case-service/api/cases/{id}".to_string(),
        case_status: "/account/case-service/api/case_status/{id}".to_string(),
        receipt_info: "/secure-messaging/api/case-service/receipt_info/{id}".to_string(),
    }
}

/// The full set of sources, one per [`SourceId`]
#[derive(Clone)]
pub struct SourceSet {
    sources: PerSource<Arc<dyn PayloadSource>>,
}

impl SourceSet {
    /// Build a set from one source per slot
    pub fn new(sources: PerSource<Arc<dyn PayloadSource>>) -> Self {
        Self { sources }
    }

    /// Build HTTP sources for every slot against `base_url`
    pub fn http(
        base_url: &str,
        endpoints: &PerSource<String>,
        session_cookie: Option<&str>,
        timeout: Duration,
    ) -> Result<Self, SourceError> {
        let built = endpoints.map(|id, template| {
            let source = HttpSource::new(id, base_url, template, timeout)?;
            let source = match session_cookie {
                Some(cookie) => source.with_cookie(cookie),
                None => source,
            };
            Ok::<Arc<dyn PayloadSource>, SourceError>(Arc::new(source))
        });
        Ok(Self::new(PerSource {
            case_details: built.case_details?,
            case_status: built.case_status?,
            receipt_info: built.receipt_info?,
        }))
    }

    /// The source filling one slot
    pub fn source(&self, id: SourceId) -> &Arc<dyn PayloadSource> {
        self.sources.get(id)
    }

    /// Fetch every source concurrently and wait for all of them to settle
    ///
    /// Never fails: a source that errors is logged and recorded as absent.
    /// The snapshot's capture time is taken once every fetch has finished.
    pub async fn fetch_all(&self, entity_id: &EntityId) -> Snapshot {
        let fetches = self.sources.iter().map(|(slot, source)| async move {
            (slot, source.fetch(entity_id).await)
        });
        let results = join_all(fetches).await;

        let mut payloads: PerSource<SourcePayload> = PerSource::default();
        for (slot, result) in results {
            match result {
                Ok(value) => *payloads.get_mut(slot) = SourcePayload::Present(value),
                Err(e) => {
                    tracing::warn!(entity = %entity_id, source = %slot, error = %e, "Source fetch failed");
                }
            }
        }

        Snapshot::new(payloads, Utc::now())
    }
}
