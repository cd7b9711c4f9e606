//! Mock source for deterministic testing

use crate::{PayloadSource, SourceError};
use async_trait::async_trait;
use casewatch_domain::{EntityId, SourceId};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Mock source that replays scripted responses without any network calls
///
/// Responses are consumed in order, one per fetch. Once the script runs dry
/// the last response is repeated, so a source scripted once answers the same
/// way forever.
///
/// # Examples
///
/// ```
/// use casewatch_domain::{EntityId, SourceId};
/// use casewatch_sources::{MockSource, PayloadSource};
/// use serde_json::json;
///
/// let source = MockSource::new(SourceId::CaseStatus);
/// source.push_ok(json!({"status": "received"}));
/// source.push_err("offline");
///
/// let rt = tokio::runtime::Runtime::new().unwrap();
/// let id = EntityId::new("IOE0000000001").unwrap();
/// assert!(rt.block_on(source.fetch(&id)).is_ok());
/// assert!(rt.block_on(source.fetch(&id)).is_err());
/// assert!(rt.block_on(source.fetch(&id)).is_err());
/// assert_eq!(source.call_count(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct MockSource {
    id: SourceId,
    script: Arc<Mutex<Script>>,
    call_count: Arc<AtomicUsize>,
    delay: Option<Duration>,
}

#[derive(Debug, Default)]
struct Script {
    queue: VecDeque<Result<Value, String>>,
    last: Option<Result<Value, String>>,
}

impl MockSource {
    /// Create a mock with an empty script; fetches fail until scripted
    pub fn new(id: SourceId) -> Self {
        Self {
            id,
            script: Arc::new(Mutex::new(Script::default())),
            call_count: Arc::new(AtomicUsize::new(0)),
            delay: None,
        }
    }

    /// A mock that always answers `value`
    pub fn always(id: SourceId, value: Value) -> Self {
        let source = Self::new(id);
        source.push_ok(value);
        source
    }

    /// A mock that always fails with `message`
    pub fn failing(id: SourceId, message: impl Into<String>) -> Self {
        let source = Self::new(id);
        source.push_err(message);
        source
    }

    /// Sleep for `delay` before answering each fetch
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Append a successful response to the script
    pub fn push_ok(&self, value: Value) {
        if let Ok(mut script) = self.script.lock() {
            script.queue.push_back(Ok(value));
        }
    }

    /// Append a failure to the script
    pub fn push_err(&self, message: impl Into<String>) {
        if let Ok(mut script) = self.script.lock() {
            script.queue.push_back(Err(message.into()));
        }
    }

    /// Number of times fetch was called
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    fn next_response(&self) -> Result<Value, SourceError> {
        let mut script = self
            .script
            .lock()
            .map_err(|_| SourceError::Mock("script lock poisoned".to_string()))?;

        let next = match script.queue.pop_front() {
            Some(response) => {
                script.last = Some(response.clone());
                Some(response)
            }
            None => script.last.clone(),
        };

        match next {
            Some(Ok(value)) => Ok(value),
            Some(Err(message)) => Err(SourceError::Mock(message)),
            None => Err(SourceError::Mock("no scripted response".to_string())),
        }
    }
}

#[async_trait]
impl PayloadSource for MockSource {
    fn id(&self) -> SourceId {
        self.id
    }

    async fn fetch(&self, entity_id: &EntityId) -> Result<Value, SourceError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let response = self.next_response();
        tracing::debug!(source = %self.id, entity = %entity_id, ok = response.is_ok(), "Mock fetch");
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn id() -> EntityId {
        EntityId::new("X-1").unwrap()
    }

    #[tokio::test]
    async fn test_mock_source_replays_in_order() {
        let source = MockSource::new(SourceId::CaseStatus);
        source.push_ok(json!(1));
        source.push_ok(json!(2));

        assert_eq!(source.fetch(&id()).await.unwrap(), json!(1));
        assert_eq!(source.fetch(&id()).await.unwrap(), json!(2));
        // Last response repeats once the script is exhausted
        assert_eq!(source.fetch(&id()).await.unwrap(), json!(2));
        assert_eq!(source.call_count(), 3);
    }

    #[tokio::test]
    async fn test_mock_source_push_after_exhaustion() {
        let source = MockSource::always(SourceId::CaseStatus, json!("a"));
        assert_eq!(source.fetch(&id()).await.unwrap(), json!("a"));
        source.push_ok(json!("b"));
        assert_eq!(source.fetch(&id()).await.unwrap(), json!("b"));
        assert_eq!(source.fetch(&id()).await.unwrap(), json!("b"));
    }

    #[tokio::test]
    async fn test_mock_source_empty_script_fails() {
        let source = MockSource::new(SourceId::ReceiptInfo);
        assert!(matches!(source.fetch(&id()).await, Err(SourceError::Mock(_))));
    }

    #[tokio::test]
    async fn test_mock_source_clone_shares_state() {
        let source = MockSource::failing(SourceId::CaseDetails, "down");
        let handle = source.clone();
        assert!(source.fetch(&id()).await.is_err());
        assert!(handle.fetch(&id()).await.is_err());
        assert_eq!(source.call_count(), 2);
    }
}
