//! Background worker that re-observes tracked cases on a schedule

use crate::{Tracker, TrackerConfig, TrackerError, WatchMetrics};
use casewatch_domain::traits::VersionStore;
use std::fmt::Display;
use std::time::Instant;
use tokio::time::{interval, Duration};

/// Background worker that runs a watch cycle at a fixed interval
///
/// Each cycle observes every tracked case once, in index order. A failing
/// case is logged and counted; it never stops the cycle.
///
/// # Examples
///
/// ```no_run
/// use casewatch_store::SqliteStore;
/// use casewatch_tracker::{Tracker, TrackerConfig, TrackerWorker};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = TrackerConfig::default();
///     let tracker = Tracker::new(SqliteStore::new("casewatch.db")?, config.source_set()?);
///     let mut worker = TrackerWorker::new(&config);
///
///     // Run indefinitely (until Ctrl+C)
///     worker.run(&tracker).await?;
///     Ok(())
/// }
/// ```
pub struct TrackerWorker {
    interval: Duration,
    metrics: WatchMetrics,
}

impl TrackerWorker {
    /// Create a worker polling at the configured interval
    pub fn new(config: &TrackerConfig) -> Self {
        Self::with_interval(config.poll_interval())
    }

    /// Create a worker polling every `interval`
    pub fn with_interval(interval: Duration) -> Self {
        Self {
            interval,
            metrics: WatchMetrics::new(),
        }
    }

    /// Run the worker until a shutdown signal (Ctrl+C) is received
    ///
    /// Failed cycles are logged and the worker keeps going.
    pub async fn run<S>(&mut self, tracker: &Tracker<S>) -> Result<(), TrackerError>
    where
        S: VersionStore,
        S::Error: Display,
    {
        let mut ticker = interval(self.interval);

        tracing::info!("Watch worker started (interval: {:?})", self.interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.cycle(tracker).await {
                        tracing::error!("Watch cycle failed: {}", e);
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Shutdown signal received, stopping watch worker");
                    break;
                }
            }
        }

        tracing::info!("Watch worker stopped. Final metrics:\n{}", self.metrics.summary());
        Ok(())
    }

    /// Run for a specific number of cycles
    ///
    /// Stops at the first cycle that cannot list the tracked cases.
    pub async fn run_cycles<S>(&mut self, tracker: &Tracker<S>, cycles: usize) -> Result<(), TrackerError>
    where
        S: VersionStore,
        S::Error: Display,
    {
        let mut ticker = interval(self.interval);

        for cycle in 0..cycles {
            ticker.tick().await;
            tracing::debug!("Starting watch cycle {}/{}", cycle + 1, cycles);

            if let Err(e) = self.cycle(tracker).await {
                tracing::error!("Watch cycle {}/{} failed: {}", cycle + 1, cycles, e);
                return Err(e);
            }
        }

        tracing::info!("Watch worker finished {} cycles. Final metrics:\n{}", cycles, self.metrics.summary());
        Ok(())
    }

    /// Observe every tracked case once
    async fn cycle<S>(&mut self, tracker: &Tracker<S>) -> Result<(), TrackerError>
    where
        S: VersionStore,
        S::Error: Display,
    {
        let start = Instant::now();
        let tracked = tracker.list_tracked().inspect_err(|_| self.metrics.record_storage_error())?;

        for entry in &tracked {
            match tracker.observe(&entry.entity_id).await {
                Ok(result) if result.is_failure() => self.metrics.record_total_failure(),
                Ok(result) => {
                    let flagged = result.change_flags.flagged();
                    if !flagged.is_empty() {
                        tracing::info!(entity = %entry.entity_id, changed = ?flagged, "Case changed");
                    }
                    self.metrics.record_observation(&flagged);
                }
                Err(e) => {
                    tracing::error!(entity = %entry.entity_id, "Observation failed: {}", e);
                    self.metrics.record_storage_error();
                }
            }
        }

        self.metrics.record_cycle();
        self.metrics.total_runtime_secs += start.elapsed().as_secs();
        tracing::info!(
            "Watch cycle completed: {} cases, {} changed so far",
            tracked.len(),
            self.metrics.changed
        );
        Ok(())
    }

    /// Get a reference to the worker's metrics
    pub fn metrics(&self) -> &WatchMetrics {
        &self.metrics
    }

    /// Reset the worker's metrics counters
    pub fn reset_metrics(&mut self) {
        self.metrics.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use casewatch_domain::{EntityId, PerSource, SourceId};
    use casewatch_sources::{MockSource, PayloadSource, SourceSet};
    use casewatch_store::MemoryStore;
    use serde_json::json;
    use std::sync::Arc;

    fn tracker(status: &MockSource) -> Tracker<MemoryStore> {
        let sources = SourceSet::new(PerSource {
            case_details: Arc::new(MockSource::always(SourceId::CaseDetails, json!({"formType": "I-130"})))
                as Arc<dyn PayloadSource>,
            case_status: Arc::new(status.clone()) as Arc<dyn PayloadSource>,
            receipt_info: Arc::new(MockSource::always(SourceId::ReceiptInfo, json!({})))
                as Arc<dyn PayloadSource>,
        });
        Tracker::new(MemoryStore::new(), sources)
    }

    #[test]
    fn test_worker_creation() {
        let worker = TrackerWorker::new(&TrackerConfig::default());
        assert_eq!(worker.interval, Duration::from_secs(3600));
        assert_eq!(worker.metrics().cycles, 0);
    }

    #[tokio::test]
    async fn test_run_cycles_counts_changes() {
        let status = MockSource::new(SourceId::CaseStatus);
        status.push_ok(json!({"status": "received"}));
        status.push_ok(json!({"status": "received"}));
        status.push_ok(json!({"status": "approved"}));
        let tracker = tracker(&status);
        tracker.observe(&EntityId::new("X-1").unwrap()).await.unwrap();

        let mut worker = TrackerWorker::with_interval(Duration::from_millis(5));
        worker.run_cycles(&tracker, 2).await.unwrap();

        let metrics = worker.metrics();
        assert_eq!(metrics.cycles, 2);
        assert_eq!(metrics.observations, 2);
        assert_eq!(metrics.changed, 1);
        assert_eq!(metrics.changes_by_source[&SourceId::CaseStatus], 1);
    }

    #[tokio::test]
    async fn test_empty_index_cycle() {
        let tracker = tracker(&MockSource::always(SourceId::CaseStatus, json!(1)));
        let mut worker = TrackerWorker::with_interval(Duration::from_millis(5));
        worker.run_cycles(&tracker, 1).await.unwrap();

        assert_eq!(worker.metrics().cycles, 1);
        assert_eq!(worker.metrics().observations, 0);

        worker.reset_metrics();
        assert_eq!(worker.metrics().cycles, 0);
    }
}
