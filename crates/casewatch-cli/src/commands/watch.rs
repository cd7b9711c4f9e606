//! Watch command implementation.

use crate::cli::WatchArgs;
use crate::error::{CliError, Result};
use casewatch_domain::traits::VersionStore;
use casewatch_tracker::{Tracker, TrackerConfig, TrackerWorker, MAX_POLL_INTERVAL_MINUTES};
use std::fmt::Display;
use std::time::Duration;

/// Execute the watch command and return the final metrics summary.
pub async fn execute_watch<S>(args: WatchArgs, tracker: &Tracker<S>, config: &TrackerConfig) -> Result<String>
where
    S: VersionStore,
    S::Error: Display,
{
    let mut worker = match args.interval {
        Some(0) => return Err(CliError::InvalidInput("Interval must be positive".to_string())),
        Some(minutes) if minutes > MAX_POLL_INTERVAL_MINUTES => {
            return Err(CliError::InvalidInput(format!(
                "Interval must be at most {} minutes",
                MAX_POLL_INTERVAL_MINUTES
            )))
        }
        Some(minutes) => TrackerWorker::with_interval(Duration::from_secs(minutes.saturating_mul(60))),
        None => TrackerWorker::new(config),
    };

    match args.cycles {
        Some(cycles) => worker.run_cycles(tracker, cycles).await?,
        None => worker.run(tracker).await?,
    }

    Ok(worker.metrics().summary())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::tracker;
    use casewatch_domain::{EntityId, SourceId};
    use casewatch_sources::MockSource;
    use serde_json::json;

    #[tokio::test]
    async fn test_single_cycle() {
        let tracker = tracker(&MockSource::always(SourceId::CaseStatus, json!({})));
        tracker.observe(&EntityId::new("IOE0000000001").unwrap()).await.unwrap();

        let args = WatchArgs {
            cycles: Some(1),
            interval: None,
        };
        let summary = execute_watch(args, &tracker, &TrackerConfig::default()).await.unwrap();
        assert!(summary.contains("Cycles: 1"));
        assert!(summary.contains("Observations: 1"));
    }

    #[tokio::test]
    async fn test_zero_interval_rejected() {
        let tracker = tracker(&MockSource::always(SourceId::CaseStatus, json!({})));
        let args = WatchArgs {
            cycles: Some(1),
            interval: Some(0),
        };
        assert!(execute_watch(args, &tracker, &TrackerConfig::default()).await.is_err());
    }

    #[tokio::test]
    async fn test_oversized_interval_rejected() {
        let tracker = tracker(&MockSource::always(SourceId::CaseStatus, json!({})));
        let args = WatchArgs {
            cycles: Some(1),
            interval: Some(u64::MAX),
        };
        let err = execute_watch(args, &tracker, &TrackerConfig::default()).await.unwrap_err();
        assert!(matches!(err, CliError::InvalidInput(_)));
    }
}
