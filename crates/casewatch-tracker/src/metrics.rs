//! Metrics collection for the watch worker

use casewatch_domain::SourceId;
use std::collections::HashMap;

/// Counters collected while the worker re-observes tracked cases
#[derive(Debug, Clone, Default)]
pub struct WatchMetrics {
    /// Completed watch cycles
    pub cycles: usize,

    /// Observations that produced a stored snapshot
    pub observations: usize,

    /// Observations in which at least one source changed
    pub changed: usize,

    /// Changes per source
    pub changes_by_source: HashMap<SourceId, usize>,

    /// Observations in which every source failed
    pub total_failures: usize,

    /// Operations that failed in the storage layer
    pub storage_errors: usize,

    /// Total runtime in seconds
    pub total_runtime_secs: u64,
}

impl WatchMetrics {
    /// Create new empty metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a stored observation and the sources it flagged
    pub fn record_observation(&mut self, flagged: &[SourceId]) {
        self.observations += 1;
        if !flagged.is_empty() {
            self.changed += 1;
        }
        for source in flagged {
            *self.changes_by_source.entry(*source).or_insert(0) += 1;
        }
    }

    /// Record an observation in which every source failed
    pub fn record_total_failure(&mut self) {
        self.total_failures += 1;
    }

    /// Record a storage failure
    pub fn record_storage_error(&mut self) {
        self.storage_errors += 1;
    }

    /// Record a cycle completion
    pub fn record_cycle(&mut self) {
        self.cycles += 1;
    }

    /// Reset all metrics
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Generate a summary report of metrics
    pub fn summary(&self) -> String {
        let mut lines = vec![
            "Watch Metrics Summary".to_string(),
            "=====================".to_string(),
            format!("Cycles: {}", self.cycles),
            format!("Total runtime: {}s", self.total_runtime_secs),
            format!("Observations: {}", self.observations),
            format!("Changed: {}", self.changed),
            format!("All sources failed: {}", self.total_failures),
            format!("Storage errors: {}", self.storage_errors),
        ];

        if !self.changes_by_source.is_empty() {
            lines.push(String::new());
            lines.push("Changes by source:".to_string());
            for source in SourceId::ALL {
                if let Some(count) = self.changes_by_source.get(&source) {
                    lines.push(format!("  {}: {}", source.label(), count));
                }
            }
        }

        lines.join("\n")
    }
}
