//! Configuration for the tracker
//!
//! Defines where the case service lives, how long requests may take, and how
//! often the background worker re-observes tracked cases.

use crate::TrackerError;
use casewatch_domain::PerSource;
use casewatch_sources::{default_endpoints, http::ID_PLACEHOLDER, SourceSet, DEFAULT_BASE_URL};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Longest accepted poll interval: one week
pub const MAX_POLL_INTERVAL_MINUTES: u64 = 7 * 24 * 60;

/// Configuration for the tracker and its worker
///
/// # Examples
///
/// ```
/// use casewatch_tracker::TrackerConfig;
///
/// let config = TrackerConfig::default();
/// assert_eq!(config.request_timeout_secs, 30);
/// assert_eq!(config.poll_interval_minutes, 60);
///
/// let config = TrackerConfig::from_toml_str("poll_interval_minutes = 15").unwrap();
/// assert_eq!(config.poll_interval_minutes, 15);
/// assert_eq!(config.base_url, "https://my.uscis.gov");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Host of the case service, without a trailing path
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout (in seconds)
    /// Default: 30
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// How often the worker re-observes every tracked case (in minutes)
    /// Default: 60
    #[serde(default = "default_poll_interval_minutes")]
    pub poll_interval_minutes: u64,

    /// Cookie header sent with every request, if set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_cookie: Option<String>,

    /// Path template per source; `{id}` is replaced by the case identifier
    #[serde(default = "default_endpoints")]
    pub endpoints: PerSource<String>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_poll_interval_minutes() -> u64 {
    60
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            poll_interval_minutes: default_poll_interval_minutes(),
            session_cookie: None,
            endpoints: default_endpoints(),
        }
    }
}

impl TrackerConfig {
    /// Parse a TOML table; missing keys take their defaults
    pub fn from_toml_str(text: &str) -> Result<Self, TrackerError> {
        let config: Self = toml::from_str(text).map_err(|e| TrackerError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the tracker cannot run with
    pub fn validate(&self) -> Result<(), TrackerError> {
        if self.base_url.trim().is_empty() {
            return Err(TrackerError::Config("base_url must not be empty".to_string()));
        }
        if self.request_timeout_secs == 0 {
            return Err(TrackerError::Config("request_timeout_secs must be positive".to_string()));
        }
        if self.poll_interval_minutes == 0 {
            return Err(TrackerError::Config("poll_interval_minutes must be positive".to_string()));
        }
        if self.poll_interval_minutes > MAX_POLL_INTERVAL_MINUTES {
            return Err(TrackerError::Config(format!(
                "poll_interval_minutes must be at most {}",
                MAX_POLL_INTERVAL_MINUTES
            )));
        }
        for (source, template) in self.endpoints.iter() {
            if !template.contains(ID_PLACEHOLDER) {
                return Err(TrackerError::Config(format!(
                    "endpoint for {} must contain {}",
                    source, ID_PLACEHOLDER
                )));
            }
        }
        Ok(())
    }

    /// Get request timeout as Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Get poll interval as Duration
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_minutes.saturating_mul(60))
    }

    /// Build the HTTP sources described by this configuration
    pub fn source_set(&self) -> Result<SourceSet, TrackerError> {
        self.validate()?;
        SourceSet::http(
            &self.base_url,
            &self.endpoints,
            self.session_cookie.as_deref(),
            self.request_timeout(),
        )
        .map_err(|e| TrackerError::Config(e.to_string()))
    }
}
