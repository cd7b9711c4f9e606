//! HTTP Source Implementation
//!
//! Fetches one case payload from the case service over HTTPS.
//!
//! # Features
//!
//! - Async GET with a configurable request timeout
//! - Path templates with an `{id}` placeholder
//! - Optional session cookie sent with every request
//! - `{"data": ...}` envelope unwrapping
//!
//! # Examples
//!
//! ```no_run
//! use casewatch_domain::SourceId;
//! use casewatch_sources::HttpSource;
//! use std::time::Duration;
//!
//! let source = HttpSource::new(
//!     SourceId::CaseStatus,
//!     "https://my.uscis.gov",
//!     "/account/case-service/api/case_status/{id}",
//!     Duration::from_secs(30),
//! )
//! .unwrap()
//! .with_cookie("session=abc");
//! ```

use crate::{PayloadSource, SourceError};
use async_trait::async_trait;
use casewatch_domain::{EntityId, SourceId};
use reqwest::header::{ACCEPT, COOKIE};
use serde_json::Value;
use std::time::Duration;

/// Placeholder replaced by the case identifier in path templates
pub const ID_PLACEHOLDER: &str = "{id}";

/// A [`PayloadSource`] backed by one JSON endpoint
pub struct HttpSource {
    id: SourceId,
    base_url: String,
    path_template: String,
    cookie: Option<String>,
    client: reqwest::Client,
}

impl HttpSource {
    /// Create a source for `base_url` + `path_template`
    ///
    /// # Errors
    ///
    /// Returns `SourceError::Transport` if the HTTP client cannot be built.
    pub fn new(
        id: SourceId,
        base_url: impl Into<String>,
        path_template: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SourceError::Transport(format!("Failed to build client: {}", e)))?;

        Ok(Self {
            id,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            path_template: path_template.into(),
            cookie: None,
            client,
        })
    }

    /// Send `cookie` as the `Cookie` header on every request
    pub fn with_cookie(mut self, cookie: impl Into<String>) -> Self {
        self.cookie = Some(cookie.into());
        self
    }

    /// Full URL for one case
    pub fn url_for(&self, entity_id: &EntityId) -> String {
        format!(
            "{}{}",
            self.base_url,
            self.path_template.replace(ID_PLACEHOLDER, entity_id.as_str())
        )
    }
}

#[async_trait]
impl PayloadSource for HttpSource {
    fn id(&self) -> SourceId {
        self.id
    }

    async fn fetch(&self, entity_id: &EntityId) -> Result<Value, SourceError> {
        let url = self.url_for(entity_id);
        tracing::debug!(source = %self.id, %url, "Fetching payload");

        let mut request = self.client.get(&url).header(ACCEPT, "application/json");
        if let Some(cookie) = &self.cookie {
            request = request.header(COOKIE, cookie);
        }

        let response = request
            .send()
            .await
            .map_err(|e| SourceError::Transport(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| SourceError::Transport(format!("Failed to read body: {}", e)))?;
        let value: Value = serde_json::from_str(&body)
            .map_err(|e| SourceError::InvalidResponse(format!("Failed to parse body: {}", e)))?;

        Ok(unwrap_envelope(value))
    }
}

/// Strip the `{"data": ...}` envelope some endpoints wrap their payload in
///
/// The payload is the `data` field when the body is an object whose `data` is
/// present and not null; otherwise the body itself.
pub fn unwrap_envelope(body: Value) -> Value {
    match body {
        Value::Object(mut map) if map.get("data").is_some_and(|d| !d.is_null()) => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}
