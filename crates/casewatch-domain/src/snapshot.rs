//! Snapshots and content fingerprints

use crate::{PerSource, SourceId, SourcePayload};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Every source's payload captured in one observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Per-source payloads
    pub payloads: PerSource<SourcePayload>,
    /// When the fetches settled
    pub captured_at: DateTime<Utc>,
}

impl Snapshot {
    /// Create a snapshot from payloads captured at `captured_at`
    pub fn new(payloads: PerSource<SourcePayload>, captured_at: DateTime<Utc>) -> Self {
        Self {
            payloads,
            captured_at,
        }
    }

    /// A snapshot in which every source is absent
    pub fn empty(captured_at: DateTime<Utc>) -> Self {
        Self::new(PerSource::default(), captured_at)
    }

    /// Payload for one source
    pub fn payload(&self, source: SourceId) -> &SourcePayload {
        self.payloads.get(source)
    }

    /// True if every source is absent
    pub fn is_empty(&self) -> bool {
        self.payloads.iter().all(|(_, p)| !p.is_present())
    }

    /// Number of sources that answered
    pub fn present_count(&self) -> usize {
        self.payloads.iter().filter(|(_, p)| p.is_present()).count()
    }

    /// Display label for the case: the form type, falling back to the
    /// receipt's form, falling back to empty text
    pub fn form_label(&self) -> String {
        self.payload(SourceId::CaseDetails)
            .str_at("/formType")
            .or_else(|| self.payload(SourceId::ReceiptInfo).str_at("/receipt_details/form"))
            .unwrap_or_default()
            .to_string()
    }
}

/// Hex-encoded SHA-256 digest of a payload's canonical form
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Wrap an already-computed hex digest
    pub fn from_hex(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    /// The hex digest
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
