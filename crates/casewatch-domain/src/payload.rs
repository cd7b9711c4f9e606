//! Source payloads with an explicit absence marker

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// What one source contributed to a snapshot
///
/// `Absent` means the fetch failed or the source returned nothing usable. It is
/// a distinct state from `Present(Value::Null)` and from an empty object, and
/// stays distinct through persistence, fingerprinting, and diffing.
///
/// Persisted as `{"state": "present", "value": ...}` or `{"state": "absent"}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum SourcePayload {
    /// The source answered with this JSON document
    Present(Value),
    /// The source could not be fetched
    #[default]
    Absent,
}

impl SourcePayload {
    /// True if the source answered
    pub fn is_present(&self) -> bool {
        matches!(self, SourcePayload::Present(_))
    }

    /// Borrow the JSON document, if any
    pub fn value(&self) -> Option<&Value> {
        match self {
            SourcePayload::Present(v) => Some(v),
            SourcePayload::Absent => None,
        }
    }

    /// Look up a string field by JSON pointer (e.g. `/receipt_details/form`)
    pub fn str_at(&self, pointer: &str) -> Option<&str> {
        self.value()?.pointer(pointer)?.as_str()
    }
}

impl From<Option<Value>> for SourcePayload {
    fn from(value: Option<Value>) -> Self {
        value.map_or(SourcePayload::Absent, SourcePayload::Present)
    }
}
