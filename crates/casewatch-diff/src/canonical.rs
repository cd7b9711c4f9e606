//! Canonical form of JSON payloads
//!
//! Remote APIs are free to reorder object keys between calls. Comparing the
//! canonical form instead of the raw response means a reordering never looks
//! like a content change.

use casewatch_domain::SourcePayload;
use serde_json::{Map, Value};

/// Sort every object's keys, recursively
///
/// Arrays keep their element order (it is meaningful); scalars and `null`
/// pass through unchanged. The result serializes identically for any two
/// inputs that differ only in key insertion order, and canonicalizing twice is
/// the same as canonicalizing once.
pub fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            let sorted: Map<String, Value> = entries
                .into_iter()
                .map(|(k, v)| (k.clone(), canonicalize(v)))
                .collect();
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        scalar => scalar.clone(),
    }
}

/// Multi-line display form of a payload
///
/// Present payloads render as two-space-indented canonical JSON followed by a
/// newline. An absent payload renders as an empty document, which is distinct
/// from `null\n`.
pub fn render(payload: &SourcePayload) -> String {
    match payload {
        SourcePayload::Present(value) => format!("{:#}\n", canonicalize(value)),
        SourcePayload::Absent => String::new(),
    }
}
