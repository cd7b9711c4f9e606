//! Change detection against stored fingerprints

use casewatch_diff::fingerprint;
use casewatch_domain::{Fingerprint, PerSource, Snapshot};

/// Fingerprints of a new snapshot and which sources changed
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    /// Per-source change flags
    pub change_flags: PerSource<bool>,
    /// Fingerprints of the new snapshot
    pub fingerprints: PerSource<Fingerprint>,
}

/// Compare a snapshot with the fingerprints stored for the previous one
///
/// A source is flagged only when a prior fingerprint exists and differs. With
/// no prior record nothing is flagged. An absent payload has its own
/// fingerprint, so a source that stops answering counts as a change.
pub fn detect(prior: Option<&PerSource<Fingerprint>>, snapshot: &Snapshot) -> Detection {
    let fingerprints = snapshot.payloads.map(|_, payload| fingerprint(payload));
    let change_flags = fingerprints.map(|source, new| {
        prior.is_some_and(|prior| prior.get(source) != new)
    });

    Detection {
        change_flags,
        fingerprints,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use casewatch_domain::{SourceId, SourcePayload};
    use chrono::Utc;
    use serde_json::json;

    fn snapshot(status: SourcePayload) -> Snapshot {
        Snapshot::new(
            PerSource {
                case_details: SourcePayload::Present(json!({"formType": "I-485"})),
                case_status: status,
                receipt_info: SourcePayload::Present(json!({"a": [1, 2]})),
            },
            Utc::now(),
        )
    }

    #[test]
    fn test_no_prior_flags_nothing() {
        let d = detect(None, &snapshot(SourcePayload::Present(json!("x"))));
        assert!(!d.change_flags.any());
    }

    #[test]
    fn test_single_source_change() {
        let first = detect(None, &snapshot(SourcePayload::Present(json!({"s": 1}))));
        let second = detect(
            Some(&first.fingerprints),
            &snapshot(SourcePayload::Present(json!({"s": 2}))),
        );
        assert_eq!(second.change_flags.flagged(), vec![SourceId::CaseStatus]);
    }

    #[test]
    fn test_key_order_is_not_a_change() {
        let first = detect(None, &snapshot(SourcePayload::Present(json!({"a": 1, "b": 2}))));
        let reordered: serde_json::Value = serde_json::from_str(r#"{"b": 2, "a": 1}"#).unwrap();
        let second = detect(Some(&first.fingerprints), &snapshot(SourcePayload::Present(reordered)));
        assert!(!second.change_flags.any());
    }

    #[test]
    fn test_absent_after_present_is_a_change() {
        let first = detect(None, &snapshot(SourcePayload::Present(json!(null))));
        let second = detect(Some(&first.fingerprints), &snapshot(SourcePayload::Absent));
        assert!(second.change_flags.case_status);
        assert!(!second.change_flags.case_details);
    }
}
