//! Human-readable summary of a stored case.
//!
//! Reads a handful of well-known fields from the latest snapshot. Every field
//! is optional: a source that was absent or a payload with an unexpected shape
//! just leaves blanks.

use casewatch_domain::{describe, SourceId, SourcePayload, VersionRecord};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Summary of the latest observation of a case.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CaseSummary {
    pub receipt_number: String,
    pub form_type: Option<String>,
    pub form_name: Option<String>,
    pub applicant_name: Option<String>,
    pub status_title: Option<String>,
    pub action_code: Option<String>,
    pub action_description: Option<String>,
    pub action_date: Option<String>,
    pub receipt_location: Option<String>,
    pub receipt_date: Option<String>,
    pub changed_sources: Vec<String>,
    pub last_observed_at: Option<DateTime<Utc>>,
    pub timeline: Vec<TimelineEvent>,
}

/// One event from the case timeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineEvent {
    pub code: String,
    pub description: String,
    pub date: Option<String>,
}

impl CaseSummary {
    /// Build a summary from a stored record.
    pub fn from_record(record: &VersionRecord) -> Self {
        let details = record.current.payload(SourceId::CaseDetails);
        let status = record.current.payload(SourceId::CaseStatus);
        let receipt = record.current.payload(SourceId::ReceiptInfo);

        let action_code = text(status, "/currentActionCode");
        let action_description = action_code.as_deref().map(|code| describe(code).to_string());

        Self {
            receipt_number: record.entity_id.to_string(),
            form_type: Some(record.current.form_label()).filter(|label| !label.is_empty()),
            form_name: text(details, "/formName"),
            applicant_name: text(details, "/applicantName"),
            status_title: text(status, "/statusTitle"),
            action_code,
            action_description,
            action_date: text(status, "/currentActionCodeDate"),
            receipt_location: text(receipt, "/receipt_details/location"),
            receipt_date: text(receipt, "/receipt_details/receipt_date"),
            changed_sources: record
                .change_flags
                .flagged()
                .into_iter()
                .map(|s| s.label().to_string())
                .collect(),
            last_observed_at: Some(record.last_observed_at),
            timeline: timeline(details),
        }
    }

    /// Label/value rows for table output, skipping blank fields.
    pub fn rows(&self) -> Vec<(&'static str, String)> {
        let action = match (&self.action_code, &self.action_description) {
            (Some(code), Some(desc)) if code != desc => Some(format!("{} - {}", code, desc)),
            (Some(code), _) => Some(code.clone()),
            _ => None,
        };
        let changed = if self.changed_sources.is_empty() {
            None
        } else {
            Some(self.changed_sources.join(", "))
        };

        [
            ("Receipt", Some(self.receipt_number.clone())),
            ("Form", self.form_type.clone()),
            ("Form name", self.form_name.clone()),
            ("Applicant", self.applicant_name.clone()),
            ("Status", self.status_title.clone()),
            ("Action", action),
            ("Action date", self.action_date.clone()),
            ("Location", self.receipt_location.clone()),
            ("Receipt date", self.receipt_date.clone()),
            ("Changed", changed),
            ("Observed", self.last_observed_at.map(|t| t.to_rfc3339())),
        ]
        .into_iter()
        .filter_map(|(label, value)| value.map(|v| (label, v)))
        .collect()
    }
}

fn text(payload: &SourcePayload, pointer: &str) -> Option<String> {
    payload.str_at(pointer).map(str::to_string)
}

fn timeline(details: &SourcePayload) -> Vec<TimelineEvent> {
    let Some(events) = details.value().and_then(|v| v.pointer("/events")).and_then(|v| v.as_array()) else {
        return Vec::new();
    };

    events
        .iter()
        .filter_map(|event| {
            let code = event.get("eventCode")?.as_str()?;
            Some(TimelineEvent {
                code: code.to_string(),
                description: describe(code).to_string(),
                date: event
                    .get("eventDateTime")
                    .and_then(|d| d.as_str())
                    .map(str::to_string),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use casewatch_domain::{EntityId, Fingerprint, PerSource, Snapshot};
    use serde_json::json;

    fn record(status: SourcePayload) -> VersionRecord {
        let mut change_flags = PerSource::default();
        change_flags.case_status = true;
        VersionRecord {
            entity_id: EntityId::new("IOE0000000001").unwrap(),
            current: Snapshot::new(
                PerSource {
                    case_details: SourcePayload::Present(json!({
                        "formType": "I-485",
                        "formName": "Application to Register Permanent Residence",
                        "applicantName": "Jane Doe",
                        "events": [
                            {"eventCode": "IAF", "eventDateTime": "2026-01-02T10:00:00Z"},
                            {"eventCode": "XYZ"},
                            {"noCode": true}
                        ]
                    })),
                    case_status: status,
                    receipt_info: SourcePayload::Absent,
                },
                Utc::now(),
            ),
            previous: None,
            fingerprints: PerSource::from_fn(|s| Fingerprint::from_hex(s.as_str())),
            change_flags,
            last_observed_at: Utc::now(),
        }
    }

    #[test]
    fn test_summary_fields() {
        let summary = CaseSummary::from_record(&record(SourcePayload::Present(json!({
            "statusTitle": "Case Was Approved",
            "currentActionCode": "DA",
            "currentActionCodeDate": "2026-03-01"
        }))));

        assert_eq!(summary.form_type.as_deref(), Some("I-485"));
        assert_eq!(summary.applicant_name.as_deref(), Some("Jane Doe"));
        assert_eq!(summary.status_title.as_deref(), Some("Case Was Approved"));
        assert_eq!(summary.action_description.as_deref(), Some("APPROVED/NOTICE ORDERED"));
        assert_eq!(summary.changed_sources, vec!["Case Status".to_string()]);
        assert!(summary.receipt_location.is_none());

        assert_eq!(summary.timeline.len(), 2);
        assert_eq!(summary.timeline[0].description, "RECEIPT LETTER EMAILED");
        assert_eq!(summary.timeline[1].description, "XYZ");
        assert!(summary.timeline[1].date.is_none());
    }

    #[test]
    fn test_rows_skip_blanks() {
        let summary = CaseSummary::from_record(&record(SourcePayload::Absent));
        let rows = summary.rows();
        let labels: Vec<&str> = rows.iter().map(|(l, _)| *l).collect();

        assert!(labels.contains(&"Receipt"));
        assert!(labels.contains(&"Form"));
        assert!(!labels.contains(&"Status"));
        assert!(!labels.contains(&"Action"));
    }

    #[test]
    fn test_unknown_action_code_shown_once() {
        let summary = CaseSummary::from_record(&record(SourcePayload::Present(json!({
            "currentActionCode": "QQ"
        }))));
        let rows = summary.rows();
        let action = rows.iter().find(|(l, _)| *l == "Action").unwrap();
        assert_eq!(action.1, "QQ");
    }
}
