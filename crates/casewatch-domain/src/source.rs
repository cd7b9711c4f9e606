//! Sources - the fixed set of remote endpoints describing a case

use crate::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the three independent remote endpoints contributing to a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SourceId {
    /// Full case record: form, applicant, events, notices
    CaseDetails,
    /// Current status title, text, and action code
    CaseStatus,
    /// Receipt details: form, service center, receipt date
    ReceiptInfo,
}

impl SourceId {
    /// Every source, in canonical order
    pub const ALL: [SourceId; 3] = [
        SourceId::CaseDetails,
        SourceId::CaseStatus,
        SourceId::ReceiptInfo,
    ];

    /// Stable name used in persisted state and on the command line
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceId::CaseDetails => "caseDetails",
            SourceId::CaseStatus => "caseStatus",
            SourceId::ReceiptInfo => "receiptInfo",
        }
    }

    /// Human-readable label used as the diff header
    pub fn label(&self) -> &'static str {
        match self {
            SourceId::CaseDetails => "Case Details",
            SourceId::CaseStatus => "Case Status",
            SourceId::ReceiptInfo => "Receipt Info",
        }
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "caseDetails" | "case-details" | "details" => Ok(SourceId::CaseDetails),
            "caseStatus" | "case-status" | "status" => Ok(SourceId::CaseStatus),
            "receiptInfo" | "receipt-info" | "receipt" => Ok(SourceId::ReceiptInfo),
            other => Err(DomainError::UnknownSource(other.to_string())),
        }
    }
}

/// A total mapping from every [`SourceId`] to a value
///
/// Used for snapshot payloads, fingerprints, and change flags. Because every
/// source always has a slot, lookups never fail and no source can be silently
/// dropped from a record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerSource<T> {
    /// Value for [`SourceId::CaseDetails`]
    pub case_details: T,
    /// Value for [`SourceId::CaseStatus`]
    pub case_status: T,
    /// Value for [`SourceId::ReceiptInfo`]
    pub receipt_info: T,
}

impl<T> PerSource<T> {
    /// Build a mapping by evaluating `f` once per source, in canonical order
    pub fn from_fn(mut f: impl FnMut(SourceId) -> T) -> Self {
        Self {
            case_details: f(SourceId::CaseDetails),
            case_status: f(SourceId::CaseStatus),
            receipt_info: f(SourceId::ReceiptInfo),
        }
    }

    /// Value for one source
    pub fn get(&self, source: SourceId) -> &T {
        match source {
            SourceId::CaseDetails => &self.case_details,
            SourceId::CaseStatus => &self.case_status,
            SourceId::ReceiptInfo => &self.receipt_info,
        }
    }

    /// Mutable value for one source
    pub fn get_mut(&mut self, source: SourceId) -> &mut T {
        match source {
            SourceId::CaseDetails => &mut self.case_details,
            SourceId::CaseStatus => &mut self.case_status,
            SourceId::ReceiptInfo => &mut self.receipt_info,
        }
    }

    /// Iterate `(source, value)` pairs in canonical order
    pub fn iter(&self) -> impl Iterator<Item = (SourceId, &T)> + '_ {
        SourceId::ALL.into_iter().map(move |s| (s, self.get(s)))
    }

    /// Transform every value, keeping the source association
    pub fn map<U>(&self, mut f: impl FnMut(SourceId, &T) -> U) -> PerSource<U> {
        PerSource::from_fn(|s| f(s, self.get(s)))
    }
}

impl PerSource<bool> {
    /// True when at least one source is flagged
    pub fn any(&self) -> bool {
        self.case_details || self.case_status || self.receipt_info
    }

    /// Sources whose flag is set, in canonical order
    pub fn flagged(&self) -> Vec<SourceId> {
        self.iter().filter(|(_, flag)| **flag).map(|(s, _)| s).collect()
    }
}
