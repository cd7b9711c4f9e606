//! Casewatch canonical form, fingerprints, and diffs
//!
//! Everything that decides whether two payloads are "the same" lives here, so
//! the change detector and the diff renderer can never disagree.
//!
//! # Architecture
//!
//! - [`canonicalize`]: sort object keys at every depth, leave arrays alone
//! - [`fingerprint`]: SHA-256 over the compact canonical serialization
//! - [`diff`]: line diff over the pretty canonical serialization, with a
//!   unified text form and a side-by-side pairing
//!
//! # Examples
//!
//! ```
//! use casewatch_diff::{diff, fingerprint};
//! use casewatch_domain::SourcePayload;
//! use serde_json::json;
//!
//! let a = SourcePayload::Present(json!({"status": "pending", "date": "2026-01-01"}));
//! let b = SourcePayload::Present(json!({"date": "2026-01-01", "status": "pending"}));
//! assert_eq!(fingerprint(&a), fingerprint(&b));
//! assert!(diff("Case Status", &a, &b).is_none());
//! ```

#![warn(missing_docs)]

pub mod canonical;
pub mod diff;
pub mod fingerprint;

pub use canonical::{canonicalize, render};
pub use diff::{diff, side_by_side, Hunk, LineOp, LinePair, LineTag, OpKind, UnifiedDiff};
pub use fingerprint::{fingerprint, fingerprint_value, ABSENT_SENTINEL};
