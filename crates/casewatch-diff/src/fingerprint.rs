//! Content fingerprints

use crate::canonical::canonicalize;
use casewatch_domain::{Fingerprint, SourcePayload};
use serde_json::Value;
use sha2::{Digest, Sha256};

/// Text hashed for an absent payload
///
/// No JSON serialization starts with `#`, so this can never collide with the
/// fingerprint of a real payload, `null` included.
pub const ABSENT_SENTINEL: &str = "#absent";

/// Fingerprint a source payload
pub fn fingerprint(payload: &SourcePayload) -> Fingerprint {
    match payload {
        SourcePayload::Present(value) => fingerprint_value(value),
        SourcePayload::Absent => digest(ABSENT_SENTINEL),
    }
}

/// Fingerprint a raw JSON value through its canonical form
pub fn fingerprint_value(value: &Value) -> Fingerprint {
    digest(&canonicalize(value).to_string())
}

fn digest(text: &str) -> Fingerprint {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    Fingerprint::from_hex(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_known_digest() {
        // sha256("null")
        let fp = fingerprint(&SourcePayload::Present(Value::Null));
        assert_eq!(
            fp.as_str(),
            "74234e98afe7498fb5daf1f36ac2d78acc339464f950703b8c019892f982b90b"
        );
    }

    #[test]
    fn test_key_order_insensitive() {
        let a: Value = serde_json::from_str(r#"{"statusTitle":"Received","statusText":"Details"}"#).unwrap();
        let b: Value = serde_json::from_str(r#"{"statusText":"Details","statusTitle":"Received"}"#).unwrap();
        assert_eq!(fingerprint_value(&a), fingerprint_value(&b));
    }

    #[test]
    fn test_absent_distinct_from_null_and_empty() {
        let absent = fingerprint(&SourcePayload::Absent);
        assert_ne!(absent, fingerprint(&SourcePayload::Present(Value::Null)));
        assert_ne!(absent, fingerprint(&SourcePayload::Present(json!({}))));
        assert_eq!(absent.as_str().len(), 64);
    }

    #[test]
    fn test_value_change_detected() {
        let a = json!({"status": "pending"});
        let b = json!({"status": "approved"});
        assert_ne!(fingerprint_value(&a), fingerprint_value(&b));
    }
}
