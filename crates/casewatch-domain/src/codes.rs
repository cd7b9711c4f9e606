//! Action code descriptions
//!
//! Case status payloads carry terse action codes (`currentActionCode`, and an
//! `eventCode` per timeline event). This table maps the codes we know to their
//! published descriptions. Unknown codes describe themselves.

/// Describe an action code, returning the code itself when it is unknown
///
/// # Examples
///
/// ```
/// use casewatch_domain::describe;
///
/// assert_eq!(describe("IAF"), "RECEIPT LETTER EMAILED");
/// assert_eq!(describe("ZZZZZ"), "ZZZZZ");
/// ```
pub fn describe(code: &str) -> &str {
    lookup(code.trim()).unwrap_or(code)
}

/// Look up a code without the identity fallback
pub fn lookup(code: &str) -> Option<&'static str> {
    let description = match code {
        "IAF" => "RECEIPT LETTER EMAILED",
        "DA" => "APPROVED/NOTICE ORDERED",
        "EA" => "DENIAL NOTICE ORDERED",
        _ => return None,
    };
    Some(description)
}
