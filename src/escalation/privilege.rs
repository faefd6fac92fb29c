// src/escalation/privilege.rs

//! Privilege-requirement detection policy
//!
//! The backend reports privilege problems as human-readable text, either
//! in a terminal `error` payload or buried in recent log output. The
//! phrases below are the enumerated signatures of "this needs sudo";
//! matching is case-insensitive substring, checked against the error
//! payload and a bounded trailing window of the sink. Keeping the list
//! in one place keeps the heuristic testable and swappable.

use crate::error::Error;
use crate::sink::OperationLogSink;

/// Known privilege-requirement signatures, lowercase
///
/// The first entry is the explicit marker the backend appends to error
/// payloads; the rest are raw sudo/installer messages that may surface
/// in log output before the terminal event.
pub const PRIVILEGE_PHRASES: &[&str] = &[
    "requires_sudo",
    "must be run as root",
    "requires administrator access",
    "sudo required",
    "sudo: a terminal is required to read the password",
    "sudo: a password is required",
    "either use the -s option to read from standard input",
    "configure an askpass helper",
];

/// How many trailing sink lines to scan for privilege signatures
pub const LOG_TRAILING_WINDOW: usize = 20;

/// Case-insensitive substring match against the phrase list
pub fn matches_privilege_phrase(text: &str) -> bool {
    let lowered = text.to_lowercase();
    PRIVILEGE_PHRASES.iter().any(|phrase| lowered.contains(phrase))
}

/// Classify a terminal stream failure
///
/// `PrivilegeDenied` when the payload or the sink's trailing window
/// carries a privilege signature, `OperationFailed` otherwise.
pub fn classify_failure(payload: &str, sink: &OperationLogSink) -> Error {
    let denied = matches_privilege_phrase(payload)
        || sink
            .trailing(LOG_TRAILING_WINDOW)
            .any(matches_privilege_phrase);
    if denied {
        Error::PrivilegeDenied(payload.to_string())
    } else {
        Error::OperationFailed(payload.to_string())
    }
}
