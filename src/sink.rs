// src/sink.rs

//! Operation log sink
//!
//! Accumulates ordered log lines for display while an operation runs.
//! The order observed here is the arrival order from whichever transport
//! produced the outcome; the driver clears the sink between a failed
//! attempt and a privileged retry so lines from distinct attempts never
//! interleave. On terminal resolution the transient per-step lines are
//! replaced by a single status line (see [`OperationLogSink::seal`]),
//! which keeps repeated operations from accumulating unbounded progress
//! text over a session.

use crate::op::{OperationOutcome, OperationStatus};

/// Kind of a sink entry, mirroring the stream event names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogEntryKind {
    Start,
    Log,
    Error,
    End,
}

/// One displayed line
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub kind: LogEntryKind,
    pub text: String,
}

/// Ordered accumulator for operation progress lines
#[derive(Debug, Default)]
pub struct OperationLogSink {
    entries: Vec<LogEntry>,
}

impl OperationLogSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all entries (used between escalation attempts)
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Append one line, preserving insertion order
    pub fn append(&mut self, kind: LogEntryKind, text: impl Into<String>) {
        self.entries.push(LogEntry {
            kind,
            text: text.into(),
        });
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// All line texts in insertion order
    pub fn lines(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.text.clone()).collect()
    }

    /// The most recent `n` line texts, for privilege detection
    pub fn trailing(&self, n: usize) -> impl Iterator<Item = &str> {
        self.entries.iter().rev().take(n).map(|e| e.text.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Replace all transient entries with a single terminal status line
    pub fn conclude(&mut self, status_line: &str) {
        self.entries.clear();
        self.append(LogEntryKind::End, status_line);
    }

    /// Capture the accumulated lines into an outcome, then conclude
    pub fn seal(
        &mut self,
        status: OperationStatus,
        error_message: Option<String>,
    ) -> OperationOutcome {
        let log_lines = self.lines();
        let status_line = match (&status, &error_message) {
            (OperationStatus::Success, _) => "Operation complete".to_string(),
            (OperationStatus::Failed, Some(message)) => format!("Operation failed: {message}"),
            (OperationStatus::Failed, None) => "Operation failed".to_string(),
            (OperationStatus::Cancelled, _) => "Operation cancelled".to_string(),
        };
        self.conclude(&status_line);
        OperationOutcome {
            status,
            log_lines,
            error_message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insertion_order_preserved() {
        let mut sink = OperationLogSink::new();
        sink.append(LogEntryKind::Start, "Installing wget (formula)...");
        sink.append(LogEntryKind::Log, "Fetching");
        sink.append(LogEntryKind::Log, "Linking");

        assert_eq!(
            sink.lines(),
            vec!["Installing wget (formula)...", "Fetching", "Linking"]
        );
    }

    #[test]
    fn test_trailing_window_is_bounded() {
        let mut sink = OperationLogSink::new();
        for i in 0..50 {
            sink.append(LogEntryKind::Log, format!("line {i}"));
        }

        let trailing: Vec<&str> = sink.trailing(20).collect();
        assert_eq!(trailing.len(), 20);
        assert_eq!(trailing[0], "line 49");
        assert_eq!(trailing[19], "line 30");
    }

    #[test]
    fn test_seal_captures_then_concludes() {
        let mut sink = OperationLogSink::new();
        sink.append(LogEntryKind::Start, "Upgrading...");
        sink.append(LogEntryKind::Log, "step one");

        let outcome = sink.seal(OperationStatus::Success, None);
        assert_eq!(outcome.log_lines, vec!["Upgrading...", "step one"]);

        // Only the terminal status line remains for display
        assert_eq!(sink.len(), 1);
        assert_eq!(sink.entries()[0].kind, LogEntryKind::End);
        assert_eq!(sink.entries()[0].text, "Operation complete");
    }

    #[test]
    fn test_seal_failed_carries_message() {
        let mut sink = OperationLogSink::new();
        sink.append(LogEntryKind::Error, "No such formula");

        let outcome = sink.seal(OperationStatus::Failed, Some("No such formula".to_string()));
        assert_eq!(outcome.status, OperationStatus::Failed);
        assert_eq!(outcome.error_message.as_deref(), Some("No such formula"));
        assert_eq!(sink.entries()[0].text, "Operation failed: No such formula");
    }

    #[test]
    fn test_cancelled_seal_leaves_no_error_entry() {
        let mut sink = OperationLogSink::new();
        sink.append(LogEntryKind::Log, "partial output");

        let outcome = sink.seal(OperationStatus::Cancelled, None);
        assert!(outcome.is_cancelled());
        assert!(outcome.error_message.is_none());
        assert!(sink.entries().iter().all(|e| e.kind != LogEntryKind::Error));
    }

    #[test]
    fn test_clear_between_attempts() {
        let mut sink = OperationLogSink::new();
        sink.append(LogEntryKind::Log, "first attempt");
        sink.clear();
        sink.append(LogEntryKind::Log, "retry");

        assert_eq!(sink.lines(), vec!["retry"]);
    }
}
