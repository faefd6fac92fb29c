// src/stream.rs

//! Incremental event-stream parser
//!
//! Turns a raw chunk sequence of `event:`/`data:` framed text into named
//! events. Chunks may split anywhere, including inside a line or a UTF-8
//! sequence, so the parser keeps a byte buffer and only decodes complete
//! lines. One parser instance serves one request; both the push and the
//! retry transport drive their response bodies through this type.
//!
//! A block of one `event:` line followed by several `data:` lines yields
//! one event per data line, all under the block's event name. Comment
//! lines (`:` prefix) and blank separator lines are consumed silently.

use tracing::debug;

/// Event names used by the backend's operation streams
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamEventKind {
    /// A new phase of the operation began
    Start,
    /// One line of progress output
    Log,
    /// Terminal: the operation completed successfully
    End,
    /// Terminal: the operation failed
    Error,
}

impl StreamEventKind {
    /// Map a wire event name to a kind, if it is one we understand
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "start" => Some(Self::Start),
            "log" => Some(Self::Log),
            "end" => Some(Self::End),
            "error" => Some(Self::Error),
            _ => None,
        }
    }

    /// True for `end` and `error`, the events that close a stream
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::End | Self::Error)
    }
}

/// A single named event from an operation stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamEvent {
    pub kind: StreamEventKind,
    pub payload: String,
}

/// Stateful line/event parser, restartable per request
#[derive(Debug, Default)]
pub struct EventStreamParser {
    /// Bytes of the current incomplete line
    buffer: Vec<u8>,
    /// Event name from the most recent `event:` line
    pending_event: Option<String>,
}

impl EventStreamParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one raw chunk, returning the events completed by it
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<StreamEvent> {
        self.buffer.extend_from_slice(chunk);

        let mut events = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line_bytes: Vec<u8> = self.buffer.drain(..=pos).collect();
            // Drop the terminator and any preceding carriage return
            let mut end = line_bytes.len() - 1;
            if end > 0 && line_bytes[end - 1] == b'\r' {
                end -= 1;
            }
            let line = String::from_utf8_lossy(&line_bytes[..end]).into_owned();
            self.consume_line(&line, &mut events);
        }
        events
    }

    /// Convenience wrapper for text chunks
    pub fn feed_str(&mut self, chunk: &str) -> Vec<StreamEvent> {
        self.feed(chunk.as_bytes())
    }

    fn consume_line(&mut self, line: &str, out: &mut Vec<StreamEvent>) {
        if line.is_empty() {
            // Block separator
            return;
        }
        if line.starts_with(':') {
            // Comment/keepalive
            return;
        }
        if let Some(name) = line.strip_prefix("event:") {
            self.pending_event = Some(name.trim().to_string());
            return;
        }
        if let Some(rest) = line.strip_prefix("data:") {
            let payload = rest.strip_prefix(' ').unwrap_or(rest);
            match &self.pending_event {
                Some(name) => match StreamEventKind::from_name(name) {
                    Some(kind) => out.push(StreamEvent {
                        kind,
                        payload: payload.to_string(),
                    }),
                    None => debug!(event = %name, "dropping event with unknown name"),
                },
                None => debug!("dropping data line with no preceding event name"),
            }
            return;
        }
        debug!(%line, "ignoring unrecognized stream line");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log(payload: &str) -> StreamEvent {
        StreamEvent {
            kind: StreamEventKind::Log,
            payload: payload.to_string(),
        }
    }

    #[test]
    fn test_single_event() {
        let mut parser = EventStreamParser::new();
        let events = parser.feed_str("event: log\ndata: hello\n\n");
        assert_eq!(events, vec![log("hello")]);
    }

    #[test]
    fn test_chunk_split_inside_payload() {
        let mut parser = EventStreamParser::new();
        assert!(parser.feed_str("event: log\ndata: hel").is_empty());
        let events = parser.feed_str("lo\n");
        assert_eq!(events, vec![log("hello")]);
    }

    #[test]
    fn test_chunk_split_inside_prefix() {
        let mut parser = EventStreamParser::new();
        assert!(parser.feed_str("eve").is_empty());
        assert!(parser.feed_str("nt: start\nda").is_empty());
        let events = parser.feed_str("ta: Installing wget\n");
        assert_eq!(
            events,
            vec![StreamEvent {
                kind: StreamEventKind::Start,
                payload: "Installing wget".to_string(),
            }]
        );
    }

    #[test]
    fn test_multi_line_block_emits_per_data_line() {
        let mut parser = EventStreamParser::new();
        let events = parser.feed_str("event: log\ndata: first\ndata: second\n\n");
        assert_eq!(events, vec![log("first"), log("second")]);
    }

    #[test]
    fn test_event_name_persists_until_replaced() {
        let mut parser = EventStreamParser::new();
        let events = parser.feed_str(
            "event: start\ndata: begin\n\nevent: log\ndata: a\n\ndata: b\n\n",
        );
        assert_eq!(events.len(), 3);
        assert_eq!(events[0].kind, StreamEventKind::Start);
        assert_eq!(events[1], log("a"));
        // Data after a separator, with no new event line, keeps the last name
        assert_eq!(events[2], log("b"));
    }

    #[test]
    fn test_crlf_terminators() {
        let mut parser = EventStreamParser::new();
        let events = parser.feed_str("event: end\r\ndata: ok\r\n\r\n");
        assert_eq!(
            events,
            vec![StreamEvent {
                kind: StreamEventKind::End,
                payload: "ok".to_string(),
            }]
        );
    }

    #[test]
    fn test_unknown_event_name_dropped() {
        let mut parser = EventStreamParser::new();
        let events = parser.feed_str("event: heartbeat\ndata: tick\n\nevent: log\ndata: x\n");
        assert_eq!(events, vec![log("x")]);
    }

    #[test]
    fn test_comment_and_orphan_data_ignored() {
        let mut parser = EventStreamParser::new();
        let events = parser.feed_str(": keepalive\ndata: orphan\n");
        assert!(events.is_empty());
    }

    #[test]
    fn test_payload_preserves_inner_whitespace() {
        let mut parser = EventStreamParser::new();
        let events = parser.feed_str("event: log\ndata:   indented output\n");
        assert_eq!(events, vec![log("  indented output")]);
    }

    #[test]
    fn test_multibyte_payload_split_across_chunks() {
        let mut parser = EventStreamParser::new();
        let bytes = "event: log\ndata: caf\u{00e9}\n".as_bytes();
        // Split inside the two-byte e-acute sequence
        let split = bytes.len() - 2;
        assert!(parser.feed(&bytes[..split]).is_empty());
        let events = parser.feed(&bytes[split..]);
        assert_eq!(events, vec![log("caf\u{00e9}")]);
    }
}
