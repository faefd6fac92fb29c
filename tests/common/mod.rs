// tests/common/mod.rs

//! Scripted mock backend for transport tests
//!
//! Serves one scripted response per accepted connection, in order, and
//! records every request it saw. Event-stream responses are written
//! frame by frame with explicit flushes; all responses close the
//! connection so the client never reuses one.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::thread::{self, JoinHandle};

/// One request as seen by the mock
#[derive(Debug)]
pub struct ReceivedRequest {
    pub method: String,
    /// Request target including the query string
    pub target: String,
    pub body: String,
}

/// What to answer on one connection
pub enum ScriptedResponse {
    /// `text/event-stream` body, one write+flush per chunk
    EventStream(Vec<String>),
    /// JSON body with the given status
    Json { status: u16, body: String },
    /// Bare status line with an empty body
    Status(u16),
}

/// Build one event-stream frame the way the backend frames them:
/// one `event:` line, one `data:` line per payload line.
pub fn event_frame(name: &str, payload: &str) -> String {
    let mut frame = format!("event: {name}\n");
    let mut lines = payload.lines().peekable();
    if lines.peek().is_none() {
        frame.push_str("data: \n");
    }
    for line in lines {
        frame.push_str(&format!("data: {line}\n"));
    }
    frame.push('\n');
    frame
}

/// Build a whole scripted stream from (event, payload) pairs
pub fn sse(frames: &[(&str, &str)]) -> ScriptedResponse {
    ScriptedResponse::EventStream(
        frames
            .iter()
            .map(|(name, payload)| event_frame(name, payload))
            .collect(),
    )
}

pub struct MockBackend {
    pub base_url: String,
    handle: JoinHandle<Vec<ReceivedRequest>>,
}

impl MockBackend {
    /// Spawn a mock that serves exactly one response per script entry
    pub fn serve(script: Vec<ScriptedResponse>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("failed to bind mock backend");
        let addr = listener.local_addr().unwrap();

        let handle = thread::spawn(move || {
            let mut received = Vec::new();
            for response in script {
                let (stream, _) = listener.accept().expect("mock backend accept failed");
                received.push(handle_connection(stream, response));
            }
            received
        });

        Self {
            base_url: format!("http://{addr}"),
            handle,
        }
    }

    /// Wait for the whole script to be consumed and return the requests
    pub fn finish(self) -> Vec<ReceivedRequest> {
        self.handle.join().expect("mock backend thread panicked")
    }
}

fn handle_connection(stream: TcpStream, response: ScriptedResponse) -> ReceivedRequest {
    let mut reader = BufReader::new(stream.try_clone().expect("failed to clone mock stream"));

    let mut request_line = String::new();
    reader.read_line(&mut request_line).unwrap();
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or("").to_string();
    let target = parts.next().unwrap_or("").to_string();

    let mut content_length = 0usize;
    loop {
        let mut header = String::new();
        reader.read_line(&mut header).unwrap();
        let header = header.trim_end();
        if header.is_empty() {
            break;
        }
        if let Some((key, value)) = header.split_once(':') {
            if key.trim().eq_ignore_ascii_case("content-length") {
                content_length = value.trim().parse().unwrap_or(0);
            }
        }
    }

    let mut body_bytes = vec![0u8; content_length];
    if content_length > 0 {
        reader.read_exact(&mut body_bytes).unwrap();
    }
    let body = String::from_utf8_lossy(&body_bytes).into_owned();

    let mut stream = stream;
    match response {
        ScriptedResponse::EventStream(chunks) => {
            let head = "HTTP/1.1 200 OK\r\n\
                 Content-Type: text/event-stream\r\n\
                 Cache-Control: no-cache\r\n\
                 Connection: close\r\n\r\n";
            let _ = stream.write_all(head.as_bytes());
            for chunk in chunks {
                if stream.write_all(chunk.as_bytes()).is_err() {
                    break;
                }
                let _ = stream.flush();
            }
        }
        ScriptedResponse::Json { status, body } => {
            let head = format!(
                "HTTP/1.1 {status} STATUS\r\n\
                 Content-Type: application/json; charset=utf-8\r\n\
                 Content-Length: {}\r\n\
                 Connection: close\r\n\r\n",
                body.len()
            );
            let _ = stream.write_all(head.as_bytes());
            let _ = stream.write_all(body.as_bytes());
        }
        ScriptedResponse::Status(status) => {
            let head = format!(
                "HTTP/1.1 {status} STATUS\r\n\
                 Content-Length: 0\r\n\
                 Connection: close\r\n\r\n"
            );
            let _ = stream.write_all(head.as_bytes());
        }
    }
    let _ = stream.flush();

    ReceivedRequest {
        method,
        target,
        body,
    }
}
