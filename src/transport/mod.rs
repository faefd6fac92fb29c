// src/transport/mod.rs

//! HTTP transports for backend operations
//!
//! Three paths, all converging on the same outcome shape:
//! - [`push::PushTransport`] opens a server-driven event stream (GET)
//! - [`retry::RetryTransport`] carries a credential in a POST body and
//!   streams the response
//! - [`fallback::FallbackExecutor`] issues one synchronous call when no
//!   stream could be established
//!
//! The push and retry transports share [`drive_stream`], which feeds raw
//! response chunks through one [`EventStreamParser`] instance; neither
//! transport parses framing on its own.

pub mod fallback;
pub mod push;
pub mod retry;

use crate::config::BackendConfig;
use crate::error::{Error, Result};
use crate::escalation::Secret;
use crate::op::OperationKind;
use crate::sink::{LogEntryKind, OperationLogSink};
use crate::stream::{EventStreamParser, StreamEventKind};
use reqwest::blocking::Client;
use std::io::Read;
use std::time::Duration;
use tracing::{debug, warn};

/// Buffer size for reading stream chunks (8 KB)
const STREAM_BUFFER_SIZE: usize = 8192;

/// HTTP client pair for one backend
///
/// Streaming requests use a client with no overall timeout (an open
/// operation stream must be allowed to run as long as the backend needs);
/// synchronous requests use a bounded one.
pub struct BackendClient {
    config: BackendConfig,
    stream_http: Client,
    rpc_http: Client,
}

impl BackendClient {
    /// Create a client pair for the configured backend
    pub fn new(config: BackendConfig) -> Result<Self> {
        config.validate()?;

        let stream_http = Client::builder()
            .timeout(None::<Duration>)
            .connect_timeout(config.connect_timeout())
            .build()
            .map_err(|e| Error::InitError(format!("failed to create stream client: {e}")))?;

        let rpc_http = Client::builder()
            .timeout(config.request_timeout())
            .connect_timeout(config.connect_timeout())
            .build()
            .map_err(|e| Error::InitError(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            config,
            stream_http,
            rpc_http,
        })
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    /// Full URL for an API path
    pub fn endpoint(&self, path: &str) -> String {
        self.config.endpoint(path)
    }

    pub(crate) fn stream_http(&self) -> &Client {
        &self.stream_http
    }

    pub(crate) fn rpc_http(&self) -> &Client {
        &self.rpc_http
    }

    /// Check a credential against the backend without running an operation
    ///
    /// Returns `Ok(false)` when the backend rejects the credential.
    pub fn validate_credential(&self, secret: &Secret) -> Result<bool> {
        let url = self.endpoint("/api/sudo/validate");
        let body = serde_json::json!({ "credential": secret.expose() });
        let response = self
            .rpc_http
            .post(&url)
            .json(&body)
            .send()
            .map_err(|e| Error::ApiError(format!("credential validation failed: {e}")))?;

        if response.status().is_success() {
            Ok(true)
        } else if response.status().as_u16() == 401 {
            debug!("backend rejected credential");
            Ok(false)
        } else {
            Err(Error::ApiError(format!(
                "credential validation returned HTTP {}",
                response.status()
            )))
        }
    }
}

/// Path of the streaming endpoint for an operation kind
pub(crate) fn stream_path(kind: OperationKind) -> String {
    format!("/api/{kind}_stream")
}

/// Path of the synchronous endpoint for an operation kind
pub(crate) fn sync_path(kind: OperationKind) -> String {
    format!("/api/{kind}")
}

/// How a driven stream ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamTermination {
    /// Terminal `end` event received
    Completed,
    /// Terminal `error` event received, with the joined payload lines
    Failed(String),
    /// Connection closed (or read failed) without a terminal event
    Disconnected { events_seen: bool },
}

/// Read a response body to its terminal event
///
/// Feeds raw chunks through a fresh parser, appending `start`/`log`
/// payloads to the sink (and echoing them to `on_event`) as they arrive.
/// On `end` the function returns immediately, dropping the reader and
/// with it the connection. On `error` it keeps draining only further
/// error lines until the backend closes the stream, so multi-line error
/// payloads survive intact.
pub(crate) fn drive_stream<R, F>(
    mut reader: R,
    sink: &mut OperationLogSink,
    on_event: &mut F,
) -> StreamTermination
where
    R: Read,
    F: FnMut(LogEntryKind, &str),
{
    let mut parser = EventStreamParser::new();
    let mut buffer = [0u8; STREAM_BUFFER_SIZE];
    let mut events_seen = false;
    let mut error_lines: Vec<String> = Vec::new();

    loop {
        let bytes_read = match reader.read(&mut buffer) {
            Ok(n) => n,
            Err(e) => {
                warn!("stream read failed: {e}");
                break;
            }
        };
        if bytes_read == 0 {
            break;
        }

        for event in parser.feed(&buffer[..bytes_read]) {
            events_seen = true;
            match event.kind {
                StreamEventKind::Start => {
                    sink.append(LogEntryKind::Start, event.payload.as_str());
                    on_event(LogEntryKind::Start, &event.payload);
                }
                StreamEventKind::Log => {
                    if error_lines.is_empty() {
                        sink.append(LogEntryKind::Log, event.payload.as_str());
                        on_event(LogEntryKind::Log, &event.payload);
                    } else {
                        debug!("ignoring log event after terminal error");
                    }
                }
                StreamEventKind::End => {
                    if error_lines.is_empty() {
                        return StreamTermination::Completed;
                    }
                    debug!("ignoring end event after terminal error");
                }
                StreamEventKind::Error => {
                    sink.append(LogEntryKind::Error, event.payload.as_str());
                    on_event(LogEntryKind::Error, &event.payload);
                    error_lines.push(event.payload);
                }
            }
        }
    }

    if !error_lines.is_empty() {
        StreamTermination::Failed(error_lines.join("\n"))
    } else {
        StreamTermination::Disconnected { events_seen }
    }
}
