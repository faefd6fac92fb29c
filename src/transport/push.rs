// src/transport/push.rs

//! Push transport: server-driven operation streams
//!
//! Opens a GET event stream addressed by operation kind and target list
//! and drives it to its terminal event. This is always the first path
//! tried for an operation; it carries no credential (the retry transport
//! exists for that).

use crate::error::{Error, Result};
use crate::escalation::privilege;
use crate::op::OperationRequest;
use crate::sink::{LogEntryKind, OperationLogSink};
use crate::transport::{drive_stream, stream_path, BackendClient, StreamTermination};
use reqwest::header::ACCEPT;
use tracing::{debug, info};

pub struct PushTransport<'a> {
    backend: &'a BackendClient,
}

impl<'a> PushTransport<'a> {
    pub fn new(backend: &'a BackendClient) -> Self {
        Self { backend }
    }

    /// Run one operation over a server-driven stream
    ///
    /// `Ok(())` on a terminal `end` event. Errors classify the failure:
    /// `TransportError` when the stream could not be established at all
    /// (connect failure, non-2xx status, close before any event),
    /// `PrivilegeDenied` when the terminal error or the sink's trailing
    /// window carries a privilege signature, `OperationFailed` otherwise.
    /// The connection is dropped on any terminal resolution.
    pub fn open<F>(
        &self,
        request: &OperationRequest,
        sink: &mut OperationLogSink,
        on_event: &mut F,
    ) -> Result<()>
    where
        F: FnMut(LogEntryKind, &str),
    {
        let url = self.backend.endpoint(&stream_path(request.kind()));
        let (formulae, casks) = request.target_names();
        let mut query: Vec<(&str, &str)> = Vec::new();
        for name in formulae {
            query.push(("formulae", name));
        }
        for name in casks {
            query.push(("casks", name));
        }

        info!("opening {} stream for {}", request.kind(), request.describe());
        let response = self
            .backend
            .stream_http()
            .get(&url)
            .header(ACCEPT, "text/event-stream")
            .query(&query)
            .send()
            .map_err(|e| Error::TransportError(format!("failed to open event stream: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::TransportError(format!("HTTP {status} from {url}")));
        }

        match drive_stream(response, sink, on_event) {
            StreamTermination::Completed => {
                debug!("stream completed for {}", request.describe());
                Ok(())
            }
            StreamTermination::Failed(payload) => Err(privilege::classify_failure(&payload, sink)),
            StreamTermination::Disconnected { events_seen: false } => Err(Error::TransportError(
                "stream closed before any event arrived".to_string(),
            )),
            StreamTermination::Disconnected { events_seen: true } => Err(Error::OperationFailed(
                "stream ended before a terminal event".to_string(),
            )),
        }
    }
}
