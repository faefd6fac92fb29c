// src/transport/retry.rs

//! Retry transport: privileged re-execution over a POST stream
//!
//! The push mechanism cannot carry a request body, and the credential
//! must travel in one; so the escalation retry POSTs the same logical
//! targets plus the credential and reads the response body as raw
//! chunks through the shared stream parser. Event semantics match the
//! push transport, but every failure here is final: this transport is
//! only ever entered as the single allowed retry.

use crate::error::{Error, Result};
use crate::op::OperationRequest;
use crate::sink::{LogEntryKind, OperationLogSink};
use crate::transport::{drive_stream, stream_path, BackendClient, StreamTermination};
use reqwest::header::ACCEPT;
use tracing::{debug, info};

pub struct RetryTransport<'a> {
    backend: &'a BackendClient,
}

impl<'a> RetryTransport<'a> {
    pub fn new(backend: &'a BackendClient) -> Self {
        Self { backend }
    }

    /// Run one privileged attempt; the request must carry a credential
    pub fn open<F>(
        &self,
        request: &OperationRequest,
        sink: &mut OperationLogSink,
        on_event: &mut F,
    ) -> Result<()>
    where
        F: FnMut(LogEntryKind, &str),
    {
        let secret = request.credential().ok_or_else(|| {
            Error::InvalidRequest("privileged retry requires a credential".to_string())
        })?;

        let url = self.backend.endpoint(&stream_path(request.kind()));
        let (formulae, casks) = request.target_names();
        let body = serde_json::json!({
            "targetsByKind": {
                "formulae": formulae,
                "casks": casks,
            },
            "credential": secret.expose(),
        });

        info!("opening privileged {} stream", request.kind());
        let response = self
            .backend
            .stream_http()
            .post(&url)
            .header(ACCEPT, "text/event-stream")
            .json(&body)
            .send()
            .map_err(|e| Error::OperationFailed(format!("privileged retry failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::OperationFailed(format!(
                "privileged retry returned HTTP {status}"
            )));
        }

        match drive_stream(response, sink, on_event) {
            StreamTermination::Completed => {
                debug!("privileged retry completed");
                Ok(())
            }
            StreamTermination::Failed(payload) => Err(Error::OperationFailed(payload)),
            StreamTermination::Disconnected { .. } => Err(Error::OperationFailed(
                "retry stream ended before a terminal event".to_string(),
            )),
        }
    }
}
