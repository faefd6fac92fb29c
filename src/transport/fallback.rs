// src/transport/fallback.rs

//! Fallback executor: one synchronous call when streaming is unavailable
//!
//! Entered only when the push transport failed at the connection level,
//! never for an operation that merely reported failure. The backend runs
//! the whole operation and answers once, with either a flat log blob or
//! named log blocks; each non-empty line lands in the sink in block
//! order (combined, then formulae, then casks).

use crate::error::{Error, Result};
use crate::op::OperationRequest;
use crate::sink::{LogEntryKind, OperationLogSink};
use crate::transport::{sync_path, BackendClient};
use serde::Deserialize;
use tracing::info;

#[derive(Debug, Deserialize)]
struct SyncResponse {
    #[serde(default)]
    ok: Option<bool>,
    #[serde(default)]
    log: Option<String>,
    #[serde(default)]
    logs: Option<SyncLogs>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct SyncLogs {
    #[serde(default)]
    combined: Option<String>,
    #[serde(default)]
    formulae: Option<String>,
    #[serde(default)]
    casks: Option<String>,
}

impl SyncResponse {
    /// Log blocks in their defined order
    fn blocks(&self) -> Vec<&str> {
        let mut blocks = Vec::new();
        if let Some(log) = &self.log {
            blocks.push(log.as_str());
        }
        if let Some(logs) = &self.logs {
            for block in [&logs.combined, &logs.formulae, &logs.casks] {
                if let Some(text) = block {
                    blocks.push(text.as_str());
                }
            }
        }
        blocks
    }
}

pub struct FallbackExecutor<'a> {
    backend: &'a BackendClient,
}

impl<'a> FallbackExecutor<'a> {
    pub fn new(backend: &'a BackendClient) -> Self {
        Self { backend }
    }

    /// Run the operation through the synchronous endpoint
    ///
    /// `Ok(())` unless the response signals an application-level error,
    /// which maps to `OperationFailed` with the server-supplied message.
    pub fn execute<F>(
        &self,
        request: &OperationRequest,
        sink: &mut OperationLogSink,
        on_event: &mut F,
    ) -> Result<()>
    where
        F: FnMut(LogEntryKind, &str),
    {
        let url = self.backend.endpoint(&sync_path(request.kind()));
        let (formulae, casks) = request.target_names();
        let body = serde_json::json!({
            "targetsByKind": {
                "formulae": formulae,
                "casks": casks,
            },
        });

        info!("falling back to synchronous {} call", request.kind());
        let response = self
            .backend
            .rpc_http()
            .post(&url)
            .json(&body)
            .send()
            .map_err(|e| Error::TransportError(format!("synchronous call failed: {e}")))?;

        let status = response.status();
        let text = response
            .text()
            .map_err(|e| Error::TransportError(format!("failed to read response: {e}")))?;
        let parsed: SyncResponse = serde_json::from_str(&text).map_err(|e| {
            if status.is_success() {
                Error::ParseError(format!("failed to parse response from {url}: {e}"))
            } else {
                Error::OperationFailed(format!("backend returned HTTP {status}"))
            }
        })?;

        if parsed.ok == Some(false) || parsed.error.is_some() || !status.is_success() {
            let message = parsed
                .error
                .unwrap_or_else(|| format!("backend returned HTTP {status}"));
            return Err(Error::OperationFailed(message));
        }

        for block in parsed.blocks() {
            for line in block.lines().filter(|l| !l.trim().is_empty()) {
                sink.append(LogEntryKind::Log, line);
                on_event(LogEntryKind::Log, line);
            }
        }
        Ok(())
    }
}
