// src/op/driver.rs

//! Operation driver
//!
//! One entry point for executing an [`OperationRequest`]: try the push
//! stream, classify its failure, then either escalate (privilege denied,
//! at most one retry) or fall back to the synchronous endpoint
//! (connection-level failure). Every path converges on a single
//! [`OperationOutcome`]; transport- and privilege-level failures are
//! recovered here and never surface to the caller.

use crate::error::Error;
use crate::escalation::{CredentialPrompt, CredentialSession, EscalationCoordinator};
use crate::op::{OperationOutcome, OperationRequest, OperationStatus};
use crate::sink::{LogEntryKind, OperationLogSink};
use crate::transport::fallback::FallbackExecutor;
use crate::transport::push::PushTransport;
use crate::transport::BackendClient;
use tracing::{debug, warn};

pub struct OperationDriver<'a> {
    backend: &'a BackendClient,
    session: &'a mut CredentialSession,
    prompt: &'a dyn CredentialPrompt,
}

impl<'a> OperationDriver<'a> {
    pub fn new(
        backend: &'a BackendClient,
        session: &'a mut CredentialSession,
        prompt: &'a dyn CredentialPrompt,
    ) -> Self {
        Self {
            backend,
            session,
            prompt,
        }
    }

    /// Execute one operation to its final outcome
    ///
    /// `on_event` sees every line as it arrives, for live display; the
    /// same lines land in the sink and, at the end, in the outcome.
    pub fn run<F>(
        &mut self,
        request: &OperationRequest,
        sink: &mut OperationLogSink,
        mut on_event: F,
    ) -> OperationOutcome
    where
        F: FnMut(LogEntryKind, &str),
    {
        sink.clear();

        match PushTransport::new(self.backend).open(request, sink, &mut on_event) {
            Ok(()) => sink.seal(OperationStatus::Success, None),
            Err(Error::PrivilegeDenied(message)) => {
                debug!("push attempt denied for privilege: {message}");
                let mut coordinator =
                    EscalationCoordinator::new(self.backend, self.session, self.prompt);
                coordinator.resolve(request, sink, &mut on_event)
            }
            Err(Error::TransportError(message)) => {
                debug!("push transport unavailable: {message}");
                match FallbackExecutor::new(self.backend).execute(request, sink, &mut on_event) {
                    Ok(()) => sink.seal(OperationStatus::Success, None),
                    Err(e) => {
                        warn!("fallback execution failed: {e}");
                        sink.seal(OperationStatus::Failed, Some(e.detail()))
                    }
                }
            }
            Err(Error::OperationFailed(message)) => {
                sink.seal(OperationStatus::Failed, Some(message))
            }
            Err(other) => sink.seal(OperationStatus::Failed, Some(other.detail())),
        }
    }
}
