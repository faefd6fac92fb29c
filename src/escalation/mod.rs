// src/escalation/mod.rs

//! Credential escalation
//!
//! When a streamed operation fails for lack of elevated privilege, the
//! [`EscalationCoordinator`] obtains a credential (session cache first,
//! interactive prompt second) and drives exactly one privileged retry.
//! It never loops: a cached secret gets one attempt, a prompted secret
//! gets one attempt, and whatever that attempt produces is final.
//!
//! The [`CredentialSession`] lives for the process only. It is mutated
//! exclusively here and read-only to the transports; secrets are never
//! written to disk and leave the process only inside a single retry
//! request body.

pub mod privilege;

use crate::op::{OperationOutcome, OperationRequest, OperationStatus};
use crate::sink::{LogEntryKind, OperationLogSink};
use crate::transport::retry::RetryTransport;
use crate::transport::BackendClient;
use std::fmt;
use tracing::{debug, info};

/// An elevated-privilege secret, redacted from all debug output
#[derive(Clone)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrow the underlying value for transmission
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

/// Session-lifetime credential cache
#[derive(Debug, Default)]
pub struct CredentialSession {
    cached: Option<Secret>,
    validated: bool,
}

impl CredentialSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cached_secret(&self) -> Option<&Secret> {
        self.cached.as_ref()
    }

    /// Cache a secret for the remainder of the session
    pub fn store(&mut self, secret: Secret) {
        self.cached = Some(secret);
        self.validated = false;
    }

    /// Record that the cached secret worked against the backend
    pub fn mark_validated(&mut self) {
        self.validated = true;
    }

    pub fn is_validated(&self) -> bool {
        self.validated
    }

    pub fn clear(&mut self) {
        self.cached = None;
        self.validated = false;
    }
}

/// Source of interactively requested credentials
///
/// `Ok(None)` means the user dismissed the prompt; that resolves the
/// operation as cancelled, not as an error.
pub trait CredentialPrompt {
    fn request_credential(&self, context: &str) -> crate::Result<Option<Secret>>;
}

/// Coordinator progress, for diagnostics and tests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscalationPhase {
    NoAttempt,
    AwaitingCredential,
    Retrying,
    Finalized,
}

/// Drives at most one privileged retry for a privilege-denied operation
pub struct EscalationCoordinator<'a> {
    backend: &'a BackendClient,
    session: &'a mut CredentialSession,
    prompt: &'a dyn CredentialPrompt,
    phase: EscalationPhase,
}

impl<'a> EscalationCoordinator<'a> {
    pub fn new(
        backend: &'a BackendClient,
        session: &'a mut CredentialSession,
        prompt: &'a dyn CredentialPrompt,
    ) -> Self {
        Self {
            backend,
            session,
            prompt,
            phase: EscalationPhase::NoAttempt,
        }
    }

    pub fn phase(&self) -> EscalationPhase {
        self.phase
    }

    /// Resolve a privilege-denied operation to its final outcome
    ///
    /// The sink is cleared before each retry attempt so its contents are
    /// purely the retry's own lines.
    pub fn resolve<F>(
        &mut self,
        request: &OperationRequest,
        sink: &mut OperationLogSink,
        on_event: &mut F,
    ) -> OperationOutcome
    where
        F: FnMut(LogEntryKind, &str),
    {
        // Step 1: a cached secret gets one silent attempt
        if let Some(secret) = self.session.cached_secret().cloned() {
            self.phase = EscalationPhase::Retrying;
            debug!("retrying with cached credential");
            sink.clear();
            match RetryTransport::new(self.backend).open(
                &request.with_credential(secret),
                sink,
                on_event,
            ) {
                Ok(()) => {
                    self.session.mark_validated();
                    self.phase = EscalationPhase::Finalized;
                    return sink.seal(OperationStatus::Success, None);
                }
                Err(e) => {
                    debug!("cached credential retry failed: {e}");
                }
            }
        }

        // Step 2: prompt exactly once
        self.phase = EscalationPhase::AwaitingCredential;
        let context = format!("The {} requires administrator privileges", request.describe());
        let secret = match self.prompt.request_credential(&context) {
            Ok(Some(secret)) => secret,
            Ok(None) => {
                info!("credential prompt dismissed, operation cancelled");
                self.phase = EscalationPhase::Finalized;
                return sink.seal(OperationStatus::Cancelled, None);
            }
            Err(e) => {
                self.phase = EscalationPhase::Finalized;
                let message = format!("credential prompt failed: {}", e.detail());
                return sink.seal(OperationStatus::Failed, Some(message));
            }
        };

        self.session.store(secret.clone());
        self.phase = EscalationPhase::Retrying;
        sink.clear();
        let outcome = match RetryTransport::new(self.backend).open(
            &request.with_credential(secret),
            sink,
            on_event,
        ) {
            Ok(()) => {
                self.session.mark_validated();
                sink.seal(OperationStatus::Success, None)
            }
            Err(e) => sink.seal(OperationStatus::Failed, Some(e.detail())),
        };
        self.phase = EscalationPhase::Finalized;
        outcome
    }
}

/// Prompt that always declines, for non-interactive callers
pub struct NoPrompt;

impl CredentialPrompt for NoPrompt {
    fn request_credential(&self, _context: &str) -> crate::Result<Option<Secret>> {
        Ok(None)
    }
}
