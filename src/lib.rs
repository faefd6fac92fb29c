// src/lib.rs

//! Cellarman
//!
//! Client for a local Homebrew-manager backend. Long-running package
//! operations (install, uninstall, upgrade, metadata update) run over a
//! live event stream; when no stream can be established the client
//! degrades to a synchronous call, and when an operation fails for lack
//! of elevated privilege it re-authenticates and retries exactly once.
//!
//! # Architecture
//!
//! - One stream parser shared by both streaming transports
//! - Push (GET) stream first, privileged retry (POST) on escalation,
//!   synchronous fallback when no stream could be opened
//! - Every path converges on a single `OperationOutcome`
//! - Session-scoped credential cache, mutated only by the escalation
//!   coordinator

pub mod api;
pub mod binder;
pub mod config;
mod error;
pub mod escalation;
pub mod op;
pub mod sink;
pub mod stream;
pub mod transport;

pub use config::BackendConfig;
pub use error::{Error, Result};
pub use escalation::{
    CredentialPrompt, CredentialSession, EscalationCoordinator, EscalationPhase, NoPrompt, Secret,
};
pub use op::driver::OperationDriver;
pub use op::{
    OperationKind, OperationOutcome, OperationRequest, OperationStatus, PackageKind, Target,
};
pub use sink::{LogEntry, LogEntryKind, OperationLogSink};
pub use stream::{EventStreamParser, StreamEvent, StreamEventKind};
pub use transport::BackendClient;
