// tests/escalation.rs

//! Integration tests for privilege escalation: cached-credential retry,
//! single interactive prompt, and silent cancellation.

mod common;

use cellarman::{
    BackendClient, BackendConfig, CredentialPrompt, CredentialSession, LogEntryKind,
    OperationDriver, OperationLogSink, OperationOutcome, OperationRequest, OperationStatus,
    Secret, Target,
};
use common::{sse, MockBackend, ScriptedResponse};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Prompt that answers from a script and counts invocations
struct ScriptedPrompt {
    secret: Option<String>,
    calls: AtomicUsize,
}

impl ScriptedPrompt {
    fn answering(secret: &str) -> Self {
        Self {
            secret: Some(secret.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    fn cancelling() -> Self {
        Self {
            secret: None,
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl CredentialPrompt for ScriptedPrompt {
    fn request_credential(&self, _context: &str) -> cellarman::Result<Option<Secret>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.secret.clone().map(Secret::new))
    }
}

/// Prompt that must never be reached
struct PanicPrompt;

impl CredentialPrompt for PanicPrompt {
    fn request_credential(&self, _context: &str) -> cellarman::Result<Option<Secret>> {
        panic!("prompt must not be invoked when a cached credential exists");
    }
}

fn backend_for(mock: &MockBackend) -> BackendClient {
    let config = BackendConfig::default().with_base_url(mock.base_url.as_str());
    BackendClient::new(config).unwrap()
}

fn denied_stream() -> ScriptedResponse {
    sse(&[
        ("start", "Upgrading casks..."),
        (
            "error",
            "Administrative privileges required: must be run as root | REQUIRES_SUDO",
        ),
    ])
}

fn privileged_success_stream() -> ScriptedResponse {
    sse(&[
        ("start", "Upgrading casks (privileged)..."),
        ("log", "firefox upgraded"),
        ("end", "ok"),
    ])
}

fn run_with(
    backend: &BackendClient,
    session: &mut CredentialSession,
    prompt: &dyn CredentialPrompt,
    request: &OperationRequest,
) -> (OperationOutcome, OperationLogSink) {
    let mut sink = OperationLogSink::new();
    let mut driver = OperationDriver::new(backend, session, prompt);
    let outcome = driver.run(request, &mut sink, |_, _| {});
    (outcome, sink)
}

#[test]
fn test_privilege_error_prompts_once_and_retries_over_post() {
    let mock = MockBackend::serve(vec![denied_stream(), privileged_success_stream()]);
    let backend = backend_for(&mock);
    let prompt = ScriptedPrompt::answering("hunter2");
    let mut session = CredentialSession::new();

    let request = OperationRequest::upgrade(vec![Target::cask("firefox")]).unwrap();
    let (outcome, _) = run_with(&backend, &mut session, &prompt, &request);

    assert_eq!(outcome.status, OperationStatus::Success);
    assert_eq!(prompt.calls(), 1);
    // Only the retry attempt's lines survive; attempts never interleave
    assert_eq!(
        outcome.log_lines,
        vec!["Upgrading casks (privileged)...", "firefox upgraded"]
    );

    // The secret is cached and marked good for the rest of the session
    assert_eq!(session.cached_secret().unwrap().expose(), "hunter2");
    assert!(session.is_validated());

    let requests = mock.finish();
    assert_eq!(requests.len(), 2);
    // The push transport is never retried directly
    assert_eq!(requests[0].method, "GET");
    assert_eq!(requests[1].method, "POST");
    assert_eq!(requests[1].target, "/api/upgrade_stream");
    assert!(requests[1].body.contains("\"credential\":\"hunter2\""));
    assert!(requests[1].body.contains("\"casks\":[\"firefox\"]"));
}

#[test]
fn test_cached_credential_skips_prompt() {
    let mock = MockBackend::serve(vec![denied_stream(), privileged_success_stream()]);
    let backend = backend_for(&mock);
    let mut session = CredentialSession::new();
    session.store(Secret::new("cached-secret"));

    let request = OperationRequest::upgrade(vec![Target::cask("firefox")]).unwrap();
    let (outcome, _) = run_with(&backend, &mut session, &PanicPrompt, &request);

    assert!(outcome.is_success());
    assert!(session.is_validated());

    let requests = mock.finish();
    assert!(requests[1].body.contains("cached-secret"));
}

#[test]
fn test_cached_failure_falls_through_to_one_prompt() {
    let mock = MockBackend::serve(vec![
        denied_stream(),
        // The cached secret is stale: the retry is denied again
        sse(&[("error", "Sorry, try again. | REQUIRES_SUDO")]),
        privileged_success_stream(),
    ]);
    let backend = backend_for(&mock);
    let prompt = ScriptedPrompt::answering("fresh-secret");
    let mut session = CredentialSession::new();
    session.store(Secret::new("stale-secret"));

    let request = OperationRequest::upgrade(vec![Target::cask("firefox")]).unwrap();
    let (outcome, _) = run_with(&backend, &mut session, &prompt, &request);

    assert!(outcome.is_success());
    assert_eq!(prompt.calls(), 1);
    assert_eq!(session.cached_secret().unwrap().expose(), "fresh-secret");

    let requests = mock.finish();
    assert_eq!(requests.len(), 3);
    assert!(requests[1].body.contains("stale-secret"));
    assert!(requests[2].body.contains("fresh-secret"));
}

#[test]
fn test_prompted_retry_failure_is_final() {
    let mock = MockBackend::serve(vec![
        denied_stream(),
        sse(&[("error", "Sorry, try again. | REQUIRES_SUDO")]),
    ]);
    let backend = backend_for(&mock);
    let prompt = ScriptedPrompt::answering("wrong-password");
    let mut session = CredentialSession::new();

    let request = OperationRequest::upgrade(vec![Target::cask("firefox")]).unwrap();
    let (outcome, _) = run_with(&backend, &mut session, &prompt, &request);

    // One prompt, one retry, no loop: the second denial is final
    assert_eq!(outcome.status, OperationStatus::Failed);
    assert_eq!(prompt.calls(), 1);
    assert!(!session.is_validated());

    let requests = mock.finish();
    assert_eq!(requests.len(), 2);
}

#[test]
fn test_prompt_cancel_resolves_cancelled_silently() {
    let mock = MockBackend::serve(vec![denied_stream()]);
    let backend = backend_for(&mock);
    let prompt = ScriptedPrompt::cancelling();
    let mut session = CredentialSession::new();

    let request = OperationRequest::upgrade(vec![Target::cask("firefox")]).unwrap();
    let (outcome, sink) = run_with(&backend, &mut session, &prompt, &request);

    assert!(outcome.is_cancelled());
    assert!(outcome.error_message.is_none());
    assert_eq!(prompt.calls(), 1);
    assert!(session.cached_secret().is_none());

    // The concluded sink carries a status line, not an error entry
    assert!(sink.entries().iter().all(|e| e.kind != LogEntryKind::Error));
    assert_eq!(sink.lines(), vec!["Operation cancelled"]);

    let requests = mock.finish();
    assert_eq!(requests.len(), 1);
}

#[test]
fn test_privilege_detected_from_trailing_log_window() {
    let mock = MockBackend::serve(vec![
        sse(&[
            ("start", "Upgrading docker (cask)..."),
            ("log", "==> Running installer"),
            ("log", "sudo: a password is required"),
            ("error", "Command failed (1): brew upgrade --cask docker"),
        ]),
        privileged_success_stream(),
    ]);
    let backend = backend_for(&mock);
    let prompt = ScriptedPrompt::answering("hunter2");
    let mut session = CredentialSession::new();

    let request = OperationRequest::upgrade(vec![Target::cask("docker")]).unwrap();
    let (outcome, _) = run_with(&backend, &mut session, &prompt, &request);

    // The terminal payload alone is benign; the log window escalates it
    assert!(outcome.is_success());
    assert_eq!(prompt.calls(), 1);
    assert_eq!(mock.finish().len(), 2);
}
