// src/commands/ops.rs
//! Operation commands: install, uninstall, upgrade, update

use anyhow::Result;
use cellarman::{
    BackendClient, CredentialPrompt, CredentialSession, LogEntryKind, OperationDriver,
    OperationLogSink, OperationRequest, OperationStatus, PackageKind, Secret, Target,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::ErrorKind;
use std::time::Duration;
use tracing::info;

/// Interactive password prompt on the controlling terminal
///
/// An empty password (or closed stdin) counts as dismissing the prompt.
pub struct TerminalPrompt;

impl CredentialPrompt for TerminalPrompt {
    fn request_credential(&self, context: &str) -> cellarman::Result<Option<Secret>> {
        eprintln!("{context}.");
        match rpassword::prompt_password("Administrator password (empty to cancel): ") {
            Ok(password) if password.is_empty() => Ok(None),
            Ok(password) => Ok(Some(Secret::new(password))),
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => Ok(None),
            Err(e) => Err(cellarman::Error::IoError(format!(
                "failed to read password: {e}"
            ))),
        }
    }
}

pub fn cmd_install(
    backend: &BackendClient,
    session: &mut CredentialSession,
    names: &[String],
    cask: bool,
) -> Result<()> {
    let request = OperationRequest::install(to_targets(names, cask))?;
    run_operation(backend, session, &request)
}

pub fn cmd_uninstall(
    backend: &BackendClient,
    session: &mut CredentialSession,
    names: &[String],
    cask: bool,
) -> Result<()> {
    let request = OperationRequest::uninstall(to_targets(names, cask))?;
    run_operation(backend, session, &request)
}

pub fn cmd_upgrade(
    backend: &BackendClient,
    session: &mut CredentialSession,
    formulae: &[String],
    casks: &[String],
    all: bool,
    ask_pass: bool,
) -> Result<()> {
    if !all && formulae.is_empty() && casks.is_empty() {
        anyhow::bail!("nothing to upgrade: name packages or pass --all");
    }

    if ask_pass && !preauthorize(backend, session)? {
        println!("Cancelled.");
        return Ok(());
    }

    let mut targets: Vec<Target> = formulae
        .iter()
        .map(|name| Target::formula(name.as_str()))
        .collect();
    targets.extend(casks.iter().map(|name| Target::cask(name.as_str())));
    let request = OperationRequest::upgrade(targets)?;
    run_operation(backend, session, &request)
}

pub fn cmd_update(backend: &BackendClient, session: &mut CredentialSession) -> Result<()> {
    run_operation(backend, session, &OperationRequest::update())
}

/// Prompt for a password up front, validate it, and seed the session
///
/// Returns false when the user cancels. Mirrors the upgrade flow of the
/// web front-end, where cask upgrades ask for the password before the
/// stream is opened.
fn preauthorize(backend: &BackendClient, session: &mut CredentialSession) -> Result<bool> {
    let secret = match TerminalPrompt.request_credential("This upgrade may need elevated privileges")? {
        Some(secret) => secret,
        None => return Ok(false),
    };
    if !backend.validate_credential(&secret)? {
        anyhow::bail!("the backend rejected the administrator password");
    }
    session.store(secret);
    session.mark_validated();
    info!("administrator credential validated and cached for this session");
    Ok(true)
}

fn to_targets(names: &[String], cask: bool) -> Vec<Target> {
    let kind = if cask {
        PackageKind::Cask
    } else {
        PackageKind::Formula
    };
    names
        .iter()
        .map(|name| Target::new(name.as_str(), kind))
        .collect()
}

fn run_operation(
    backend: &BackendClient,
    session: &mut CredentialSession,
    request: &OperationRequest,
) -> Result<()> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .expect("Invalid spinner template"),
    );
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_message(request.describe());

    let mut sink = OperationLogSink::new();
    let mut driver = OperationDriver::new(backend, session, &TerminalPrompt);
    let outcome = driver.run(request, &mut sink, |kind, line| match kind {
        LogEntryKind::Start => {
            spinner.println(line.to_string());
            spinner.set_message(line.to_string());
        }
        LogEntryKind::Log => spinner.println(line.to_string()),
        LogEntryKind::Error => spinner.println(format!("! {line}")),
        LogEntryKind::End => {}
    });
    spinner.finish_and_clear();

    match outcome.status {
        OperationStatus::Success => {
            println!(
                "Completed {} ({} log lines).",
                request.describe(),
                outcome.log_lines.len()
            );
            Ok(())
        }
        OperationStatus::Cancelled => {
            println!("Cancelled.");
            Ok(())
        }
        OperationStatus::Failed => {
            let message = outcome
                .error_message
                .unwrap_or_else(|| "unknown error".to_string());
            anyhow::bail!("{} failed: {message}", request.describe())
        }
    }
}
