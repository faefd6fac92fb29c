// src/op/mod.rs

//! Operation request and outcome model
//!
//! An [`OperationRequest`] names one batch of targets for a single
//! backend operation. Targets are partitioned by package kind and sent
//! together; a single-target request is just a batch of one. Every
//! request resolves to exactly one [`OperationOutcome`], regardless of
//! which transport path completed it.

pub mod driver;

use crate::error::{Error, Result};
use crate::escalation::Secret;
use serde::{Deserialize, Serialize};

/// Kind of backend operation
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum OperationKind {
    /// Install packages
    Install,
    /// Uninstall packages
    Uninstall,
    /// Upgrade outdated packages
    Upgrade,
    /// Refresh package metadata
    Update,
}

/// The two package kinds managed by the backend
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PackageKind {
    /// Command-line package
    Formula,
    /// GUI application package
    Cask,
}

/// One package targeted by an operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    pub name: String,
    pub kind: PackageKind,
}

impl Target {
    pub fn new(name: impl Into<String>, kind: PackageKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    pub fn formula(name: impl Into<String>) -> Self {
        Self::new(name, PackageKind::Formula)
    }

    pub fn cask(name: impl Into<String>) -> Self {
        Self::new(name, PackageKind::Cask)
    }
}

/// One batch operation against the backend
#[derive(Debug, Clone)]
pub struct OperationRequest {
    kind: OperationKind,
    targets: Vec<Target>,
    credential: Option<Secret>,
}

impl OperationRequest {
    /// Build a request, checking that the target list fits the kind
    ///
    /// Install and uninstall need at least one target. Upgrade with an
    /// empty target list means "upgrade everything outdated"; update
    /// never takes targets.
    pub fn new(kind: OperationKind, targets: Vec<Target>) -> Result<Self> {
        match kind {
            OperationKind::Install | OperationKind::Uninstall if targets.is_empty() => {
                return Err(Error::InvalidRequest(format!(
                    "{kind} requires at least one target"
                )));
            }
            OperationKind::Update if !targets.is_empty() => {
                return Err(Error::InvalidRequest(
                    "update does not take targets".to_string(),
                ));
            }
            _ => {}
        }
        Ok(Self {
            kind,
            targets,
            credential: None,
        })
    }

    pub fn install(targets: Vec<Target>) -> Result<Self> {
        Self::new(OperationKind::Install, targets)
    }

    pub fn uninstall(targets: Vec<Target>) -> Result<Self> {
        Self::new(OperationKind::Uninstall, targets)
    }

    pub fn upgrade(targets: Vec<Target>) -> Result<Self> {
        Self::new(OperationKind::Upgrade, targets)
    }

    pub fn update() -> Self {
        Self {
            kind: OperationKind::Update,
            targets: Vec::new(),
            credential: None,
        }
    }

    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    pub fn credential(&self) -> Option<&Secret> {
        self.credential.as_ref()
    }

    /// Copy of this request carrying the given credential
    pub fn with_credential(&self, secret: Secret) -> Self {
        Self {
            kind: self.kind,
            targets: self.targets.clone(),
            credential: Some(secret),
        }
    }

    /// Target names partitioned by kind: (formulae, casks)
    pub fn target_names(&self) -> (Vec<&str>, Vec<&str>) {
        let mut formulae = Vec::new();
        let mut casks = Vec::new();
        for target in &self.targets {
            match target.kind {
                PackageKind::Formula => formulae.push(target.name.as_str()),
                PackageKind::Cask => casks.push(target.name.as_str()),
            }
        }
        (formulae, casks)
    }

    /// Short human description, used for prompts and status lines
    pub fn describe(&self) -> String {
        match (self.kind, self.targets.len()) {
            (OperationKind::Update, _) => "metadata update".to_string(),
            (kind, 0) => format!("{kind} of all outdated packages"),
            (kind, 1) => format!("{kind} of {}", self.targets[0].name),
            (kind, n) => format!("{kind} of {n} packages"),
        }
    }
}

/// Final state of an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationStatus {
    Success,
    Failed,
    Cancelled,
}

/// The single result every operation converges on
#[derive(Debug, Clone)]
pub struct OperationOutcome {
    pub status: OperationStatus,
    /// Progress lines in arrival order, from whichever transport finished
    pub log_lines: Vec<String>,
    pub error_message: Option<String>,
}

impl OperationOutcome {
    pub fn is_success(&self) -> bool {
        self.status == OperationStatus::Success
    }

    pub fn is_cancelled(&self) -> bool {
        self.status == OperationStatus::Cancelled
    }
}
