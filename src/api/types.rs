// src/api/types.rs

//! Response models for the backend's read-only endpoints
//!
//! The backend relays package metadata from the underlying manager
//! mostly as-is, so the models are tolerant: unknown fields are ignored
//! and almost everything is optional. One quirk worth noting: formula
//! records carry `name` as a string, cask records as a list of display
//! names alongside a `token`; [`NameField`] absorbs both.

use serde::Deserialize;

/// A name that may arrive as a string or a list of display names
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum NameField {
    One(String),
    Many(Vec<String>),
}

impl NameField {
    /// First (or only) name, empty string if the list is empty
    pub fn primary(&self) -> &str {
        match self {
            NameField::One(name) => name,
            NameField::Many(names) => names.first().map(String::as_str).unwrap_or(""),
        }
    }
}

/// Version block on installed/available package records
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Versions {
    #[serde(default)]
    pub stable: Option<String>,
    #[serde(default)]
    pub head: Option<String>,
}

/// One installed or known package
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackageInfo {
    #[serde(default)]
    pub name: Option<NameField>,
    /// Cask identifier (absent on formulae)
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub desc: Option<String>,
    #[serde(default)]
    pub homepage: Option<String>,
    #[serde(default)]
    pub versions: Option<Versions>,
    /// Cask version field (casks have a flat version, not a block)
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub size_kb: Option<u64>,
    /// Human-readable size, e.g. "1.2 MB"
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub deprecated: bool,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub deprecation_date: Option<String>,
    #[serde(default)]
    pub deprecation_reason: Option<String>,
}

impl PackageInfo {
    /// Best identifier for display: token for casks, name otherwise
    pub fn display_name(&self) -> &str {
        if let Some(token) = &self.token {
            return token;
        }
        self.name.as_ref().map(NameField::primary).unwrap_or("")
    }
}

/// One outdated package from the outdated report
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutdatedPackage {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub installed_versions: Vec<String>,
    #[serde(default)]
    pub current_version: Option<String>,
    #[serde(default)]
    pub desc: Option<String>,
    #[serde(default)]
    pub size_kb: Option<u64>,
    #[serde(default)]
    pub size: Option<String>,
}

/// Anything the backend partitions by package kind
#[derive(Debug, Clone, Deserialize)]
pub struct KindLists<T> {
    #[serde(default = "Vec::new")]
    pub formulae: Vec<T>,
    #[serde(default = "Vec::new")]
    pub casks: Vec<T>,
}

impl<T> Default for KindLists<T> {
    fn default() -> Self {
        Self {
            formulae: Vec::new(),
            casks: Vec::new(),
        }
    }
}

impl<T> KindLists<T> {
    pub fn is_empty(&self) -> bool {
        self.formulae.is_empty() && self.casks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.formulae.len() + self.casks.len()
    }
}

/// One search hit (name plus short description)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchHit {
    pub name: String,
    #[serde(default)]
    pub desc: String,
}

/// Node of a dependency tree
#[derive(Debug, Clone, Deserialize)]
pub struct DependencyNode {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: crate::op::PackageKind,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub deps: Vec<DependencyNode>,
}

/// Names of everything installed, for backup purposes
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BackupList {
    #[serde(default)]
    pub formulae: Vec<String>,
    #[serde(default)]
    pub casks: Vec<String>,
}

/// Backend liveness report
#[derive(Debug, Clone, Deserialize)]
pub struct HealthStatus {
    pub ok: bool,
    /// Version line of the underlying manager
    #[serde(default)]
    pub brew: Option<String>,
    #[serde(default)]
    pub needs_update: bool,
}

/// Full catalog payload: everything installed plus what is outdated
#[derive(Debug, Clone, Deserialize)]
pub struct PackageCatalog {
    #[serde(default)]
    pub outdated: KindLists<OutdatedPackage>,
    #[serde(default)]
    pub installed: KindLists<PackageInfo>,
}

/// Combined dashboard payload
#[derive(Debug, Clone, Deserialize)]
pub struct Summary {
    #[serde(default)]
    pub outdated: KindLists<OutdatedPackage>,
    #[serde(default)]
    pub deprecated: KindLists<PackageInfo>,
    #[serde(default)]
    pub orphaned: KindLists<PackageInfo>,
    #[serde(default)]
    pub installed: KindLists<PackageInfo>,
}
