// src/api/mod.rs

//! Read-only query surface of the backend
//!
//! Simple request/response lookups consumed by rendering: package
//! listings, search, dependency trees, and info. These never mutate
//! anything and carry no credential; the operation protocol lives in
//! [`crate::transport`] and [`crate::op`].

pub mod types;

use crate::error::{Error, Result};
use crate::op::PackageKind;
use crate::transport::BackendClient;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

pub use types::{
    BackupList, DependencyNode, HealthStatus, KindLists, NameField, OutdatedPackage,
    PackageCatalog, PackageInfo, SearchHit, Summary, Versions,
};

/// Error body the backend attaches to failed API calls
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    error: Option<String>,
}

/// Typed access to the backend's read endpoints
pub struct QueryClient<'a> {
    backend: &'a BackendClient,
}

impl<'a> QueryClient<'a> {
    pub fn new(backend: &'a BackendClient) -> Self {
        Self { backend }
    }

    pub fn health(&self) -> Result<HealthStatus> {
        self.get_json("/api/health", &[])
    }

    pub fn summary(&self) -> Result<Summary> {
        self.get_json("/api/summary", &[])
    }

    pub fn packages(&self) -> Result<PackageCatalog> {
        self.get_json("/api/packages", &[])
    }

    pub fn installed(&self) -> Result<KindLists<PackageInfo>> {
        self.get_json("/api/installed", &[])
    }

    pub fn outdated(&self) -> Result<KindLists<OutdatedPackage>> {
        self.get_json("/api/outdated", &[])
    }

    pub fn deprecated(&self) -> Result<KindLists<PackageInfo>> {
        self.get_json("/api/deprecated", &[])
    }

    pub fn orphaned(&self) -> Result<KindLists<PackageInfo>> {
        self.get_json("/api/orphaned", &[])
    }

    pub fn search(&self, query: &str) -> Result<KindLists<SearchHit>> {
        self.get_json("/api/search", &[("q", query)])
    }

    pub fn info(&self, name: &str, kind: PackageKind) -> Result<PackageInfo> {
        self.get_json("/api/info", &[("name", name), ("type", &kind.to_string())])
    }

    pub fn dependency_tree(&self, name: &str, kind: PackageKind) -> Result<DependencyNode> {
        self.get_json(
            "/api/dependencies",
            &[("name", name), ("type", &kind.to_string())],
        )
    }

    pub fn backup(&self) -> Result<BackupList> {
        self.get_json("/api/backup", &[])
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        let url = self.backend.endpoint(path);
        debug!("GET {path}");
        let response = self
            .backend
            .rpc_http()
            .get(&url)
            .query(query)
            .send()
            .map_err(|e| Error::ApiError(format!("request to {path} failed: {e}")))?;

        let status = response.status();
        let text = response
            .text()
            .map_err(|e| Error::ApiError(format!("failed to read response from {path}: {e}")))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorBody>(&text)
                .ok()
                .and_then(|body| body.error)
                .unwrap_or_else(|| format!("HTTP {status}"));
            return Err(Error::ApiError(format!("{path}: {message}")));
        }

        serde_json::from_str(&text)
            .map_err(|e| Error::ParseError(format!("failed to parse response from {path}: {e}")))
    }
}

impl BackendClient {
    /// Borrow the read-only query surface
    pub fn queries(&self) -> QueryClient<'_> {
        QueryClient::new(self)
    }
}
