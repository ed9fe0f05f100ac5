//! Registry adapters for fetching package version information
//!
//! This module provides:
//! - HTTP client shared foundation
//! - Go Module Proxy adapter
//! - Maven repository adapter (maven-metadata.xml, parent POM download)

mod client;
mod go_proxy;
mod maven_repo;

pub use client::{HttpClient, DEFAULT_TIMEOUT};
pub use go_proxy::{escape_module_path, GoProxyAdapter, GO_PROXY_URL};
pub use maven_repo::{MavenRepositoryAdapter, MAVEN_CENTRAL_URL};

use crate::domain::Ecosystem;
use crate::error::RegistryError;
use crate::update::VersionInfo;
use async_trait::async_trait;

/// Trait for registry adapters
#[async_trait]
pub trait RegistryAdapter: Send + Sync {
    /// Get the ecosystem this adapter handles
    fn ecosystem(&self) -> Ecosystem;

    /// Get the registry name
    fn registry_name(&self) -> &'static str {
        RegistryError::registry_name(self.ecosystem())
    }

    /// Fetch every published version of a package
    ///
    /// Fails with `PackageNotFound` only when every configured registry
    /// answered that the package does not exist.
    async fn fetch_versions(&self, package: &str) -> Result<Vec<VersionInfo>, RegistryError>;
}

/// Create a registry adapter for the given ecosystem
///
/// `repositories` are base URLs consulted in order before the public
/// default (GOPROXY entries for Go, repository URLs for Maven).
pub fn create_adapter(
    ecosystem: Ecosystem,
    client: HttpClient,
    repositories: Vec<String>,
) -> Box<dyn RegistryAdapter> {
    match ecosystem {
        Ecosystem::GoModules => Box::new(GoProxyAdapter::new(client).with_proxies(repositories)),
        Ecosystem::Maven => Box::new(MavenRepositoryAdapter::new(client, repositories)),
    }
}
