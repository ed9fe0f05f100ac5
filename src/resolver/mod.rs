//! Native resolver port
//!
//! A resolver answers one question: does the ecosystem accept the
//! dependency files with `dependency` moved to `candidate_version`? It never
//! edits the caller's files; work happens in a temporary [`Workspace`].
//!
//! This module provides:
//! - The `Resolver` trait and its request/response types
//! - `GoResolver`, which runs `go get` in a workspace
//! - `MavenResolver`, which checks the candidate against repository listings
//! - Command runner and workspace helpers

mod command;
mod go;
mod maven;
mod workspace;

pub use command::{CommandOutput, CommandRunner, CommandSpec, SystemCommandRunner};
pub use go::GoResolver;
pub(crate) use go::{go_environment, goproxy_setting, write_netrc};
pub use maven::MavenResolver;
pub use workspace::Workspace;

use crate::config::{Credential, EngineConfig};
use crate::domain::{DependencyFile, Ecosystem};
use crate::error::EngineError;
use crate::registry::RegistryAdapter;
use async_trait::async_trait;
use std::sync::Arc;

/// Input of one resolution attempt
#[derive(Debug, Clone)]
pub struct ResolutionRequest {
    pub files: Vec<DependencyFile>,
    pub dependency_name: String,
    pub previous_version: Option<String>,
    pub candidate_version: String,
    /// Passed explicitly; resolvers never read credentials from the environment
    pub credentials: Vec<Credential>,
}

/// Output of an accepted resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFiles {
    /// Version the resolver selected (normalized)
    pub version: String,
    /// Files the native tool rewrote, lockfiles and manifests alike
    ///
    /// They replace the caller's copies by name.
    pub files: Vec<DependencyFile>,
}

/// Trait for native resolvers
#[async_trait]
pub trait Resolver: Send + Sync {
    fn ecosystem(&self) -> Ecosystem;

    /// Resolve `request`
    ///
    /// Fails with `DependencyFileNotResolvable` when the ecosystem rejects
    /// the candidate, and with an unreachable-class error when the answer
    /// could not be obtained.
    async fn resolve(&self, request: &ResolutionRequest) -> Result<ResolvedFiles, EngineError>;
}

/// Create the resolver for `ecosystem`
pub fn get_resolver(
    ecosystem: Ecosystem,
    runner: Arc<dyn CommandRunner>,
    registry: Arc<dyn RegistryAdapter>,
    config: &EngineConfig,
) -> Arc<dyn Resolver> {
    match ecosystem {
        Ecosystem::GoModules => Arc::new(
            GoResolver::new(runner)
                .with_timeout(config.resolver_timeout())
                .with_proxies(config.go_proxies.clone()),
        ),
        Ecosystem::Maven => Arc::new(MavenResolver::new(registry)),
    }
}
