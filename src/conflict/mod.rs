//! Conflicting dependency detection
//!
//! Reports locked dependencies whose own constraint on a package would be
//! violated by moving that package to a target version. Detection is
//! advisory: when the inspector cannot run, the check fails open.

mod go_graph;

pub use go_graph::GoModGraphInspector;

use crate::config::EngineConfig;
use crate::domain::{Conflict, DependencyFile, Ecosystem};
use crate::error::EngineError;
use crate::resolver::CommandRunner;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;

/// Trait for reading dependency constraints out of lockfile state
#[async_trait]
pub trait LockfileInspector: Send + Sync {
    /// Entries that require `dependency` at a version newer than `target`
    async fn violations(
        &self,
        files: &[DependencyFile],
        dependency: &str,
        target: &str,
    ) -> Result<Vec<Conflict>, EngineError>;
}

/// Inspector for ecosystems without a lockfile
pub struct NoLockfileInspector;

#[async_trait]
impl LockfileInspector for NoLockfileInspector {
    async fn violations(
        &self,
        _files: &[DependencyFile],
        _dependency: &str,
        _target: &str,
    ) -> Result<Vec<Conflict>, EngineError> {
        Ok(Vec::new())
    }
}

pub struct ConflictResolver {
    inspector: Arc<dyn LockfileInspector>,
}

impl ConflictResolver {
    pub fn new(inspector: Arc<dyn LockfileInspector>) -> Self {
        Self { inspector }
    }

    /// Conflicts caused by moving `dependency` to `target`
    ///
    /// Inspector failures yield an empty set.
    pub async fn conflicts(
        &self,
        dependency: &str,
        target: &str,
        files: &[DependencyFile],
    ) -> Vec<Conflict> {
        match self.inspector.violations(files, dependency, target).await {
            Ok(conflicts) => conflicts,
            Err(e) => {
                warn!(dependency, target, error = %e, "conflict detection failed, assuming none");
                Vec::new()
            }
        }
    }
}

/// Create the conflict resolver for `ecosystem`
pub fn get_conflict_resolver(
    ecosystem: Ecosystem,
    runner: Arc<dyn CommandRunner>,
    config: &EngineConfig,
) -> ConflictResolver {
    let inspector: Arc<dyn LockfileInspector> = match ecosystem {
        Ecosystem::GoModules => Arc::new(
            GoModGraphInspector::new(runner)
                .with_timeout(config.resolver_timeout())
                .with_proxies(config.go_proxies.clone())
                .with_credentials(config.credentials.clone()),
        ),
        Ecosystem::Maven => Arc::new(NoLockfileInspector),
    };
    ConflictResolver::new(inspector)
}
