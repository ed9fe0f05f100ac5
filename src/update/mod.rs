//! Update decision logic for dependencies
//!
//! This module provides:
//! - Update filter configuration from CLI args
//! - Version info from registry listings
//! - Requirement rewriting and property group updates
//! - The staged update checker that decides what a dependency moves to

mod filter;
pub mod property_updater;
pub mod requirements;
mod version_info;

pub use filter::UpdateFilter;
pub use property_updater::PropertyUpdater;
pub use requirements::{get_requirements_updater, RequirementsUpdater};
pub use version_info::{sort_versions, VersionInfo};

use crate::config::EngineConfig;
use crate::conflict::ConflictResolver;
use crate::domain::{
    Dependency, DependencyFile, Ecosystem, NotPossibleReason, Requirement, UpdateOutcome,
};
use crate::error::{EngineError, RegistryError};
use crate::registry::RegistryAdapter;
use crate::resolver::{ResolutionRequest, Resolver};
use crate::scheme::{is_newer, requirement_scheme, version_scheme};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::debug;

/// Collaborators shared by every checker of one ecosystem
#[derive(Clone)]
pub struct CheckerContext {
    pub registry: Arc<dyn RegistryAdapter>,
    pub resolver: Arc<dyn Resolver>,
    pub conflicts: Arc<ConflictResolver>,
    pub config: Arc<EngineConfig>,
}

/// Staged update check for one dependency
///
/// Each stage is computed at most once per checker; a new check needs a new
/// checker built from a fresh parse.
pub struct UpdateChecker {
    dependency: Dependency,
    files: Vec<DependencyFile>,
    /// Every parsed dependency of the ecosystem, for property groups
    dependencies: Vec<Dependency>,
    context: CheckerContext,
    requested_version: Option<String>,
    available: OnceCell<Vec<VersionInfo>>,
    latest_resolvable: OnceCell<Option<VersionInfo>>,
    latest_resolvable_no_unlock: OnceCell<Option<VersionInfo>>,
}

impl UpdateChecker {
    pub fn new(
        dependency: Dependency,
        files: Vec<DependencyFile>,
        dependencies: Vec<Dependency>,
        context: CheckerContext,
    ) -> Self {
        Self {
            dependency,
            files,
            dependencies,
            context,
            requested_version: None,
            available: OnceCell::new(),
            latest_resolvable: OnceCell::new(),
            latest_resolvable_no_unlock: OnceCell::new(),
        }
    }

    /// Check one explicit version instead of the newest published one
    pub fn with_requested_version(mut self, version: impl Into<String>) -> Self {
        let scheme = version_scheme(self.dependency.ecosystem());
        self.requested_version = Some(scheme.normalize(&version.into()));
        self
    }

    fn ecosystem(&self) -> Ecosystem {
        self.dependency.ecosystem()
    }

    fn config(&self) -> &EngineConfig {
        &self.context.config
    }

    fn is_acceptable(&self, version: &str) -> bool {
        let scheme = version_scheme(self.ecosystem());
        let current = self.dependency.version().unwrap_or_default();
        let config = self.config();

        if config.is_ignored(self.ecosystem(), self.dependency.name(), version) {
            return false;
        }

        if scheme.is_prerelease(version)
            && !config.allow_prerelease
            && !scheme.is_prerelease(current)
        {
            return false;
        }

        if version.ends_with("+incompatible")
            && !config.allow_incompatible
            && !current.ends_with("+incompatible")
        {
            return false;
        }

        true
    }

    /// Published versions that policy allows, newest first
    pub async fn available_versions(&self) -> Result<&[VersionInfo], EngineError> {
        let versions = self
            .available
            .get_or_try_init(|| async {
                let listed = match self
                    .context
                    .registry
                    .fetch_versions(self.dependency.name())
                    .await
                {
                    Ok(listed) => listed,
                    Err(RegistryError::PackageNotFound { .. }) => Vec::new(),
                    Err(e) => return Err(EngineError::from(e)),
                };

                let sorted = sort_versions(version_scheme(self.ecosystem()), listed);
                let acceptable: Vec<VersionInfo> = sorted
                    .into_iter()
                    .filter(|info| self.is_acceptable(&info.version))
                    .collect();
                debug!(
                    dependency = self.dependency.name(),
                    count = acceptable.len(),
                    "fetched available versions"
                );
                Ok(acceptable)
            })
            .await?;
        Ok(versions.as_slice())
    }

    /// Newest acceptable published version, ignoring resolvability
    pub async fn latest_version(&self) -> Result<Option<&VersionInfo>, EngineError> {
        Ok(self.available_versions().await?.first())
    }

    /// Candidates newer than the current version, newest first
    async fn candidates(&self, within_requirements: bool) -> Result<Vec<VersionInfo>, EngineError> {
        if let Some(requested) = &self.requested_version {
            let source_url = self
                .available_versions()
                .await?
                .iter()
                .find(|info| &info.version == requested)
                .map(|info| info.source_url.clone())
                .unwrap_or_default();
            return Ok(vec![VersionInfo::new(requested.clone(), source_url)]);
        }

        let scheme = version_scheme(self.ecosystem());
        let requirements = requirement_scheme(self.ecosystem());
        let current = self.dependency.version().unwrap_or_default();

        Ok(self
            .available_versions()
            .await?
            .iter()
            .filter(|info| is_newer(scheme, &info.version, current))
            .filter(|info| {
                !within_requirements
                    || self.dependency.requirements().iter().all(|req| {
                        req.constraint.as_deref().map_or(true, |c| {
                            requirements.satisfied_by(c, &info.version).unwrap_or(false)
                        })
                    })
            })
            .take(self.config().max_resolution_attempts)
            .cloned()
            .collect())
    }

    /// First candidate the native resolver accepts
    ///
    /// All candidates rejected fails with `DependencyFileNotResolvable`;
    /// unreachable sources fail immediately.
    async fn first_resolvable(
        &self,
        candidates: Vec<VersionInfo>,
    ) -> Result<Option<VersionInfo>, EngineError> {
        let mut rejection = None;
        for candidate in candidates {
            let request = ResolutionRequest {
                files: self.files.clone(),
                dependency_name: self.dependency.name().to_string(),
                previous_version: self.dependency.version().map(str::to_string),
                candidate_version: candidate.version.clone(),
                credentials: self.config().credentials.clone(),
            };

            match self.context.resolver.resolve(&request).await {
                Ok(resolved) => {
                    debug!(
                        dependency = self.dependency.name(),
                        version = resolved.version.as_str(),
                        "resolver accepted candidate"
                    );
                    return Ok(Some(VersionInfo::new(resolved.version, candidate.source_url)));
                }
                Err(EngineError::DependencyFileNotResolvable { message }) => {
                    debug!(
                        dependency = self.dependency.name(),
                        candidate = candidate.version.as_str(),
                        message = message.as_str(),
                        "resolver rejected candidate"
                    );
                    rejection = Some(message);
                }
                Err(e) => return Err(e),
            }
        }

        match rejection {
            Some(message) => Err(EngineError::not_resolvable(message)),
            None => Ok(None),
        }
    }

    /// Newest version the resolver accepts, allowed to leave the current requirements
    pub async fn latest_resolvable_version(&self) -> Result<Option<&VersionInfo>, EngineError> {
        let version = self
            .latest_resolvable
            .get_or_try_init(|| async { self.first_resolvable(self.candidates(false).await?).await })
            .await?;
        Ok(version.as_ref())
    }

    /// Newest version the resolver accepts that satisfies every current requirement
    pub async fn latest_resolvable_version_with_no_unlock(
        &self,
    ) -> Result<Option<&VersionInfo>, EngineError> {
        let version = self
            .latest_resolvable_no_unlock
            .get_or_try_init(|| async { self.first_resolvable(self.candidates(true).await?).await })
            .await?;
        Ok(version.as_ref())
    }

    /// Version the update moves to, `None` when there is nothing to do
    async fn target_version(&self) -> Result<Option<VersionInfo>, EngineError> {
        if self.config().unlock {
            if let Some(version) = self.latest_resolvable_version().await? {
                return Ok(Some(version.clone()));
            }
        }
        Ok(self.latest_resolvable_version_with_no_unlock().await?.cloned())
    }

    /// Requirements of the dependency moved to the target version
    pub async fn updated_requirements(&self) -> Result<Vec<Requirement>, EngineError> {
        let target = self.target_version().await?;
        let updater = get_requirements_updater(self.ecosystem());
        Ok(updater.update(
            self.dependency.requirements(),
            target.as_ref().map(|t| t.version.as_str()),
            target.as_ref().map(|t| t.source_url.as_str()).filter(|u| !u.is_empty()),
        ))
    }

    /// Every dependency that changes, empty when already up to date
    ///
    /// Property-linked dependencies move together with their group.
    pub async fn updated_dependencies(&self) -> Result<Vec<Dependency>, EngineError> {
        let Some(target) = self.target_version().await? else {
            return Ok(Vec::new());
        };
        let source_url = Some(target.source_url.as_str()).filter(|u| !u.is_empty());

        if self.dependency.property_name().is_some() {
            let updater = PropertyUpdater::new(self.context.registry.clone());
            return updater
                .updated_dependencies(&self.dependency, &target.version, source_url, &self.dependencies)
                .await;
        }

        let requirements = self.updated_requirements().await?;
        Ok(vec![self
            .dependency
            .with_update(Some(target.version), requirements)?])
    }

    /// Runs every stage and classifies the result
    pub async fn check(&self) -> UpdateOutcome {
        match self.decide().await {
            Ok(outcome) => outcome,
            Err(EngineError::DependencyFileNotResolvable { message }) => UpdateOutcome::NotPossible {
                dependency: self.dependency.clone(),
                reason: NotPossibleReason::NotResolvable { message },
                conflicts: Vec::new(),
            },
            Err(EngineError::PropertyUpdateNotPossible {
                property,
                target,
                blocking,
            }) => UpdateOutcome::NotPossible {
                dependency: self.dependency.clone(),
                reason: NotPossibleReason::PropertyConflict {
                    property,
                    target,
                    blocking,
                },
                conflicts: Vec::new(),
            },
            Err(e) => UpdateOutcome::blocked(self.dependency.clone(), e),
        }
    }

    async fn decide(&self) -> Result<UpdateOutcome, EngineError> {
        let up_to_date = || UpdateOutcome::UpToDate {
            dependency: self.dependency.clone(),
        };

        if self.requested_version.is_none() {
            let Some(latest) = self.latest_version().await? else {
                return Ok(UpdateOutcome::NotPossible {
                    dependency: self.dependency.clone(),
                    reason: NotPossibleReason::NoVersionsAvailable,
                    conflicts: Vec::new(),
                });
            };
            let scheme = version_scheme(self.ecosystem());
            let current = self.dependency.version().unwrap_or_default();
            if !is_newer(scheme, &latest.version, current) {
                return Ok(up_to_date());
            }
        }

        let dependencies = self.updated_dependencies().await?;
        if dependencies.is_empty() {
            return Ok(up_to_date());
        }

        let target = dependencies[0].version().unwrap_or_default().to_string();
        let conflicts = self
            .context
            .conflicts
            .conflicts(self.dependency.name(), &target, &self.files)
            .await;

        Ok(UpdateOutcome::Updated {
            dependencies,
            conflicts,
        })
    }
}
