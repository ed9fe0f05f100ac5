//! Update orchestrator for coordinating the entire update workflow
//!
//! This module provides:
//! - Workflow coordination: load → parse → check → patch → refresh lockfile → write
//! - Dry-run mode support
//! - Ecosystem and dependency filter application
//! - Error handling with partial continuation

use crate::config::EngineConfig;
use crate::conflict::{get_conflict_resolver, ConflictResolver};
use crate::domain::{
    Dependency, DependencyFile, Ecosystem, EcosystemReport, UpdateOutcome, UpdateSummary,
};
use crate::error::EngineError;
use crate::manifest::detector::detect_ecosystems;
use crate::manifest::{
    get_parser, get_updater, load_dependency_files, repository_urls, ManifestWriter, WriteResult,
};
use crate::progress::Progress;
use crate::property::PomFetcher;
use crate::registry::{GoProxyAdapter, HttpClient, MavenRepositoryAdapter, RegistryAdapter};
use crate::resolver::{
    get_resolver, CommandRunner, ResolutionRequest, Resolver, SystemCommandRunner,
};
use crate::update::{CheckerContext, UpdateChecker, UpdateFilter};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Collaborators used for one ecosystem
#[derive(Clone)]
pub struct EcosystemServices {
    pub registry: Arc<dyn RegistryAdapter>,
    /// Remote parent POM lookup; `None` resolves properties from local files only
    pub pom_fetcher: Option<Arc<dyn PomFetcher>>,
    pub resolver: Arc<dyn Resolver>,
    pub conflicts: Arc<ConflictResolver>,
}

/// Errors that stop one ecosystem or one dependency without stopping the run
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// Failed to create HTTP client
    #[error("HTTP client error: {0}")]
    HttpClient(String),

    /// Loading or parsing the dependency files of an ecosystem failed
    #[error("{ecosystem}: {source}")]
    Ecosystem {
        ecosystem: Ecosystem,
        #[source]
        source: EngineError,
    },

    /// An accepted update could not be written into the files
    #[error("failed to update {dependency}: {source}")]
    Apply {
        dependency: String,
        #[source]
        source: EngineError,
    },

    /// Writing changed files failed
    #[error("failed to write {ecosystem} files: {source}")]
    Write {
        ecosystem: Ecosystem,
        #[source]
        source: EngineError,
    },
}

/// Result of running the orchestrator
pub struct OrchestratorResult {
    pub summary: UpdateSummary,
    pub write_results: Vec<WriteResult>,
    pub errors: Vec<OrchestratorError>,
}

/// Dependencies parsed for one ecosystem
pub struct ParsedEcosystem {
    pub ecosystem: Ecosystem,
    pub files: Vec<DependencyFile>,
    pub dependencies: Vec<Dependency>,
}

/// Orchestrator for coordinating the update workflow
pub struct Orchestrator {
    root: PathBuf,
    config: Arc<EngineConfig>,
    filter: UpdateFilter,
    dry_run: bool,
    show_progress: bool,
    client: HttpClient,
    runner: Arc<dyn CommandRunner>,
    overrides: Vec<(Ecosystem, EcosystemServices)>,
}

impl Orchestrator {
    /// Create a new orchestrator for the project at `root`
    pub fn new(
        root: impl Into<PathBuf>,
        config: EngineConfig,
        filter: UpdateFilter,
    ) -> Result<Self, OrchestratorError> {
        let client = HttpClient::with_timeout(config.timeout())
            .map_err(|e| OrchestratorError::HttpClient(e.to_string()))?
            .with_credentials(config.credentials.clone());

        Ok(Self {
            root: root.into(),
            config: Arc::new(config),
            filter,
            dry_run: false,
            show_progress: false,
            client,
            runner: Arc::new(SystemCommandRunner::new()),
            overrides: Vec::new(),
        })
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Use `runner` for native tools instead of the system runner
    pub fn with_runner(mut self, runner: Arc<dyn CommandRunner>) -> Self {
        self.runner = runner;
        self
    }

    /// Use `services` for `ecosystem` instead of the network-backed defaults
    pub fn with_services(mut self, ecosystem: Ecosystem, services: EcosystemServices) -> Self {
        self.overrides.retain(|(e, _)| *e != ecosystem);
        self.overrides.push((ecosystem, services));
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn services(&self, ecosystem: Ecosystem, files: &[DependencyFile]) -> EcosystemServices {
        if let Some((_, services)) = self.overrides.iter().find(|(e, _)| *e == ecosystem) {
            return services.clone();
        }

        let conflicts = Arc::new(get_conflict_resolver(
            ecosystem,
            self.runner.clone(),
            &self.config,
        ));
        match ecosystem {
            Ecosystem::GoModules => {
                let registry: Arc<dyn RegistryAdapter> = Arc::new(
                    GoProxyAdapter::new(self.client.clone())
                        .with_proxies(self.config.go_proxies.clone()),
                );
                EcosystemServices {
                    resolver: get_resolver(ecosystem, self.runner.clone(), registry.clone(), &self.config),
                    registry,
                    pom_fetcher: None,
                    conflicts,
                }
            }
            Ecosystem::Maven => {
                let mut repositories = self.config.repositories.clone();
                repositories.extend(repository_urls(files));
                let adapter = Arc::new(MavenRepositoryAdapter::new(self.client.clone(), repositories));
                let registry: Arc<dyn RegistryAdapter> = adapter.clone();
                EcosystemServices {
                    resolver: get_resolver(ecosystem, self.runner.clone(), registry.clone(), &self.config),
                    registry,
                    pom_fetcher: Some(adapter),
                    conflicts,
                }
            }
        }
    }

    fn ecosystems(&self) -> Vec<Ecosystem> {
        detect_ecosystems(&self.root)
            .into_iter()
            .filter(|e| self.filter.should_process_ecosystem(*e))
            .collect()
    }

    async fn parse_ecosystem(
        &self,
        ecosystem: Ecosystem,
    ) -> Result<(ParsedEcosystem, EcosystemServices), OrchestratorError> {
        let wrap = |source| OrchestratorError::Ecosystem { ecosystem, source };

        let files = load_dependency_files(&self.root, ecosystem).map_err(wrap)?;
        let services = self.services(ecosystem, &files);
        let parser = get_parser(ecosystem, services.pom_fetcher.clone());
        let dependencies = parser.parse(&files).await.map_err(wrap)?;
        debug!(%ecosystem, files = files.len(), dependencies = dependencies.len(), "parsed dependency files");

        Ok((
            ParsedEcosystem {
                ecosystem,
                files,
                dependencies,
            },
            services,
        ))
    }

    /// Parse every detected ecosystem without checking for updates
    pub async fn parse_all(&self) -> (Vec<ParsedEcosystem>, Vec<OrchestratorError>) {
        let mut parsed = Vec::new();
        let mut errors = Vec::new();
        for ecosystem in self.ecosystems() {
            match self.parse_ecosystem(ecosystem).await {
                Ok((result, _)) => parsed.push(result),
                Err(e) => errors.push(e),
            }
        }
        (parsed, errors)
    }

    /// Run the update workflow
    pub async fn run(&self) -> OrchestratorResult {
        let mut progress = Progress::new(self.show_progress);
        let mut summary = UpdateSummary::new(self.dry_run);
        let mut write_results = Vec::new();
        let mut errors = Vec::new();

        for ecosystem in self.ecosystems() {
            progress.spinner(&format!("Parsing {} files...", ecosystem.display_name()));
            let parsed = self.parse_ecosystem(ecosystem).await;
            progress.finish_and_clear();

            let (parsed, services) = match parsed {
                Ok(parsed) => parsed,
                Err(e) => {
                    warn!(error = %e, "skipping ecosystem");
                    errors.push(e);
                    continue;
                }
            };

            let (report, updated_files) = self
                .update_ecosystem(&parsed, &services, &mut progress, &mut errors)
                .await;

            let writer = ManifestWriter::new(self.dry_run);
            match writer.write_changes(&self.root, &parsed.files, &updated_files) {
                Ok(results) => write_results.extend(results),
                Err(source) => errors.push(OrchestratorError::Write { ecosystem, source }),
            }
            summary.add_ecosystem(report);
        }

        OrchestratorResult {
            summary,
            write_results,
            errors,
        }
    }

    /// Checks and applies updates one dependency at a time
    ///
    /// Each check sees the files as patched by every earlier update.
    async fn update_ecosystem(
        &self,
        parsed: &ParsedEcosystem,
        services: &EcosystemServices,
        progress: &mut Progress,
        errors: &mut Vec<OrchestratorError>,
    ) -> (EcosystemReport, Vec<DependencyFile>) {
        let ecosystem = parsed.ecosystem;
        let mut report = EcosystemReport::new(ecosystem);
        let mut working = parsed.files.clone();
        let mut handled: HashSet<String> = HashSet::new();

        let context = CheckerContext {
            registry: services.registry.clone(),
            resolver: services.resolver.clone(),
            conflicts: services.conflicts.clone(),
            config: self.config.clone(),
        };

        progress.start(parsed.dependencies.len() as u64, "Checking dependencies");
        for dependency in &parsed.dependencies {
            progress.set_message(&format!("Checking {}", dependency.name()));
            progress.inc();

            if handled.contains(dependency.name()) {
                continue;
            }
            if let Some(reason) = self.filter.should_skip(dependency) {
                report.add_outcome(UpdateOutcome::skip(dependency.clone(), reason));
                continue;
            }

            let checker = UpdateChecker::new(
                dependency.clone(),
                working.clone(),
                parsed.dependencies.clone(),
                context.clone(),
            );
            let outcome = checker.check().await;

            if !outcome.is_update() {
                report.add_outcome(outcome);
                continue;
            }
            let dependencies = outcome.updated_dependencies().to_vec();

            match self
                .apply_update(ecosystem, &working, &dependencies, services.resolver.as_ref())
                .await
            {
                Ok(files) => {
                    working = files;
                    handled.extend(dependencies.iter().map(|d| d.name().to_string()));
                    report.add_outcome(outcome);
                }
                Err(source) => {
                    let blocked = UpdateOutcome::blocked(dependency.clone(), &source);
                    errors.push(OrchestratorError::Apply {
                        dependency: dependency.name().to_string(),
                        source,
                    });
                    report.add_outcome(blocked);
                }
            }
        }
        progress.finish_and_clear();

        report.changed_files = working
            .iter()
            .filter(|file| {
                !parsed
                    .files
                    .iter()
                    .any(|o| o.name() == file.name() && o.content() == file.content())
            })
            .map(|file| file.name().to_string())
            .collect();

        (report, working)
    }

    /// Patches manifests for `dependencies` and takes the resolver's rewrites
    async fn apply_update(
        &self,
        ecosystem: Ecosystem,
        files: &[DependencyFile],
        dependencies: &[Dependency],
        resolver: &dyn Resolver,
    ) -> Result<Vec<DependencyFile>, EngineError> {
        let mut patched = get_updater(ecosystem).apply(files, dependencies)?;
        if ecosystem.lockfile_name().is_none() {
            return Ok(patched);
        }

        for dependency in dependencies {
            let Some(version) = dependency.version() else {
                continue;
            };
            let request = ResolutionRequest {
                files: patched.clone(),
                dependency_name: dependency.name().to_string(),
                previous_version: dependency.previous_version().map(str::to_string),
                candidate_version: version.to_string(),
                credentials: self.config.credentials.clone(),
            };
            let resolved = resolver.resolve(&request).await?;
            for file in resolved.files {
                match patched.iter_mut().find(|f| f.name() == file.name()) {
                    Some(existing) => *existing = file,
                    None => patched.push(file),
                }
            }
            info!(dependency = dependency.name(), version, "refreshed lockfile");
        }
        Ok(patched)
    }
}
