//! Integration tests for depshift
//!
//! These tests drive the library end to end on temporary project
//! directories, with registries and native resolvers replaced by in-memory
//! fakes.

use async_trait::async_trait;
use depshift::config::EngineConfig;
use depshift::conflict::{ConflictResolver, NoLockfileInspector};
use depshift::domain::{
    Dependency, DependencyFile, Ecosystem, NotPossibleReason, SkipReason, UpdateOutcome,
};
use depshift::error::{EngineError, RegistryError};
use depshift::manifest::{get_parser, get_updater, FileParser, FileUpdater};
use depshift::manifest::PomCoordinates;
use depshift::orchestrator::{EcosystemServices, Orchestrator, OrchestratorError, OrchestratorResult};
use depshift::property::PomFetcher;
use depshift::registry::RegistryAdapter;
use depshift::resolver::{
    get_resolver, ResolutionRequest, ResolvedFiles, Resolver, SystemCommandRunner,
};
use depshift::update::{CheckerContext, UpdateChecker, UpdateFilter, VersionInfo};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

const GO_MOD: &str = "module example.com/app

go 1.21

require (
\trsc.io/quote v1.4.0
\tgolang.org/x/text v0.3.0 // indirect
)
";

const SPRING_POM: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<project>
  <modelVersion>4.0.0</modelVersion>
  <groupId>com.example</groupId>
  <artifactId>app</artifactId>
  <version>1.0.0</version>
  <properties>
    <springframework.version>4.3.12.RELEASE</springframework.version>
  </properties>
  <dependencies>
    <dependency>
      <groupId>org.springframework</groupId>
      <artifactId>spring-context</artifactId>
      <version>${springframework.version}</version>
    </dependency>
    <dependency>
      <groupId>org.springframework</groupId>
      <artifactId>spring-beans</artifactId>
      <version>${springframework.version}</version>
    </dependency>
    <dependency>
      <groupId>com.google.guava</groupId>
      <artifactId>guava</artifactId>
      <version>23.3-jre</version>
    </dependency>
    <dependency>
      <groupId>junit</groupId>
      <artifactId>junit</artifactId>
      <version>[4.0,5.0)</version>
      <scope>test</scope>
    </dependency>
  </dependencies>
</project>
"#;

// =============================================================================
// Test doubles
// =============================================================================

/// Registry that lists fixed versions per package
struct FakeRegistry {
    ecosystem: Ecosystem,
    listings: HashMap<String, Vec<&'static str>>,
}

impl FakeRegistry {
    fn new(ecosystem: Ecosystem) -> Self {
        Self {
            ecosystem,
            listings: HashMap::new(),
        }
    }

    fn with(mut self, package: &str, versions: Vec<&'static str>) -> Self {
        self.listings.insert(package.to_string(), versions);
        self
    }
}

#[async_trait]
impl RegistryAdapter for FakeRegistry {
    fn ecosystem(&self) -> Ecosystem {
        self.ecosystem
    }

    async fn fetch_versions(&self, package: &str) -> Result<Vec<VersionInfo>, RegistryError> {
        let versions = self
            .listings
            .get(package)
            .ok_or_else(|| RegistryError::package_not_found(package, "fake"))?;
        Ok(versions
            .iter()
            .map(|v| VersionInfo::new(*v, "https://registry.example.com"))
            .collect())
    }
}

/// Go resolver that accepts every candidate and regenerates go.sum
#[derive(Default)]
struct FakeGoResolver {
    requests: Mutex<Vec<String>>,
}

#[async_trait]
impl Resolver for FakeGoResolver {
    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::GoModules
    }

    async fn resolve(&self, request: &ResolutionRequest) -> Result<ResolvedFiles, EngineError> {
        self.requests
            .lock()
            .unwrap()
            .push(format!("{}@{}", request.dependency_name, request.candidate_version));
        Ok(ResolvedFiles {
            version: request.candidate_version.clone(),
            files: vec![DependencyFile::new(
                "go.sum",
                format!(
                    "{} v{} h1:fake=\n",
                    request.dependency_name, request.candidate_version
                ),
            )],
        })
    }
}

/// Parent POM repository that is either down or serves one fixed POM
struct FakeParentRepository {
    parent: Option<&'static str>,
}

#[async_trait]
impl PomFetcher for FakeParentRepository {
    async fn fetch_pom(&self, coordinates: &PomCoordinates) -> Result<Option<String>, RegistryError> {
        match self.parent {
            Some(parent) => Ok(Some(parent.to_string())),
            None => Err(RegistryError::unreachable(
                coordinates.to_string(),
                "fake",
                "connection refused",
            )),
        }
    }
}

fn no_conflicts() -> Arc<ConflictResolver> {
    Arc::new(ConflictResolver::new(Arc::new(NoLockfileInspector)))
}

fn go_services(registry: FakeRegistry, resolver: Arc<FakeGoResolver>) -> EcosystemServices {
    EcosystemServices {
        registry: Arc::new(registry),
        pom_fetcher: None,
        resolver,
        conflicts: no_conflicts(),
    }
}

fn maven_services(registry: FakeRegistry) -> EcosystemServices {
    let registry: Arc<dyn RegistryAdapter> = Arc::new(registry);
    EcosystemServices {
        resolver: get_resolver(
            Ecosystem::Maven,
            Arc::new(SystemCommandRunner::new()),
            registry.clone(),
            &EngineConfig::default(),
        ),
        registry,
        pom_fetcher: None,
        conflicts: no_conflicts(),
    }
}

fn spring_registry(beans_versions: Vec<&'static str>) -> FakeRegistry {
    FakeRegistry::new(Ecosystem::Maven)
        .with(
            "org.springframework:spring-context",
            vec!["23.6-jre", "5.0.0.RELEASE", "4.3.12.RELEASE"],
        )
        .with("org.springframework:spring-beans", beans_versions)
        .with("com.google.guava:guava", vec!["23.6-jre", "23.5-jre", "23.3-jre"])
}

fn project(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for (name, content) in files {
        let path = dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }
    dir
}

fn orchestrator(dir: &Path, config: EngineConfig, filter: UpdateFilter) -> Orchestrator {
    Orchestrator::new(dir, config, filter).unwrap()
}

fn outcome<'a>(result: &'a OrchestratorResult, name: &str) -> &'a UpdateOutcome {
    result
        .summary
        .all_outcomes()
        .find(|o| o.package_name() == name)
        .unwrap_or_else(|| panic!("no outcome for {}", name))
}

async fn parse(ecosystem: Ecosystem, files: &[DependencyFile]) -> Result<Vec<Dependency>, EngineError> {
    get_parser(ecosystem, None).parse(files).await
}

fn checker(
    dependency: &Dependency,
    files: &[DependencyFile],
    dependencies: &[Dependency],
    services: &EcosystemServices,
) -> UpdateChecker {
    UpdateChecker::new(
        dependency.clone(),
        files.to_vec(),
        dependencies.to_vec(),
        CheckerContext {
            registry: services.registry.clone(),
            resolver: services.resolver.clone(),
            conflicts: services.conflicts.clone(),
            config: Arc::new(EngineConfig::default()),
        },
    )
}

// =============================================================================
// Parsing scenarios
// =============================================================================

#[tokio::test]
async fn test_go_literal_requirement_is_parsed() {
    let files = vec![DependencyFile::new(
        "go.mod",
        "module example.com/app\n\nrequire rsc.io/quote v1.4.0\n",
    )];
    let deps = parse(Ecosystem::GoModules, &files).await.unwrap();

    assert_eq!(deps.len(), 1);
    assert_eq!(deps[0].name(), "rsc.io/quote");
    assert_eq!(deps[0].version(), Some("1.4.0"));
    assert_eq!(deps[0].requirements().len(), 1);
    assert_eq!(deps[0].requirements()[0].constraint.as_deref(), Some("v1.4.0"));
}

#[tokio::test]
async fn test_go_major_version_without_suffix_is_rejected() {
    let files = vec![DependencyFile::new(
        "go.mod",
        "module example.com/app\n\nrequire github.com/foo/bar v2.0.0\n",
    )];
    match parse(Ecosystem::GoModules, &files).await {
        Err(EngineError::DependencyFileNotParseable { path, message }) => {
            assert_eq!(path, "go.mod");
            assert!(message.contains("v0 or v1"));
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn test_garbage_manifest_names_the_file() {
    let files = vec![
        DependencyFile::new("pom.xml", SPRING_POM),
        DependencyFile::new("service/pom.xml", "<project><dependencies>"),
    ];
    match parse(Ecosystem::Maven, &files).await {
        Err(EngineError::DependencyFileNotParseable { path, .. }) => {
            assert_eq!(path, "service/pom.xml");
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

// =============================================================================
// Update checks
// =============================================================================

#[tokio::test]
async fn test_property_batch_moves_shared_value() {
    let files = vec![DependencyFile::new("pom.xml", SPRING_POM)];
    let deps = parse(Ecosystem::Maven, &files).await.unwrap();
    let context = deps
        .iter()
        .find(|d| d.name() == "org.springframework:spring-context")
        .unwrap();
    let services = maven_services(spring_registry(vec!["23.6-jre", "4.3.12.RELEASE"]));

    let checker = checker(context, &files, &deps, &services).with_requested_version("23.6-jre");
    let UpdateOutcome::Updated { dependencies, .. } = checker.check().await else {
        panic!("expected an update");
    };
    let mut names: Vec<&str> = dependencies.iter().map(|d| d.name()).collect();
    names.sort();
    assert_eq!(
        names,
        vec!["org.springframework:spring-beans", "org.springframework:spring-context"]
    );

    let patched = get_updater(Ecosystem::Maven)
        .apply(&files, &dependencies)
        .unwrap();
    let content = patched[0].content();
    assert!(content.contains("<springframework.version>23.6-jre</springframework.version>"));
    assert_eq!(content.matches("${springframework.version}").count(), 2);
    assert!(content.contains("<version>23.3-jre</version>"));
}

#[tokio::test]
async fn test_property_batch_is_atomic() {
    let files = vec![DependencyFile::new("pom.xml", SPRING_POM)];
    let deps = parse(Ecosystem::Maven, &files).await.unwrap();
    let context = deps
        .iter()
        .find(|d| d.name() == "org.springframework:spring-context")
        .unwrap();
    let services = maven_services(spring_registry(vec!["5.0.0.RELEASE", "4.3.12.RELEASE"]));

    let checker = checker(context, &files, &deps, &services).with_requested_version("23.6-jre");
    match checker.check().await {
        UpdateOutcome::NotPossible {
            reason: NotPossibleReason::PropertyConflict { property, blocking, .. },
            ..
        } => {
            assert_eq!(property, "springframework.version");
            assert_eq!(blocking, vec!["org.springframework:spring-beans".to_string()]);
        }
        other => panic!("unexpected outcome: {}", other),
    }
}

#[tokio::test]
async fn test_requested_version_absent_from_registry() {
    let files = vec![DependencyFile::new("pom.xml", SPRING_POM)];
    let deps = parse(Ecosystem::Maven, &files).await.unwrap();
    let guava = deps
        .iter()
        .find(|d| d.name() == "com.google.guava:guava")
        .unwrap();
    let services = maven_services(spring_registry(vec![]));

    let checker = checker(guava, &files, &deps, &services).with_requested_version("99.0-jre");
    let err = checker.latest_resolvable_version().await.unwrap_err();
    assert!(matches!(err, EngineError::DependencyFileNotResolvable { .. }));
}

// =============================================================================
// Orchestrated runs
// =============================================================================

#[tokio::test]
async fn test_go_project_update_writes_manifest_and_lockfile() {
    let dir = project(&[("go.mod", GO_MOD)]);
    let resolver = Arc::new(FakeGoResolver::default());
    let registry = FakeRegistry::new(Ecosystem::GoModules)
        .with("rsc.io/quote", vec!["1.5.2", "1.5.1", "1.4.0"])
        .with("golang.org/x/text", vec!["0.14.0", "0.3.0"]);

    let result = orchestrator(dir.path(), EngineConfig::default(), UpdateFilter::new())
        .with_services(Ecosystem::GoModules, go_services(registry, resolver.clone()))
        .run()
        .await;

    assert!(result.errors.is_empty());
    assert_eq!(result.summary.total_updates(), 1);
    assert!(matches!(
        outcome(&result, "golang.org/x/text"),
        UpdateOutcome::Skipped { reason: SkipReason::Indirect, .. }
    ));

    let go_mod = fs::read_to_string(dir.path().join("go.mod")).unwrap();
    assert_eq!(go_mod, GO_MOD.replace("rsc.io/quote v1.4.0", "rsc.io/quote v1.5.2"));
    let go_sum = fs::read_to_string(dir.path().join("go.sum")).unwrap();
    assert_eq!(go_sum, "rsc.io/quote v1.5.2 h1:fake=\n");

    let report = &result.summary.ecosystems[0];
    assert_eq!(report.changed_files, vec!["go.mod".to_string(), "go.sum".to_string()]);
    assert!(resolver
        .requests
        .lock()
        .unwrap()
        .contains(&"rsc.io/quote@1.5.2".to_string()));
}

#[tokio::test]
async fn test_dry_run_writes_nothing() {
    let dir = project(&[("go.mod", GO_MOD)]);
    let registry =
        FakeRegistry::new(Ecosystem::GoModules).with("rsc.io/quote", vec!["1.5.2", "1.4.0"]);

    let result = orchestrator(dir.path(), EngineConfig::default(), UpdateFilter::new())
        .with_dry_run(true)
        .with_services(
            Ecosystem::GoModules,
            go_services(registry, Arc::new(FakeGoResolver::default())),
        )
        .run()
        .await;

    assert_eq!(result.summary.total_updates(), 1);
    assert!(result.write_results.iter().all(|w| !w.file_modified));
    assert_eq!(fs::read_to_string(dir.path().join("go.mod")).unwrap(), GO_MOD);
    assert!(!dir.path().join("go.sum").exists());
}

#[tokio::test]
async fn test_second_run_is_idempotent() {
    let dir = project(&[("go.mod", GO_MOD)]);
    let run = || async {
        let registry =
            FakeRegistry::new(Ecosystem::GoModules).with("rsc.io/quote", vec!["1.5.2", "1.4.0"]);
        orchestrator(dir.path(), EngineConfig::default(), UpdateFilter::new())
            .with_services(
                Ecosystem::GoModules,
                go_services(registry, Arc::new(FakeGoResolver::default())),
            )
            .run()
            .await
    };

    let first = run().await;
    assert_eq!(first.summary.total_updates(), 1);
    let after_first = fs::read_to_string(dir.path().join("go.mod")).unwrap();

    let second = run().await;
    assert_eq!(second.summary.total_updates(), 0);
    assert!(matches!(
        outcome(&second, "rsc.io/quote"),
        UpdateOutcome::UpToDate { .. }
    ));
    assert!(second.write_results.is_empty());
    assert_eq!(fs::read_to_string(dir.path().join("go.mod")).unwrap(), after_first);
}

#[tokio::test]
async fn test_maven_update_leaves_other_declarations_untouched() {
    let dir = project(&[("pom.xml", SPRING_POM)]);
    let registry = spring_registry(vec!["5.0.0.RELEASE", "4.3.12.RELEASE"]);
    let filter = UpdateFilter::new().with_only(vec!["com.google.guava:guava".to_string()]);

    let result = orchestrator(dir.path(), EngineConfig::default(), filter)
        .with_services(Ecosystem::Maven, maven_services(registry))
        .run()
        .await;

    assert!(result.errors.is_empty());
    let pom = fs::read_to_string(dir.path().join("pom.xml")).unwrap();
    assert_eq!(pom, SPRING_POM.replace("23.3-jre", "23.6-jre"));
    assert!(pom.contains("<version>[4.0,5.0)</version>"));
    assert!(matches!(
        outcome(&result, "org.springframework:spring-context"),
        UpdateOutcome::Skipped { reason: SkipReason::NotInOnlyList, .. }
    ));
}

#[tokio::test]
async fn test_maven_range_requirement_is_not_rewritten() {
    let dir = project(&[("pom.xml", SPRING_POM)]);
    let registry = spring_registry(vec![]).with("junit:junit", vec!["4.13.2", "4.12"]);
    let filter = UpdateFilter::new().with_only(vec!["junit:junit".to_string()]);

    let result = orchestrator(dir.path(), EngineConfig::default(), filter)
        .with_services(Ecosystem::Maven, maven_services(registry))
        .run()
        .await;

    assert!(matches!(
        outcome(&result, "junit:junit"),
        UpdateOutcome::Skipped { reason: SkipReason::NoVersion, .. }
    ));
    assert_eq!(fs::read_to_string(dir.path().join("pom.xml")).unwrap(), SPRING_POM);
}

#[tokio::test]
async fn test_blocked_property_update_changes_no_file() {
    let dir = project(&[("pom.xml", SPRING_POM)]);
    // spring-beans disappeared from the registry; spring-context can move
    let registry = FakeRegistry::new(Ecosystem::Maven).with(
        "org.springframework:spring-context",
        vec!["5.0.0.RELEASE", "4.3.12.RELEASE"],
    );
    let filter = UpdateFilter::new().with_only(vec![
        "org.springframework:spring-context".to_string(),
        "org.springframework:spring-beans".to_string(),
    ]);

    let result = orchestrator(dir.path(), EngineConfig::default(), filter)
        .with_services(Ecosystem::Maven, maven_services(registry))
        .run()
        .await;

    assert_eq!(result.summary.total_updates(), 0);
    assert!(matches!(
        outcome(&result, "org.springframework:spring-context"),
        UpdateOutcome::NotPossible {
            reason: NotPossibleReason::PropertyConflict { .. },
            ..
        }
    ));
    assert_eq!(fs::read_to_string(dir.path().join("pom.xml")).unwrap(), SPRING_POM);
}

#[tokio::test]
async fn test_property_group_rewrites_literal_module_declarations() {
    let web_pom = r#"<project>
  <modelVersion>4.0.0</modelVersion>
  <groupId>com.example</groupId>
  <artifactId>web</artifactId>
  <version>1.0.0</version>
  <dependencies>
    <dependency>
      <groupId>org.springframework</groupId>
      <artifactId>spring-context</artifactId>
      <version>4.3.12.RELEASE</version>
    </dependency>
  </dependencies>
</project>
"#;
    let dir = project(&[("pom.xml", SPRING_POM), ("web/pom.xml", web_pom)]);
    let registry = FakeRegistry::new(Ecosystem::Maven)
        .with(
            "org.springframework:spring-context",
            vec!["5.0.0.RELEASE", "4.3.12.RELEASE"],
        )
        .with(
            "org.springframework:spring-beans",
            vec!["5.0.0.RELEASE", "4.3.12.RELEASE"],
        );
    let filter = UpdateFilter::new().with_only(vec![
        "org.springframework:spring-context".to_string(),
        "org.springframework:spring-beans".to_string(),
    ]);

    let result = orchestrator(dir.path(), EngineConfig::default(), filter)
        .with_services(Ecosystem::Maven, maven_services(registry))
        .run()
        .await;

    assert!(result.errors.is_empty());
    let root = fs::read_to_string(dir.path().join("pom.xml")).unwrap();
    assert!(root.contains("<springframework.version>5.0.0.RELEASE</springframework.version>"));
    let web = fs::read_to_string(dir.path().join("web/pom.xml")).unwrap();
    assert_eq!(web, web_pom.replace("4.3.12.RELEASE", "5.0.0.RELEASE"));
}

const CHILD_OF_REMOTE_POM: &str = r#"<project>
  <modelVersion>4.0.0</modelVersion>
  <parent>
    <groupId>org.acme</groupId>
    <artifactId>base</artifactId>
    <version>7</version>
  </parent>
  <artifactId>app</artifactId>
  <dependencies>
    <dependency>
      <groupId>org.acme</groupId>
      <artifactId>lib</artifactId>
      <version>${lib.version}</version>
    </dependency>
    <dependency>
      <groupId>com.google.guava</groupId>
      <artifactId>guava</artifactId>
      <version>23.3-jre</version>
    </dependency>
  </dependencies>
</project>
"#;

#[tokio::test]
async fn test_version_from_remote_parent_is_skipped() {
    let dir = project(&[("pom.xml", CHILD_OF_REMOTE_POM)]);
    let registry = spring_registry(vec![]).with("org.acme:lib", vec!["3.0.0", "2.1.0"]);
    let mut services = maven_services(registry);
    services.pom_fetcher = Some(Arc::new(FakeParentRepository {
        parent: Some(
            "<project><groupId>org.acme</groupId><artifactId>base</artifactId><version>7</version>\
             <properties><lib.version>2.1.0</lib.version></properties></project>",
        ),
    }));

    let result = orchestrator(dir.path(), EngineConfig::default(), UpdateFilter::new())
        .with_services(Ecosystem::Maven, services)
        .run()
        .await;

    assert!(result.errors.is_empty());
    assert!(matches!(
        outcome(&result, "org.acme:lib"),
        UpdateOutcome::Skipped { reason: SkipReason::ExternalVersion, .. }
    ));
    let pom = fs::read_to_string(dir.path().join("pom.xml")).unwrap();
    assert_eq!(pom, CHILD_OF_REMOTE_POM.replace("23.3-jre", "23.6-jre"));
}

#[tokio::test]
async fn test_unreachable_parent_repository_fails_the_ecosystem() {
    let dir = project(&[("pom.xml", CHILD_OF_REMOTE_POM)]);
    let mut services = maven_services(spring_registry(vec![]));
    services.pom_fetcher = Some(Arc::new(FakeParentRepository { parent: None }));

    let result = orchestrator(dir.path(), EngineConfig::default(), UpdateFilter::new())
        .with_services(Ecosystem::Maven, services)
        .run()
        .await;

    assert_eq!(result.errors.len(), 1);
    match &result.errors[0] {
        OrchestratorError::Ecosystem { source, .. } => assert!(source.is_unreachable()),
        other => panic!("unexpected error: {}", other),
    }
    assert_eq!(
        fs::read_to_string(dir.path().join("pom.xml")).unwrap(),
        CHILD_OF_REMOTE_POM
    );
}

#[tokio::test]
async fn test_broken_ecosystem_does_not_stop_others() {
    let dir = project(&[("go.mod", GO_MOD), ("pom.xml", "garbage")]);
    let registry =
        FakeRegistry::new(Ecosystem::GoModules).with("rsc.io/quote", vec!["1.5.2", "1.4.0"]);

    let result = orchestrator(dir.path(), EngineConfig::default(), UpdateFilter::new())
        .with_services(
            Ecosystem::GoModules,
            go_services(registry, Arc::new(FakeGoResolver::default())),
        )
        .with_services(Ecosystem::Maven, maven_services(spring_registry(vec![])))
        .run()
        .await;

    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].to_string().contains("pom.xml"));
    assert_eq!(result.summary.total_updates(), 1);
}

// =============================================================================
// Round trip
// =============================================================================

#[tokio::test]
async fn test_round_trip_per_ecosystem() {
    let go_files = vec![DependencyFile::new("go.mod", GO_MOD)];
    let deps = parse(Ecosystem::GoModules, &go_files).await.unwrap();
    let quote = deps.iter().find(|d| d.name() == "rsc.io/quote").unwrap();
    let updated = quote
        .with_update(
            Some("1.5.2".to_string()),
            vec![quote.requirements()[0].with_constraint("v1.5.2")],
        )
        .unwrap();
    let patched = get_updater(Ecosystem::GoModules)
        .apply(&go_files, &[updated])
        .unwrap();
    let reparsed = parse(Ecosystem::GoModules, &patched).await.unwrap();
    let quote = reparsed.iter().find(|d| d.name() == "rsc.io/quote").unwrap();
    assert_eq!(quote.version(), Some("1.5.2"));

    let pom_files = vec![DependencyFile::new("pom.xml", SPRING_POM)];
    let deps = parse(Ecosystem::Maven, &pom_files).await.unwrap();
    let guava = deps
        .iter()
        .find(|d| d.name() == "com.google.guava:guava")
        .unwrap();
    let updated = guava
        .with_update(
            Some("23.6-jre".to_string()),
            vec![guava.requirements()[0].with_constraint("23.6-jre")],
        )
        .unwrap();
    let patched = get_updater(Ecosystem::Maven)
        .apply(&pom_files, &[updated])
        .unwrap();
    let reparsed = parse(Ecosystem::Maven, &patched).await.unwrap();
    let guava = reparsed
        .iter()
        .find(|d| d.name() == "com.google.guava:guava")
        .unwrap();
    assert_eq!(guava.version(), Some("23.6-jre"));
}
