//! pom.xml parser and updater for Maven projects
//!
//! Handles:
//! - dependencies and dependencyManagement
//! - build plugins and pluginManagement
//! - the same sections inside profiles
//! - `${property}` versions via the PropertyResolver
//! - multi-module builds (internal modules are not dependencies)

use super::pom_xml::{parse_document, XmlElement};
use super::{merge_dependency, replace_span, FileParser, FileUpdater};
use crate::domain::{Dependency, DependencyFile, Ecosystem, Requirement};
use crate::error::EngineError;
use crate::property::{find_local, property_token, PropertyResolver};
use crate::scheme::version_scheme;
use async_trait::async_trait;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

const DEFAULT_PLUGIN_GROUP: &str = "org.apache.maven.plugins";

/// Declaration sections, relative to `<project>` or `<profile>`
const SECTIONS: [(&[&str], &str); 4] = [
    (&["dependencies", "dependency"], "dependencies"),
    (
        &["dependencyManagement", "dependencies", "dependency"],
        "dependency_management",
    ),
    (&["build", "plugins", "plugin"], "plugins"),
    (
        &["build", "pluginManagement", "plugins", "plugin"],
        "plugin_management",
    ),
];

/// Maven coordinates of a POM or of a parent reference
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PomCoordinates {
    pub group_id: String,
    pub artifact_id: String,
    pub version: Option<String>,
}

impl PomCoordinates {
    /// Coordinates of the project itself, inheriting group and version from `<parent>`
    pub fn of_project(root: &XmlElement) -> Option<Self> {
        let parent = root.child("parent");
        let inherited = |name: &str| parent.and_then(|p| p.child_text(name));

        Some(Self {
            group_id: root
                .child_text("groupId")
                .or_else(|| inherited("groupId"))?
                .to_string(),
            artifact_id: root.child_text("artifactId")?.to_string(),
            version: root
                .child_text("version")
                .or_else(|| inherited("version"))
                .map(String::from),
        })
    }

    /// Coordinates declared in the `<parent>` block
    pub fn parent_of(root: &XmlElement) -> Option<Self> {
        let parent = root.child("parent")?;
        Some(Self {
            group_id: parent.child_text("groupId")?.to_string(),
            artifact_id: parent.child_text("artifactId")?.to_string(),
            version: parent.child_text("version").map(String::from),
        })
    }

    /// `groupId:artifactId`
    pub fn name(&self) -> String {
        format!("{}:{}", self.group_id, self.artifact_id)
    }

    /// Same group and artifact, and same version when both sides know it
    pub fn matches(&self, other: &PomCoordinates) -> bool {
        self.group_id == other.group_id
            && self.artifact_id == other.artifact_id
            && match (&self.version, &other.version) {
                (Some(a), Some(b)) => a == b,
                _ => true,
            }
    }
}

impl fmt::Display for PomCoordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(version) => write!(f, "{}:{}:{}", self.group_id, self.artifact_id, version),
            None => write!(f, "{}:{}", self.group_id, self.artifact_id),
        }
    }
}

/// A dependency or plugin element inside a POM
struct Declaration<'a> {
    element: &'a XmlElement,
    group: &'static str,
    is_plugin: bool,
}

impl<'a> Declaration<'a> {
    /// `groupId:artifactId`, with `${project.*}` references expanded
    fn name(&self, own: Option<&PomCoordinates>) -> Option<String> {
        let group = match self.element.child_text("groupId") {
            Some(group) => group,
            None if self.is_plugin => DEFAULT_PLUGIN_GROUP,
            None => return None,
        };
        let artifact = self.element.child_text("artifactId")?;
        let group = expand_project_reference(group, own)?;
        let artifact = expand_project_reference(artifact, own)?;
        Some(format!("{}:{}", group, artifact))
    }

    fn version(&self) -> Option<&'a XmlElement> {
        self.element.child("version").filter(|v| !v.text().is_empty())
    }
}

fn expand_project_reference(value: &str, own: Option<&PomCoordinates>) -> Option<String> {
    if !value.contains("${") {
        return Some(value.to_string());
    }
    let own = own?;
    let expanded = value
        .replace("${project.groupId}", &own.group_id)
        .replace("${project.artifactId}", &own.artifact_id);
    (!expanded.contains("${")).then_some(expanded)
}

/// Every dependency and plugin declaration in document order
fn declarations(root: &XmlElement) -> Vec<Declaration<'_>> {
    let mut scopes = vec![root];
    scopes.extend(root.select(&["profiles", "profile"]));

    let mut found = Vec::new();
    for scope in scopes {
        for (path, group) in SECTIONS {
            for element in scope.select(path) {
                found.push(Declaration {
                    element,
                    group,
                    is_plugin: group.starts_with("plugin"),
                });
            }
        }
    }
    found
}

fn is_pom(file: &DependencyFile) -> bool {
    file.file_name() == "pom.xml"
}

/// Collects `<repository>` URLs declared across the POMs
pub fn repository_urls(files: &[DependencyFile]) -> Vec<String> {
    let mut urls: Vec<String> = Vec::new();
    for file in files.iter().filter(|f| is_pom(f)) {
        let Ok(root) = parse_document(file.name(), file.content()) else {
            continue;
        };
        let mut scopes = vec![&root];
        scopes.extend(root.select(&["profiles", "profile"]));
        for scope in scopes {
            for path in [
                ["repositories", "repository", "url"],
                ["pluginRepositories", "pluginRepository", "url"],
            ] {
                for url in scope.select(&path) {
                    let url = url.text().trim_end_matches('/').to_string();
                    if !url.is_empty() && !urls.contains(&url) {
                        urls.push(url);
                    }
                }
            }
        }
    }
    urls
}

/// Parser for pom.xml files
pub struct PomParser {
    resolver: Arc<PropertyResolver>,
}

impl PomParser {
    pub fn new(resolver: Arc<PropertyResolver>) -> Self {
        Self { resolver }
    }

    async fn parse_file(
        &self,
        files: &[DependencyFile],
        file: &DependencyFile,
        internal: &HashSet<String>,
        dependencies: &mut Vec<Dependency>,
    ) -> Result<(), EngineError> {
        let root = parse_document(file.name(), file.content())?;
        let own = PomCoordinates::of_project(&root);
        let scheme = version_scheme(Ecosystem::Maven);

        for declaration in declarations(&root) {
            let Some(name) = declaration.name(own.as_ref()) else {
                continue;
            };
            let Some(version_node) = declaration.version() else {
                continue;
            };
            if internal.contains(&name) {
                debug!(dependency = %name, "skipping internal module");
                continue;
            }

            let raw = version_node.text();
            let mut requirement = match property_token(raw) {
                Some(property) => {
                    let Some(resolved) = self.resolver.resolve(files, file, property).await? else {
                        debug!(dependency = %name, property, "property not resolvable, skipping");
                        continue;
                    };
                    let external = resolved.remote || !resolved.in_properties;
                    if external {
                        debug!(
                            dependency = %name,
                            property,
                            defined_in = %resolved.file,
                            "property defined outside the project properties"
                        );
                    }
                    let requirement = Requirement::new(Some(resolved.value), file.name())
                        .with_property(property, resolved.file);
                    if external {
                        requirement.as_external()
                    } else {
                        requirement
                    }
                }
                None if raw.contains("${") => {
                    debug!(dependency = %name, version = raw, "interpolated version, skipping");
                    continue;
                }
                None => Requirement::new(Some(raw.to_string()), file.name()),
            };

            requirement = requirement.with_group(declaration.group);
            if let Some(scope) = declaration.element.child_text("scope") {
                requirement = requirement.with_group(scope);
            }

            let version = requirement
                .constraint
                .as_deref()
                .filter(|c| scheme.is_valid(c))
                .map(|c| scheme.normalize(c));

            let dependency =
                Dependency::new(name, version, vec![requirement], Ecosystem::Maven, true)?;
            merge_dependency(dependencies, dependency)?;
        }

        Ok(())
    }
}

#[async_trait]
impl FileParser for PomParser {
    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Maven
    }

    async fn parse(&self, files: &[DependencyFile]) -> Result<Vec<Dependency>, EngineError> {
        let poms: Vec<&DependencyFile> = files
            .iter()
            .filter(|f| is_pom(f) && !f.is_support_file())
            .collect();
        if poms.is_empty() {
            return Err(EngineError::file_not_found("pom.xml"));
        }

        // Fail on any malformed POM before looking at declarations
        let mut internal = HashSet::new();
        for file in files.iter().filter(|f| is_pom(f)) {
            let root = parse_document(file.name(), file.content())?;
            if root.name() != "project" {
                return Err(EngineError::not_parseable(
                    file.name(),
                    format!("expected <project> root element, found <{}>", root.name()),
                ));
            }
            if let Some(own) = PomCoordinates::of_project(&root) {
                internal.insert(own.name());
            }
        }

        let mut dependencies = Vec::new();
        for file in poms {
            self.parse_file(files, file, &internal, &mut dependencies)
                .await?;
        }
        debug!(count = dependencies.len(), "parsed pom.xml files");
        Ok(dependencies)
    }
}

/// Rewrites versions in pom.xml files
///
/// Literal versions are replaced in place. Property-linked versions replace
/// the property value in its defining file, once per property.
pub struct PomUpdater;

impl PomUpdater {
    fn update_declarations(
        file: &DependencyFile,
        dependency: &Dependency,
        old: &str,
        new: &str,
    ) -> Result<String, EngineError> {
        let root = parse_document(file.name(), file.content())?;
        let own = PomCoordinates::of_project(&root);

        let mut spans: Vec<_> = declarations(&root)
            .into_iter()
            .filter(|d| d.name(own.as_ref()).as_deref() == Some(dependency.name()))
            .filter_map(|d| d.version())
            .filter(|v| v.text() == old)
            .map(|v| v.text_span(file.content()))
            .collect();
        // back to front so earlier offsets stay valid
        spans.sort_by_key(|span| std::cmp::Reverse(span.start));

        let mut content = file.content().to_string();
        for span in spans {
            content = replace_span(&content, span, new);
        }
        Ok(content)
    }

    fn update_property(
        file: &DependencyFile,
        property: &str,
        new: &str,
    ) -> Result<String, EngineError> {
        let root = parse_document(file.name(), file.content())?;
        let (node, _) = find_local(&root, property).ok_or_else(|| {
            EngineError::not_parseable(
                file.name(),
                format!("property '{}' is not defined", property),
            )
        })?;
        Ok(replace_span(
            file.content(),
            node.text_span(file.content()),
            new,
        ))
    }
}

impl FileUpdater for PomUpdater {
    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Maven
    }

    fn apply(
        &self,
        files: &[DependencyFile],
        dependencies: &[Dependency],
    ) -> Result<Vec<DependencyFile>, EngineError> {
        let mut updated: Vec<DependencyFile> = files.to_vec();
        let mut applied_properties: HashSet<(String, String)> = HashSet::new();

        for dependency in dependencies {
            for (new, old) in dependency.changed_requirements() {
                let (Some(new_value), Some(old_value)) = (&new.constraint, &old.constraint) else {
                    continue;
                };

                let (target_file, content) = match (&new.property_name, &new.property_file) {
                    (Some(property), Some(defined_in)) => {
                        let key = (property.clone(), defined_in.clone());
                        if applied_properties.contains(&key) {
                            continue;
                        }
                        let file = find_file(&updated, defined_in)?;
                        let content = Self::update_property(file, property, new_value)?;
                        applied_properties.insert(key);
                        (defined_in.as_str(), content)
                    }
                    _ => {
                        let file = find_file(&updated, &new.file)?;
                        let content =
                            Self::update_declarations(file, dependency, old_value, new_value)?;
                        (new.file.as_str(), content)
                    }
                };

                let file = updated
                    .iter_mut()
                    .find(|f| f.name() == target_file)
                    .ok_or_else(|| EngineError::file_not_found(target_file))?;
                if content == file.content() {
                    return Err(EngineError::UnexpectedContentUnchanged {
                        path: target_file.to_string(),
                        dependency: dependency.name().to_string(),
                    });
                }
                debug!(
                    file = target_file,
                    dependency = dependency.name(),
                    from = old_value.as_str(),
                    to = new_value.as_str(),
                    "rewrote version"
                );
                *file = file.with_content(content);
            }
        }

        Ok(updated)
    }
}

fn find_file<'a>(files: &'a [DependencyFile], name: &str) -> Result<&'a DependencyFile, EngineError> {
    files
        .iter()
        .find(|f| f.name() == name)
        .ok_or_else(|| EngineError::file_not_found(name))
}
