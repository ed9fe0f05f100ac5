//! Resolution of `${property}` version indirection in Maven POMs
//!
//! A property is looked up in the declaring file first, then along its
//! parent chain. Parents are identified by coordinates, not paths: first in
//! the in-memory file set, then fetched from the remote repository as a last
//! resort. The walk is iterative and bounded by [`MAX_PARENT_DEPTH`].

use crate::domain::DependencyFile;
use crate::error::{EngineError, RegistryError};
use crate::manifest::pom::PomCoordinates;
use crate::manifest::pom_xml::{parse_document, XmlElement};
use async_trait::async_trait;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, LazyLock, Mutex};
use tracing::{debug, warn};

/// Maximum number of parent links followed from the declaring file
pub const MAX_PARENT_DEPTH: usize = 16;

static TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\$\{([^}]+)\}$").unwrap());

/// Source of remote parent POMs
#[async_trait]
pub trait PomFetcher: Send + Sync {
    /// Fetches the POM for `coordinates`; `Ok(None)` when the repository has none
    async fn fetch_pom(&self, coordinates: &PomCoordinates) -> Result<Option<String>, RegistryError>;
}

/// A property value and where it is defined
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedProperty {
    pub value: String,
    /// Name of the defining file (a synthetic `remote:` name for fetched parents)
    pub file: String,
    /// True if the value lives in a `<properties>` block
    pub in_properties: bool,
    /// True if the defining file came from the remote repository
    pub remote: bool,
}

/// Returns the property name if `raw` is exactly one `${name}` token
pub fn property_token(raw: &str) -> Option<&str> {
    TOKEN_RE
        .captures(raw.trim())
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Strips the `project.` / `pom.` prefixes Maven accepts
pub fn normalize_name(name: &str) -> &str {
    name.strip_prefix("project.")
        .or_else(|| name.strip_prefix("pom."))
        .unwrap_or(name)
}

/// Replaces the first `.` that does not start a numeric run with `/`
fn next_candidate(candidate: &str) -> Option<String> {
    let bytes = candidate.as_bytes();
    let index = (0..bytes.len()).find(|&i| {
        bytes[i] == b'.' && !bytes.get(i + 1).is_some_and(|b| b.is_ascii_digit())
    })?;
    let mut next = candidate.to_string();
    next.replace_range(index..=index, "/");
    Some(next)
}

/// Looks a property up inside one POM without following parents
///
/// Returns the defining element and whether it sits in a properties block.
pub fn find_local<'a>(root: &'a XmlElement, name: &str) -> Option<(&'a XmlElement, bool)> {
    let name = normalize_name(name);
    let mut candidate = name.to_string();

    loop {
        let segments: Vec<&str> = candidate.split('/').collect();

        if let Some(node) = root.descend(&segments).filter(|n| n.children().is_empty()) {
            return Some((node, false));
        }

        let mut in_properties = vec!["properties"];
        in_properties.extend(&segments);
        if let Some(node) = root.descend(&in_properties) {
            return Some((node, true));
        }

        let mut in_profiles = vec!["profiles", "profile", "properties"];
        in_profiles.extend(&segments);
        if let Some(node) = root.select(&in_profiles).into_iter().next() {
            return Some((node, true));
        }

        // project.version and project.groupId fall back to the parent block
        if matches!(candidate.as_str(), "version" | "groupId") {
            if let Some(node) = root.descend(&["parent", candidate.as_str()]) {
                return Some((node, false));
            }
        }

        candidate = next_candidate(&candidate)?;
    }
}

/// Resolves property tokens across a POM hierarchy
pub struct PropertyResolver {
    fetcher: Option<Arc<dyn PomFetcher>>,
    cache: Mutex<HashMap<String, Option<String>>>,
}

impl PropertyResolver {
    /// Creates a resolver that may fetch missing parents remotely
    pub fn new(fetcher: Arc<dyn PomFetcher>) -> Self {
        Self {
            fetcher: Some(fetcher),
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Creates a resolver limited to the in-memory file set
    pub fn offline() -> Self {
        Self {
            fetcher: None,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Resolves `property` as seen from `file`
    ///
    /// Returns `Ok(None)` when no ancestor defines it. Fails with
    /// `DependencyFileNotParseable` naming `file` on a parent cycle or when
    /// the chain is deeper than [`MAX_PARENT_DEPTH`], and with the registry
    /// error when a remote parent could not be fetched.
    pub async fn resolve(
        &self,
        files: &[DependencyFile],
        file: &DependencyFile,
        property: &str,
    ) -> Result<Option<ResolvedProperty>, EngineError> {
        let mut current_name = file.name().to_string();
        let mut current_content = file.content().to_string();
        let mut remote = false;
        let mut visited: HashSet<String> = HashSet::new();

        for _ in 0..=MAX_PARENT_DEPTH {
            let root = parse_document(&current_name, &current_content)?;
            let identity = PomCoordinates::of_project(&root)
                .map(|c| c.to_string())
                .unwrap_or_else(|| current_name.clone());
            if !visited.insert(identity.clone()) {
                return Err(EngineError::not_parseable(
                    file.name(),
                    format!("parent chain contains a cycle at {}", identity),
                ));
            }

            if let Some((node, in_properties)) = find_local(&root, property) {
                return Ok(Some(ResolvedProperty {
                    value: node.text().to_string(),
                    file: current_name,
                    in_properties,
                    remote,
                }));
            }

            let Some(parent) = PomCoordinates::parent_of(&root) else {
                return Ok(None);
            };

            if let Some(local) = find_in_files(files, &parent) {
                current_name = local.name().to_string();
                current_content = local.content().to_string();
                continue;
            }

            match self.fetch_parent(&parent).await? {
                Some(content) => {
                    current_name = format!("remote:{}", parent);
                    current_content = content;
                    remote = true;
                }
                None => {
                    debug!(property, parent = %parent, "parent POM not available");
                    return Ok(None);
                }
            }
        }

        Err(EngineError::not_parseable(
            file.name(),
            format!("parent chain is deeper than {} levels", MAX_PARENT_DEPTH),
        ))
    }

    /// Fetches a parent POM once per identity
    ///
    /// A missing parent is remembered; transport failures are returned and
    /// not cached, so a later lookup tries again.
    async fn fetch_parent(&self, parent: &PomCoordinates) -> Result<Option<String>, EngineError> {
        let key = parent.to_string();
        if let Ok(cache) = self.cache.lock() {
            if let Some(cached) = cache.get(&key) {
                return Ok(cached.clone());
            }
        }

        let Some(fetcher) = self.fetcher.as_ref() else {
            return Ok(None);
        };
        let fetched = match fetcher.fetch_pom(parent).await {
            Ok(content) => content,
            Err(RegistryError::PackageNotFound { .. }) => None,
            Err(e) => {
                warn!(parent = %key, error = %e, "could not fetch parent POM");
                return Err(e.into());
            }
        };

        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(key, fetched.clone());
        }
        Ok(fetched)
    }
}

/// Finds the POM in `files` whose own coordinates match `parent`
fn find_in_files<'a>(files: &'a [DependencyFile], parent: &PomCoordinates) -> Option<&'a DependencyFile> {
    files.iter().filter(|f| f.file_name().ends_with("pom.xml")).find(|f| {
        parse_document(f.name(), f.content())
            .ok()
            .and_then(|root| PomCoordinates::of_project(&root))
            .is_some_and(|own| own.matches(parent))
    })
}
