//! Maven repository adapter
//!
//! Reads `maven-metadata.xml` from each configured repository and Maven
//! Central, and downloads parent POMs for property resolution.
//!
//! Layout: {repo}/{group path}/{artifact}/maven-metadata.xml and
//! {repo}/{group path}/{artifact}/{version}/{artifact}-{version}.pom

use crate::domain::Ecosystem;
use crate::error::RegistryError;
use crate::manifest::PomCoordinates;
use crate::property::PomFetcher;
use crate::registry::{HttpClient, RegistryAdapter};
use crate::update::VersionInfo;
use async_trait::async_trait;
use quick_xml::de::from_str;
use serde::Deserialize;
use tracing::{debug, warn};

/// Maven Central base URL
pub const MAVEN_CENTRAL_URL: &str = "https://repo.maven.apache.org/maven2";

/// Maven repository adapter
pub struct MavenRepositoryAdapter {
    client: HttpClient,
    repositories: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct MavenMetadata {
    #[serde(default)]
    versioning: Option<Versioning>,
}

#[derive(Debug, Deserialize)]
struct Versioning {
    #[serde(default)]
    versions: Option<Versions>,
}

#[derive(Debug, Deserialize)]
struct Versions {
    #[serde(default)]
    version: Vec<String>,
}

impl MavenRepositoryAdapter {
    /// Create an adapter consulting `repositories` first, then Maven Central
    pub fn new(client: HttpClient, repositories: Vec<String>) -> Self {
        let mut urls: Vec<String> = Vec::new();
        for url in repositories
            .into_iter()
            .chain(std::iter::once(MAVEN_CENTRAL_URL.to_string()))
        {
            let url = url.trim_end_matches('/').to_string();
            if !url.is_empty() && !urls.contains(&url) {
                urls.push(url);
            }
        }
        Self {
            client,
            repositories: urls,
        }
    }

    /// Repository base URLs in lookup order
    pub fn repositories(&self) -> &[String] {
        &self.repositories
    }

    /// Split `groupId:artifactId` into its parts
    fn split_name(&self, package: &str) -> Result<(String, String), RegistryError> {
        match package.split(':').collect::<Vec<_>>().as_slice() {
            [group, artifact] if !group.is_empty() && !artifact.is_empty() => {
                Ok((group.to_string(), artifact.to_string()))
            }
            _ => Err(RegistryError::InvalidPackageName {
                name: package.to_string(),
                registry: self.registry_name().to_string(),
                reason: "expected format 'groupId:artifactId'".to_string(),
            }),
        }
    }

    fn metadata_url(repository: &str, group: &str, artifact: &str) -> String {
        format!(
            "{}/{}/{}/maven-metadata.xml",
            repository,
            group.replace('.', "/"),
            artifact
        )
    }

    fn pom_url(repository: &str, coordinates: &PomCoordinates, version: &str) -> String {
        format!(
            "{}/{}/{}/{}/{}-{}.pom",
            repository,
            coordinates.group_id.replace('.', "/"),
            coordinates.artifact_id,
            version,
            coordinates.artifact_id,
            version
        )
    }

    /// Parse a `maven-metadata.xml` body into its version list
    fn parse_metadata(body: &str, package: &str, registry: &str) -> Result<Vec<String>, RegistryError> {
        let metadata: MavenMetadata =
            from_str(body).map_err(|e| RegistryError::InvalidResponse {
                package: package.to_string(),
                registry: registry.to_string(),
                message: format!("failed to parse maven-metadata.xml: {}", e),
            })?;

        Ok(metadata
            .versioning
            .and_then(|v| v.versions)
            .map(|v| v.version)
            .unwrap_or_default()
            .into_iter()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .collect())
    }
}

#[async_trait]
impl RegistryAdapter for MavenRepositoryAdapter {
    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Maven
    }

    async fn fetch_versions(&self, package: &str) -> Result<Vec<VersionInfo>, RegistryError> {
        let (group, artifact) = self.split_name(package)?;
        let mut versions = Vec::new();
        let mut failure = None;

        // Every repository contributes; the first to list a version is its source
        for repository in &self.repositories {
            let url = Self::metadata_url(repository, &group, &artifact);
            match self
                .client
                .get_text(&url, package, self.registry_name())
                .await
            {
                Ok(body) => {
                    let listed = Self::parse_metadata(&body, package, self.registry_name())?;
                    debug!(package, repository = repository.as_str(), count = listed.len(), "listed versions");
                    versions.extend(
                        listed
                            .into_iter()
                            .map(|v| VersionInfo::new(v, repository.as_str())),
                    );
                }
                Err(RegistryError::PackageNotFound { .. }) => {}
                Err(e) => {
                    warn!(package, repository = repository.as_str(), error = %e, "repository lookup failed");
                    failure.get_or_insert(e);
                }
            }
        }

        if !versions.is_empty() {
            return Ok(versions);
        }
        Err(failure.unwrap_or_else(|| RegistryError::package_not_found(package, self.registry_name())))
    }
}

#[async_trait]
impl PomFetcher for MavenRepositoryAdapter {
    async fn fetch_pom(&self, coordinates: &PomCoordinates) -> Result<Option<String>, RegistryError> {
        let Some(version) = coordinates.version.as_deref() else {
            return Ok(None);
        };

        let package = coordinates.to_string();
        let mut failure = None;
        for repository in &self.repositories {
            let url = Self::pom_url(repository, coordinates, version);
            match self
                .client
                .get_text(&url, &package, self.registry_name())
                .await
            {
                Ok(body) => return Ok(Some(body)),
                Err(RegistryError::PackageNotFound { .. }) => {}
                Err(e) => {
                    failure.get_or_insert(e);
                }
            }
        }

        match failure {
            Some(e) => Err(e),
            None => Ok(None),
        }
    }
}
