//! Maven resolver
//!
//! Maven has no lockfile. A candidate resolves when at least one configured
//! repository publishes it; listings are cached for the lifetime of the
//! resolver.

use super::{ResolutionRequest, ResolvedFiles, Resolver};
use crate::domain::Ecosystem;
use crate::error::{EngineError, RegistryError};
use crate::registry::RegistryAdapter;
use crate::scheme::{same_version, version_scheme};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

pub struct MavenResolver {
    registry: Arc<dyn RegistryAdapter>,
    listings: Mutex<HashMap<String, Vec<String>>>,
}

impl MavenResolver {
    pub fn new(registry: Arc<dyn RegistryAdapter>) -> Self {
        Self {
            registry,
            listings: Mutex::new(HashMap::new()),
        }
    }

    async fn published_versions(&self, name: &str) -> Result<Vec<String>, EngineError> {
        let mut listings = self.listings.lock().await;
        if let Some(versions) = listings.get(name) {
            return Ok(versions.clone());
        }

        let versions: Vec<String> = match self.registry.fetch_versions(name).await {
            Ok(infos) => infos.into_iter().map(|info| info.version).collect(),
            Err(RegistryError::PackageNotFound { .. }) => {
                return Err(EngineError::not_resolvable(format!(
                    "{} is not published in any configured repository",
                    name
                )))
            }
            Err(RegistryError::AuthenticationError { url, .. }) => {
                return Err(EngineError::private_source(url))
            }
            Err(e) => return Err(e.into()),
        };

        listings.insert(name.to_string(), versions.clone());
        Ok(versions)
    }
}

#[async_trait]
impl Resolver for MavenResolver {
    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Maven
    }

    async fn resolve(&self, request: &ResolutionRequest) -> Result<ResolvedFiles, EngineError> {
        let scheme = version_scheme(Ecosystem::Maven);
        let name = request.dependency_name.as_str();
        let versions = self.published_versions(name).await?;

        match versions
            .iter()
            .find(|v| same_version(scheme, v, &request.candidate_version))
        {
            Some(version) => {
                debug!(dependency = name, version = version.as_str(), "candidate is published");
                Ok(ResolvedFiles {
                    version: version.clone(),
                    files: Vec::new(),
                })
            }
            None => Err(EngineError::not_resolvable(format!(
                "{} {} is not available in any configured repository",
                name, request.candidate_version
            ))),
        }
    }
}
