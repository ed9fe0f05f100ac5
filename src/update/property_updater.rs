//! Atomic updates of dependencies that share a version property
//!
//! Maven POMs often pin several artifacts through one `${property}`. Moving
//! one of them moves all of them, so the target must be published for every
//! artifact in the group before any requirement changes.

use super::requirements::get_requirements_updater;
use crate::domain::{Dependency, Requirement};
use crate::error::{EngineError, RegistryError};
use crate::registry::RegistryAdapter;
use crate::scheme::{same_version, version_scheme};
use std::sync::Arc;
use tracing::{debug, info};

pub struct PropertyUpdater {
    registry: Arc<dyn RegistryAdapter>,
}

/// (property name, defining file) of a property-linked requirement
fn property_key(requirement: &Requirement) -> Option<(&str, &str)> {
    Some((
        requirement.property_name.as_deref()?,
        requirement.property_file.as_deref()?,
    ))
}

impl PropertyUpdater {
    pub fn new(registry: Arc<dyn RegistryAdapter>) -> Self {
        Self { registry }
    }

    /// Every dependency in `all` linked to the same property as `dependency`
    ///
    /// `dependency` itself comes first.
    pub fn group<'a>(dependency: &'a Dependency, all: &'a [Dependency]) -> Vec<&'a Dependency> {
        let keys: Vec<(&str, &str)> = dependency
            .requirements()
            .iter()
            .filter_map(property_key)
            .collect();

        let mut group = vec![dependency];
        for other in all {
            if other.name() == dependency.name() {
                continue;
            }
            let linked = other
                .requirements()
                .iter()
                .filter_map(property_key)
                .any(|key| keys.contains(&key));
            if linked {
                group.push(other);
            }
        }
        group
    }

    /// Names of group members whose registry does not publish `target`
    ///
    /// An empty result means the property can move. Unreachable registries
    /// are errors, not blockers.
    pub async fn blocking_dependencies(
        &self,
        dependency: &Dependency,
        target: &str,
        all: &[Dependency],
    ) -> Result<Vec<String>, EngineError> {
        let scheme = version_scheme(dependency.ecosystem());
        let mut blocking = Vec::new();

        for member in Self::group(dependency, all).into_iter().skip(1) {
            let published = match self.registry.fetch_versions(member.name()).await {
                Ok(versions) => versions
                    .iter()
                    .any(|info| same_version(scheme, &info.version, target)),
                Err(RegistryError::PackageNotFound { .. }) => false,
                Err(e) => return Err(e.into()),
            };
            if !published {
                debug!(dependency = member.name(), target, "target not published for property member");
                blocking.push(member.name().to_string());
            }
        }
        Ok(blocking)
    }

    /// Returns true when every dependency sharing the property can move to `target`
    pub async fn update_possible(
        &self,
        dependency: &Dependency,
        target: &str,
        all: &[Dependency],
    ) -> Result<bool, EngineError> {
        Ok(self
            .blocking_dependencies(dependency, target, all)
            .await?
            .is_empty())
    }

    /// Moves the whole property group to `target`
    ///
    /// Fails with `PropertyUpdateNotPossible` without producing any change
    /// when one member does not publish the target.
    pub async fn updated_dependencies(
        &self,
        dependency: &Dependency,
        target: &str,
        source_url: Option<&str>,
        all: &[Dependency],
    ) -> Result<Vec<Dependency>, EngineError> {
        let property = dependency.property_name().unwrap_or_default().to_string();
        let blocking = self.blocking_dependencies(dependency, target, all).await?;
        if !blocking.is_empty() {
            return Err(EngineError::PropertyUpdateNotPossible {
                property,
                target: target.to_string(),
                blocking,
            });
        }

        let updater = get_requirements_updater(dependency.ecosystem());

        // Literal declarations of a member move with the property
        let mut updated = Vec::new();
        for member in Self::group(dependency, all) {
            let requirements = updater.update(member.requirements(), Some(target), source_url);
            updated.push(member.with_update(Some(target.to_string()), requirements)?);
        }

        info!(property = property.as_str(), target, count = updated.len(), "updating property group");
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Ecosystem;
    use crate::update::VersionInfo;
    use async_trait::async_trait;
    use std::collections::HashMap;

    struct StaticRegistry(HashMap<&'static str, Vec<&'static str>>);

    #[async_trait]
    impl RegistryAdapter for StaticRegistry {
        fn ecosystem(&self) -> Ecosystem {
            Ecosystem::Maven
        }

        async fn fetch_versions(&self, package: &str) -> Result<Vec<VersionInfo>, RegistryError> {
            match self.0.get(package) {
                Some(versions) => Ok(versions
                    .iter()
                    .map(|v| VersionInfo::new(*v, "https://repo.example.com"))
                    .collect()),
                None => Err(RegistryError::package_not_found(package, "Maven Repository")),
            }
        }
    }

    fn spring(artifact: &str) -> Dependency {
        Dependency::new(
            format!("org.springframework:{}", artifact),
            Some("4.3.12.RELEASE".to_string()),
            vec![Requirement::new(Some("4.3.12.RELEASE".to_string()), "pom.xml")
                .with_property("spring.version", "pom.xml")],
            Ecosystem::Maven,
            true,
        )
        .unwrap()
    }

    fn junit() -> Dependency {
        Dependency::new(
            "junit:junit",
            Some("4.12".to_string()),
            vec![Requirement::new(Some("4.12".to_string()), "pom.xml")],
            Ecosystem::Maven,
            true,
        )
        .unwrap()
    }

    fn registry(beans: Vec<&'static str>) -> Arc<StaticRegistry> {
        let mut versions = HashMap::new();
        versions.insert(
            "org.springframework:spring-context",
            vec!["4.3.12.RELEASE", "4.3.15.RELEASE"],
        );
        versions.insert("org.springframework:spring-beans", beans);
        Arc::new(StaticRegistry(versions))
    }

    #[test]
    fn test_group_collects_property_siblings() {
        let all = vec![spring("spring-context"), junit(), spring("spring-beans")];
        let group = PropertyUpdater::group(&all[0], &all);
        let names: Vec<&str> = group.iter().map(|d| d.name()).collect();
        assert_eq!(
            names,
            vec!["org.springframework:spring-context", "org.springframework:spring-beans"]
        );
    }

    #[tokio::test]
    async fn test_updates_whole_group() {
        let all = vec![spring("spring-context"), spring("spring-beans"), junit()];
        let updater = PropertyUpdater::new(registry(vec!["4.3.12.RELEASE", "4.3.15.RELEASE"]));

        let updated = updater
            .updated_dependencies(&all[0], "4.3.15.RELEASE", None, &all)
            .await
            .unwrap();

        assert_eq!(updated.len(), 2);
        for dep in &updated {
            assert_eq!(dep.version(), Some("4.3.15.RELEASE"));
            assert_eq!(dep.previous_version(), Some("4.3.12.RELEASE"));
            assert_eq!(
                dep.requirements()[0].constraint.as_deref(),
                Some("4.3.15.RELEASE")
            );
        }
    }

    #[tokio::test]
    async fn test_literal_declarations_of_member_move_with_group() {
        let context = Dependency::new(
            "org.springframework:spring-context",
            Some("4.3.12.RELEASE".to_string()),
            vec![
                Requirement::new(Some("4.3.12.RELEASE".to_string()), "pom.xml")
                    .with_property("spring.version", "pom.xml"),
                Requirement::new(Some("4.3.12.RELEASE".to_string()), "web/pom.xml"),
            ],
            Ecosystem::Maven,
            true,
        )
        .unwrap();
        let all = vec![context, spring("spring-beans")];
        let updater = PropertyUpdater::new(registry(vec!["4.3.15.RELEASE"]));

        let updated = updater
            .updated_dependencies(&all[0], "4.3.15.RELEASE", None, &all)
            .await
            .unwrap();

        let context = &updated[0];
        assert_eq!(context.version(), Some("4.3.15.RELEASE"));
        let web = context.requirement_for("web/pom.xml").unwrap();
        assert_eq!(web.constraint.as_deref(), Some("4.3.15.RELEASE"));
        assert!(web.property_name.is_none());
        assert_eq!(context.changed_requirements().len(), 2);
    }

    #[tokio::test]
    async fn test_missing_member_blocks_group() {
        let all = vec![spring("spring-context"), spring("spring-beans")];
        let updater = PropertyUpdater::new(registry(vec!["4.3.12.RELEASE"]));

        assert!(!updater
            .update_possible(&all[0], "4.3.15.RELEASE", &all)
            .await
            .unwrap());

        let err = updater
            .updated_dependencies(&all[0], "4.3.15.RELEASE", None, &all)
            .await
            .unwrap_err();
        match err {
            EngineError::PropertyUpdateNotPossible {
                property, blocking, ..
            } => {
                assert_eq!(property, "spring.version");
                assert_eq!(blocking, vec!["org.springframework:spring-beans".to_string()]);
            }
            other => panic!("unexpected error: {}", other),
        }
    }
}
