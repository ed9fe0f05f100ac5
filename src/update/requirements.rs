//! Requirement rewriting
//!
//! Moves requirement strings to a target version by substituting the version
//! token inside the declared constraint, so operators, brackets and spacing
//! survive untouched. Compound (comma separated) ranges are never rewritten.

use crate::domain::{Ecosystem, Requirement, Source};
use regex::Regex;
use std::sync::LazyLock;

/// Version literal inside a go.mod require directive
static GO_VERSION_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"v\d+\.\d+\.\d+(?:-[0-9A-Za-z.\-]+)?(?:\+incompatible)?").unwrap()
});

/// Version literal inside a Maven soft requirement or single-version range
static MAVEN_VERSION_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9][0-9A-Za-z._\-+]*").unwrap());

/// Trait for rewriting requirements to a target version
pub trait RequirementsUpdater: Send + Sync {
    fn ecosystem(&self) -> Ecosystem;

    /// Returns `requirements` moved to `target`
    ///
    /// `target` is a normalized version; `None` returns the input unchanged.
    /// Requirements whose constraint changes are tagged with
    /// `Source::Registry{source_url}` when a URL is given.
    fn update(
        &self,
        requirements: &[Requirement],
        target: Option<&str>,
        source_url: Option<&str>,
    ) -> Vec<Requirement>;
}

fn substitute(
    token: &Regex,
    requirements: &[Requirement],
    replacement: Option<String>,
    source_url: Option<&str>,
) -> Vec<Requirement> {
    let Some(replacement) = replacement else {
        return requirements.to_vec();
    };

    requirements
        .iter()
        .map(|req| {
            let Some(constraint) = req.constraint.as_deref() else {
                return req.clone();
            };
            if req.is_range() || !token.is_match(constraint) {
                return req.clone();
            }

            let updated = token.replace(constraint, replacement.as_str());
            if updated == constraint {
                return req.clone();
            }

            let mut changed = req.with_constraint(updated.into_owned());
            if let Some(url) = source_url {
                changed.source = Some(Source::Registry {
                    url: url.to_string(),
                });
            }
            changed
        })
        .collect()
}

pub struct GoRequirementsUpdater;

impl RequirementsUpdater for GoRequirementsUpdater {
    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::GoModules
    }

    fn update(
        &self,
        requirements: &[Requirement],
        target: Option<&str>,
        source_url: Option<&str>,
    ) -> Vec<Requirement> {
        // go.mod literals always carry the `v` prefix
        let replacement = target.map(|t| format!("v{}", t.trim_start_matches('v')));
        substitute(&GO_VERSION_TOKEN, requirements, replacement, source_url)
    }
}

pub struct MavenRequirementsUpdater;

impl RequirementsUpdater for MavenRequirementsUpdater {
    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Maven
    }

    fn update(
        &self,
        requirements: &[Requirement],
        target: Option<&str>,
        source_url: Option<&str>,
    ) -> Vec<Requirement> {
        substitute(
            &MAVEN_VERSION_TOKEN,
            requirements,
            target.map(str::to_string),
            source_url,
        )
    }
}

/// Get the requirements updater for `ecosystem`
pub fn get_requirements_updater(ecosystem: Ecosystem) -> Box<dyn RequirementsUpdater> {
    match ecosystem {
        Ecosystem::GoModules => Box::new(GoRequirementsUpdater),
        Ecosystem::Maven => Box::new(MavenRequirementsUpdater),
    }
}
