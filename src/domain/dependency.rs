//! Dependency information structures

use super::{Ecosystem, Requirement};
use crate::error::EngineError;
use crate::scheme::version_scheme;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

/// A dependency merged across every file that declares it
///
/// Constructed once per run by a file parser. Updates produce a new value
/// through [`Dependency::with_update`], which records the previous version
/// and requirements for diffing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dependency {
    name: String,
    version: Option<String>,
    requirements: Vec<Requirement>,
    #[serde(skip_serializing_if = "Option::is_none")]
    previous_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    previous_requirements: Option<Vec<Requirement>>,
    ecosystem: Ecosystem,
    top_level: bool,
}

impl Dependency {
    /// Creates a dependency, enforcing the model invariants
    pub fn new(
        name: impl Into<String>,
        version: Option<String>,
        requirements: Vec<Requirement>,
        ecosystem: Ecosystem,
        top_level: bool,
    ) -> Result<Self, EngineError> {
        let dependency = Self {
            name: name.into(),
            version,
            requirements,
            previous_version: None,
            previous_requirements: None,
            ecosystem,
            top_level,
        };
        dependency.validate()?;
        Ok(dependency)
    }

    /// Returns a new dependency at `version` with `requirements`, keeping this one as previous
    pub fn with_update(
        &self,
        version: Option<String>,
        requirements: Vec<Requirement>,
    ) -> Result<Self, EngineError> {
        let dependency = Self {
            name: self.name.clone(),
            version,
            requirements,
            previous_version: self.version.clone(),
            previous_requirements: Some(self.requirements.clone()),
            ecosystem: self.ecosystem,
            top_level: self.top_level,
        };
        dependency.validate()?;
        Ok(dependency)
    }

    /// Returns a new dependency with `extra` requirements appended
    ///
    /// Requirements for a file that is already present are ignored, which
    /// keeps the first declaration seen per file.
    pub fn merged_with(&self, extra: &[Requirement], top_level: bool) -> Result<Self, EngineError> {
        let mut requirements = self.requirements.clone();
        for req in extra {
            if !requirements.iter().any(|r| r.file == req.file) {
                requirements.push(req.clone());
            }
        }
        let dependency = Self {
            requirements,
            version: self.version.clone(),
            top_level: self.top_level || top_level,
            ..self.clone()
        };
        dependency.validate()?;
        Ok(dependency)
    }

    fn validate(&self) -> Result<(), EngineError> {
        if self.requirements.is_empty() {
            return Err(self.invalid("requirements must not be empty"));
        }

        let mut seen = HashSet::new();
        for req in &self.requirements {
            if !seen.insert(req.file.as_str()) {
                return Err(self.invalid(format!("duplicate requirement for file {}", req.file)));
            }
        }

        if let Some(version) = &self.version {
            if !version_scheme(self.ecosystem).is_valid(version) {
                return Err(self.invalid(format!("'{}' is not a valid version", version)));
            }
        }

        Ok(())
    }

    fn invalid(&self, message: impl Into<String>) -> EngineError {
        EngineError::InvalidModel {
            name: self.name.clone(),
            message: message.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn requirements(&self) -> &[Requirement] {
        &self.requirements
    }

    pub fn previous_version(&self) -> Option<&str> {
        self.previous_version.as_deref()
    }

    pub fn previous_requirements(&self) -> Option<&[Requirement]> {
        self.previous_requirements.as_deref()
    }

    pub fn ecosystem(&self) -> Ecosystem {
        self.ecosystem
    }

    pub fn is_top_level(&self) -> bool {
        self.top_level
    }

    /// Property name shared by this dependency's declarations, if any
    pub fn property_name(&self) -> Option<&str> {
        self.requirements
            .iter()
            .find_map(|r| r.property_name.as_deref())
    }

    /// Requirement declared in `file`
    pub fn requirement_for(&self, file: &str) -> Option<&Requirement> {
        self.requirements.iter().find(|r| r.file == file)
    }

    /// Returns true if every declaration points at a local path source
    pub fn is_path_sourced(&self) -> bool {
        self.requirements
            .iter()
            .all(|r| r.source.as_ref().is_some_and(|s| s.is_path()))
    }

    /// Pairs of (new, previous) requirements that differ
    ///
    /// Requirements are matched by file, so order changes do not count.
    pub fn changed_requirements(&self) -> Vec<(&Requirement, &Requirement)> {
        let Some(previous) = &self.previous_requirements else {
            return Vec::new();
        };

        self.requirements
            .iter()
            .filter_map(|new| {
                let old = previous.iter().find(|old| old.file == new.file)?;
                (old != new).then_some((new, old))
            })
            .collect()
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let version = self.version.as_deref().unwrap_or("unknown");
        let indirect = if self.top_level { "" } else { " (indirect)" };
        write!(
            f,
            "{}@{}{} [{}]",
            self.name, version, indirect, self.ecosystem
        )
    }
}

/// Another locked dependency whose declared constraint a target would violate
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Conflict {
    /// Name of the dependent package
    pub name: String,
    /// Version of the dependent package
    pub version: String,
    /// Constraint it declares on the updated dependency
    pub requirement: String,
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{} requires {}", self.name, self.version, self.requirement)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn go_requirement(version: &str) -> Requirement {
        Requirement::new(Some(version.to_string()), "go.mod")
    }

    fn quote() -> Dependency {
        Dependency::new(
            "rsc.io/quote",
            Some("1.4.0".to_string()),
            vec![go_requirement("v1.4.0")],
            Ecosystem::GoModules,
            true,
        )
        .unwrap()
    }

    #[test]
    fn test_dependency_new() {
        let dep = quote();
        assert_eq!(dep.name(), "rsc.io/quote");
        assert_eq!(dep.version(), Some("1.4.0"));
        assert!(dep.is_top_level());
        assert!(dep.previous_version().is_none());
    }

    #[test]
    fn test_empty_requirements_rejected() {
        let result = Dependency::new("x", None, vec![], Ecosystem::GoModules, true);
        assert!(matches!(result, Err(EngineError::InvalidModel { .. })));
    }

    #[test]
    fn test_duplicate_file_rejected() {
        let result = Dependency::new(
            "x",
            None,
            vec![go_requirement("v1.0.0"), go_requirement("v1.1.0")],
            Ecosystem::GoModules,
            true,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_version_rejected() {
        let result = Dependency::new(
            "x",
            Some("not-a-version".to_string()),
            vec![go_requirement("v1.0.0")],
            Ecosystem::GoModules,
            true,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_with_update_records_previous() {
        let dep = quote();
        let updated = dep
            .with_update(Some("1.5.2".to_string()), vec![go_requirement("v1.5.2")])
            .unwrap();

        assert_eq!(updated.version(), Some("1.5.2"));
        assert_eq!(updated.previous_version(), Some("1.4.0"));
        assert_eq!(
            updated.previous_requirements().unwrap()[0]
                .constraint
                .as_deref(),
            Some("v1.4.0")
        );
        // original untouched
        assert_eq!(dep.version(), Some("1.4.0"));
    }

    #[test]
    fn test_changed_requirements() {
        let dep = quote();
        assert!(dep.changed_requirements().is_empty());

        let same = dep
            .with_update(Some("1.4.0".to_string()), vec![go_requirement("v1.4.0")])
            .unwrap();
        assert!(same.changed_requirements().is_empty());

        let updated = dep
            .with_update(Some("1.5.2".to_string()), vec![go_requirement("v1.5.2")])
            .unwrap();
        let changed = updated.changed_requirements();
        assert_eq!(changed.len(), 1);
        assert_eq!(changed[0].0.constraint.as_deref(), Some("v1.5.2"));
        assert_eq!(changed[0].1.constraint.as_deref(), Some("v1.4.0"));
    }

    #[test]
    fn test_merged_with_keeps_first_per_file() {
        let dep = quote();
        let merged = dep
            .merged_with(
                &[
                    go_requirement("v9.9.9"),
                    Requirement::new(Some("v1.4.0".to_string()), "tools/go.mod"),
                ],
                false,
            )
            .unwrap();
        assert_eq!(merged.requirements().len(), 2);
        assert_eq!(merged.requirements()[0].constraint.as_deref(), Some("v1.4.0"));
        assert_eq!(merged.requirements()[1].file, "tools/go.mod");
        assert!(merged.is_top_level());
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", quote()), "rsc.io/quote@1.4.0 [Go modules]");
    }
}
