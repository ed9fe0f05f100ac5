//! Go module versions
//!
//! Handles version formats:
//! - Semantic version: `v1.2.3`
//! - Prerelease: `v1.2.3-beta.1`
//! - Pseudo-version: `v0.0.0-20210101120000-abcdef123456`
//! - Incompatible major: `v2.0.0+incompatible`
//!
//! Versions stored on a `Dependency` drop the `v`; the literal in `go.mod`
//! keeps it. Both forms parse.

use super::{RequirementScheme, VersionScheme};
use crate::domain::Ecosystem;
use crate::error::VersionError;
use regex::Regex;
use std::cmp::Ordering;
use std::fmt;
use std::sync::LazyLock;

// Timestamp and revision tail of a pseudo-version pre-release
static PSEUDO_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|\.)\d{14}-[0-9a-f]{12}$").unwrap());

const INCOMPATIBLE: &str = "+incompatible";

/// A parsed Go module version
///
/// `+incompatible` is kept for display but ignored when ordering.
#[derive(Debug, Clone)]
pub struct GoVersion {
    semver: semver::Version,
    incompatible: bool,
}

impl GoVersion {
    pub fn parse(input: &str) -> Result<Self, VersionError> {
        let invalid = || VersionError::InvalidVersion {
            version: input.to_string(),
            ecosystem: Ecosystem::GoModules,
        };

        let trimmed = input.trim();
        let bare = trimmed.strip_prefix('v').unwrap_or(trimmed);
        let (core, incompatible) = match bare.strip_suffix(INCOMPATIBLE) {
            Some(core) => (core, true),
            None => (bare, false),
        };

        let semver = semver::Version::parse(core).map_err(|_| invalid())?;
        // Go allows no build metadata other than +incompatible
        if !semver.build.is_empty() {
            return Err(invalid());
        }

        Ok(Self {
            semver,
            incompatible,
        })
    }

    pub fn major(&self) -> u64 {
        self.semver.major
    }

    pub fn is_prerelease(&self) -> bool {
        !self.semver.pre.is_empty()
    }

    /// Returns true for commit-based pseudo-versions
    pub fn is_pseudo(&self) -> bool {
        PSEUDO_RE.is_match(self.semver.pre.as_str())
    }

    pub fn is_incompatible(&self) -> bool {
        self.incompatible
    }

    /// Version without the `v` prefix
    pub fn bare(&self) -> String {
        if self.incompatible {
            format!("{}{}", self.semver, INCOMPATIBLE)
        } else {
            self.semver.to_string()
        }
    }
}

impl fmt::Display for GoVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.bare())
    }
}

impl PartialEq for GoVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for GoVersion {}

impl PartialOrd for GoVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for GoVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.semver.cmp(&other.semver)
    }
}

/// Go module version scheme
pub struct GoVersionScheme;

impl VersionScheme for GoVersionScheme {
    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::GoModules
    }

    fn is_valid(&self, version: &str) -> bool {
        GoVersion::parse(version).is_ok()
    }

    fn compare(&self, a: &str, b: &str) -> Result<Ordering, VersionError> {
        Ok(GoVersion::parse(a)?.cmp(&GoVersion::parse(b)?))
    }

    fn is_prerelease(&self, version: &str) -> bool {
        GoVersion::parse(version).is_ok_and(|v| v.is_prerelease())
    }

    fn normalize(&self, version: &str) -> String {
        let trimmed = version.trim();
        trimmed.strip_prefix('v').unwrap_or(trimmed).to_string()
    }
}

/// Go requirement scheme
///
/// A `go.mod` require line names one exact version; minimal version selection
/// happens in the toolchain, not here.
pub struct GoRequirementScheme;

impl GoRequirementScheme {
    fn parse(requirement: &str) -> Result<GoVersion, VersionError> {
        let trimmed = requirement.trim();
        if !trimmed.starts_with('v') {
            return Err(VersionError::InvalidRequirement {
                requirement: requirement.to_string(),
                ecosystem: Ecosystem::GoModules,
            });
        }
        GoVersion::parse(trimmed).map_err(|_| VersionError::InvalidRequirement {
            requirement: requirement.to_string(),
            ecosystem: Ecosystem::GoModules,
        })
    }
}

impl RequirementScheme for GoRequirementScheme {
    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::GoModules
    }

    fn is_valid(&self, requirement: &str) -> bool {
        Self::parse(requirement).is_ok()
    }

    fn satisfied_by(&self, requirement: &str, version: &str) -> Result<bool, VersionError> {
        let required = Self::parse(requirement)?;
        Ok(GoVersion::parse(version)? == required)
    }

    fn is_range(&self, _requirement: &str) -> bool {
        false
    }

    fn describe(&self, requirement: &str) -> Result<String, VersionError> {
        Ok(format!("= {}", Self::parse(requirement)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_semver() {
        let v = GoVersion::parse("v1.2.3").unwrap();
        assert_eq!(v.major(), 1);
        assert!(!v.is_prerelease());
        assert_eq!(v.to_string(), "v1.2.3");
        assert_eq!(v.bare(), "1.2.3");
    }

    #[test]
    fn test_parse_without_prefix() {
        assert_eq!(GoVersion::parse("1.4.0").unwrap().to_string(), "v1.4.0");
    }

    #[test]
    fn test_parse_pseudo_version() {
        let v = GoVersion::parse("v0.0.0-20210101120000-abcdef123456").unwrap();
        assert!(v.is_pseudo());
        assert!(v.is_prerelease());

        let v = GoVersion::parse("v1.2.4-0.20210101120000-abcdef123456").unwrap();
        assert!(v.is_pseudo());
    }

    #[test]
    fn test_prerelease_is_not_pseudo() {
        let v = GoVersion::parse("v1.2.3-beta.1").unwrap();
        assert!(v.is_prerelease());
        assert!(!v.is_pseudo());
    }

    #[test]
    fn test_incompatible_ignored_for_ordering() {
        let a = GoVersion::parse("v2.0.0+incompatible").unwrap();
        let b = GoVersion::parse("v2.0.0").unwrap();
        assert!(a.is_incompatible());
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "v2.0.0+incompatible");
    }

    #[test]
    fn test_invalid_versions() {
        assert!(GoVersion::parse("").is_err());
        assert!(GoVersion::parse("v1.2").is_err());
        assert!(GoVersion::parse("not-a-version").is_err());
        assert!(GoVersion::parse("v1.2.3+build5").is_err());
    }

    #[test]
    fn test_compare() {
        let scheme = GoVersionScheme;
        assert_eq!(scheme.compare("v1.5.2", "v1.4.0").unwrap(), Ordering::Greater);
        assert_eq!(scheme.compare("v1.5.0-rc.1", "v1.5.0").unwrap(), Ordering::Less);
        assert_eq!(scheme.compare("1.4.0", "v1.4.0").unwrap(), Ordering::Equal);
        assert!(scheme.compare("v1.4.0", "bogus").is_err());
    }

    #[test]
    fn test_normalize_strips_prefix() {
        assert_eq!(GoVersionScheme.normalize("v1.4.0"), "1.4.0");
        assert_eq!(GoVersionScheme.normalize(" 1.4.0 "), "1.4.0");
    }

    #[test]
    fn test_requirement_requires_prefix() {
        let scheme = GoRequirementScheme;
        assert!(scheme.is_valid("v1.4.0"));
        assert!(!scheme.is_valid("1.4.0"));
        assert!(!scheme.is_range("v1.4.0"));
    }

    #[test]
    fn test_requirement_satisfied_by_exact() {
        let scheme = GoRequirementScheme;
        assert!(scheme.satisfied_by("v1.4.0", "1.4.0").unwrap());
        assert!(!scheme.satisfied_by("v1.4.0", "1.5.2").unwrap());
        assert!(scheme.satisfied_by("1.4.0", "1.4.0").is_err());
        assert_eq!(scheme.describe("v1.4.0").unwrap(), "= v1.4.0");
    }
}
