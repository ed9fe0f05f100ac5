//! Version and requirement algebra per ecosystem
//!
//! Each ecosystem provides one [`VersionScheme`] and one [`RequirementScheme`].
//! Implementations are independent of each other; the shared behaviour is the
//! trait contract. Lookup goes through a static match over [`Ecosystem`], so a
//! new ecosystem must be wired here explicitly.

mod go;
mod maven;

pub use go::{GoRequirementScheme, GoVersion, GoVersionScheme};
pub use maven::{
    MavenRequirement, MavenRequirementScheme, MavenVersion, MavenVersionScheme,
    UPPER_BOUND_SENTINEL,
};

use crate::domain::Ecosystem;
use crate::error::VersionError;
use std::cmp::Ordering;

/// Ordering over an ecosystem's version strings
pub trait VersionScheme: Send + Sync {
    /// Returns the ecosystem this scheme handles
    fn ecosystem(&self) -> Ecosystem;

    /// Returns true if `version` is a version in this ecosystem's grammar
    fn is_valid(&self, version: &str) -> bool;

    /// Compares two versions
    ///
    /// Fails with [`VersionError::InvalidVersion`] when either side is malformed.
    fn compare(&self, a: &str, b: &str) -> Result<Ordering, VersionError>;

    /// Returns true for pre-release versions
    fn is_prerelease(&self, version: &str) -> bool;

    /// Canonical form stored on a `Dependency`
    fn normalize(&self, version: &str) -> String {
        version.trim().to_string()
    }
}

/// Grammar for an ecosystem's requirement (constraint) strings
pub trait RequirementScheme: Send + Sync {
    /// Returns the ecosystem this scheme handles
    fn ecosystem(&self) -> Ecosystem;

    /// Returns true if `requirement` parses
    fn is_valid(&self, requirement: &str) -> bool;

    /// Returns true if `version` satisfies `requirement`
    fn satisfied_by(&self, requirement: &str, version: &str) -> Result<bool, VersionError>;

    /// Returns true if the requirement is a range rather than a single version
    fn is_range(&self, requirement: &str) -> bool;

    /// Human readable rendering of the accepted versions
    fn describe(&self, requirement: &str) -> Result<String, VersionError>;
}

/// Returns the version scheme for `ecosystem`
pub fn version_scheme(ecosystem: Ecosystem) -> &'static dyn VersionScheme {
    match ecosystem {
        Ecosystem::GoModules => &GoVersionScheme,
        Ecosystem::Maven => &MavenVersionScheme,
    }
}

/// Returns the requirement scheme for `ecosystem`
pub fn requirement_scheme(ecosystem: Ecosystem) -> &'static dyn RequirementScheme {
    match ecosystem {
        Ecosystem::GoModules => &GoRequirementScheme,
        Ecosystem::Maven => &MavenRequirementScheme,
    }
}

/// Returns true if `a` and `b` denote the same version
///
/// Falls back to raw string equality when either side cannot be parsed.
pub fn same_version(scheme: &dyn VersionScheme, a: &str, b: &str) -> bool {
    match scheme.compare(a, b) {
        Ok(ordering) => ordering == Ordering::Equal,
        Err(_) => scheme.normalize(a) == scheme.normalize(b),
    }
}

/// Returns true if `candidate` is strictly newer than `current`
///
/// Malformed input is never considered newer.
pub fn is_newer(scheme: &dyn VersionScheme, candidate: &str, current: &str) -> bool {
    matches!(scheme.compare(candidate, current), Ok(Ordering::Greater))
}

/// Sorts valid versions newest first, dropping anything the scheme rejects
pub fn sort_descending(scheme: &dyn VersionScheme, versions: Vec<String>) -> Vec<String> {
    let mut valid: Vec<String> = versions
        .into_iter()
        .filter(|v| scheme.is_valid(v))
        .collect();
    valid.sort_by(|a, b| scheme.compare(b, a).unwrap_or(Ordering::Equal));
    valid.dedup_by(|a, b| same_version(scheme, a, b));
    valid
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_is_wired_for_every_ecosystem() {
        for ecosystem in Ecosystem::all() {
            assert_eq!(version_scheme(*ecosystem).ecosystem(), *ecosystem);
            assert_eq!(requirement_scheme(*ecosystem).ecosystem(), *ecosystem);
        }
    }

    #[test]
    fn test_same_version_falls_back_to_string_equality() {
        let scheme = version_scheme(Ecosystem::GoModules);
        assert!(same_version(scheme, "v1.4.0", "1.4.0"));
        assert!(same_version(scheme, "master", "master"));
        assert!(!same_version(scheme, "master", "main"));
    }

    #[test]
    fn test_is_newer_rejects_malformed() {
        let scheme = version_scheme(Ecosystem::GoModules);
        assert!(is_newer(scheme, "1.5.2", "1.4.0"));
        assert!(!is_newer(scheme, "garbage", "1.4.0"));
    }

    #[test]
    fn test_sort_descending() {
        let scheme = version_scheme(Ecosystem::Maven);
        let sorted = sort_descending(
            scheme,
            vec![
                "1.0".to_string(),
                "1.10".to_string(),
                "1.2".to_string(),
                "1.0.0".to_string(),
                "${bad}".to_string(),
            ],
        );
        assert_eq!(sorted, vec!["1.10", "1.2", "1.0"]);
    }
}
