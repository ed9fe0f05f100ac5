//! Version information from registry
//!
//! This module provides the VersionInfo struct that represents
//! a published version together with the repository it came from.

use crate::scheme::VersionScheme;
use serde::{Deserialize, Serialize};

/// Information about a package version from the registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionInfo {
    /// The normalized version string (e.g., "1.2.3", "23.6-jre")
    pub version: String,
    /// Base URL of the registry or repository that lists this version
    pub source_url: String,
}

impl VersionInfo {
    /// Create a new VersionInfo
    pub fn new(version: impl Into<String>, source_url: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            source_url: source_url.into(),
        }
    }
}

/// Sorts `versions` newest first under `scheme`, dropping invalid and duplicate entries
///
/// When the same version is listed by several repositories, the first one wins.
pub fn sort_versions(scheme: &dyn VersionScheme, versions: Vec<VersionInfo>) -> Vec<VersionInfo> {
    let mut valid: Vec<VersionInfo> = Vec::with_capacity(versions.len());
    for info in versions {
        if !scheme.is_valid(&info.version) {
            continue;
        }
        let duplicate = valid
            .iter()
            .any(|v| crate::scheme::same_version(scheme, &v.version, &info.version));
        if !duplicate {
            valid.push(info);
        }
    }

    valid.sort_by(|a, b| {
        scheme
            .compare(&b.version, &a.version)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    valid
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheme::{GoVersionScheme, MavenVersionScheme};

    #[test]
    fn test_version_info_new() {
        let info = VersionInfo::new("1.2.3", "https://proxy.golang.org");
        assert_eq!(info.version, "1.2.3");
        assert_eq!(info.source_url, "https://proxy.golang.org");
    }

    #[test]
    fn test_sort_versions_go() {
        let versions = vec![
            VersionInfo::new("1.4.0", "p"),
            VersionInfo::new("1.5.2", "p"),
            VersionInfo::new("garbage", "p"),
            VersionInfo::new("1.5.0-rc.1", "p"),
        ];
        let sorted: Vec<String> = sort_versions(&GoVersionScheme, versions)
            .into_iter()
            .map(|v| v.version)
            .collect();
        assert_eq!(sorted, vec!["1.5.2", "1.5.0-rc.1", "1.4.0"]);
    }

    #[test]
    fn test_sort_versions_keeps_first_source() {
        let versions = vec![
            VersionInfo::new("1.0", "https://repo.example.com/maven2"),
            VersionInfo::new("1.0.0", "https://repo.maven.apache.org/maven2"),
            VersionInfo::new("1.1", "https://repo.maven.apache.org/maven2"),
        ];
        let sorted = sort_versions(&MavenVersionScheme, versions);
        assert_eq!(sorted.len(), 2);
        assert_eq!(sorted[0].version, "1.1");
        assert_eq!(sorted[1].source_url, "https://repo.example.com/maven2");
    }
}
