//! Update decision result types

use super::{Conflict, Dependency};
use serde::Serialize;
use std::fmt;

/// Reason why a dependency was not considered for update
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Package was excluded via --exclude flag
    Excluded,
    /// Package not in --only list
    NotInOnlyList,
    /// Every declaration points at a local path
    PathSource,
    /// Declared without a concrete version
    NoVersion,
    /// Only present transitively (Go `// indirect`)
    Indirect,
    /// Version comes from a remote parent or a non-property element
    ExternalVersion,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Excluded => write!(f, "excluded by --exclude"),
            SkipReason::NotInOnlyList => write!(f, "not in --only list"),
            SkipReason::PathSource => write!(f, "local path dependency"),
            SkipReason::NoVersion => write!(f, "no version declared"),
            SkipReason::Indirect => write!(f, "indirect dependency"),
            SkipReason::ExternalVersion => write!(f, "version defined outside the project"),
        }
    }
}

/// Reason why an update exists in principle but cannot be applied
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NotPossibleReason {
    /// The registry lists no acceptable version
    NoVersionsAvailable,
    /// No candidate newer than the current version was accepted by the resolver
    NotResolvable { message: String },
    /// A dependency sharing the same property does not publish the target
    PropertyConflict {
        property: String,
        target: String,
        blocking: Vec<String>,
    },
}

impl fmt::Display for NotPossibleReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotPossibleReason::NoVersionsAvailable => write!(f, "no versions available"),
            NotPossibleReason::NotResolvable { message } => write!(f, "not resolvable: {}", message),
            NotPossibleReason::PropertyConflict {
                property,
                target,
                blocking,
            } => write!(
                f,
                "property '{}' cannot move to {} ({} does not publish it)",
                property,
                target,
                blocking.join(", ")
            ),
        }
    }
}

/// Result of checking a single dependency
///
/// The variants map onto the three remediations a caller can take:
/// nothing to do, update impossible, or fix access and retry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UpdateOutcome {
    /// Already at the newest acceptable version
    UpToDate { dependency: Dependency },
    /// One or more dependencies change (several for a shared property)
    Updated {
        dependencies: Vec<Dependency>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        conflicts: Vec<Conflict>,
    },
    /// A newer version exists but cannot be applied
    NotPossible {
        dependency: Dependency,
        reason: NotPossibleReason,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        conflicts: Vec<Conflict>,
    },
    /// The answer is unknown because a source could not be reached
    Blocked { dependency: Dependency, error: String },
    /// Not checked at all
    Skipped {
        dependency: Dependency,
        reason: SkipReason,
    },
}

impl UpdateOutcome {
    /// Creates a Skipped outcome
    pub fn skip(dependency: Dependency, reason: SkipReason) -> Self {
        UpdateOutcome::Skipped { dependency, reason }
    }

    /// Creates a Blocked outcome from an error message
    pub fn blocked(dependency: Dependency, error: impl fmt::Display) -> Self {
        UpdateOutcome::Blocked {
            dependency,
            error: error.to_string(),
        }
    }

    /// Returns true if this outcome carries changed dependencies
    pub fn is_update(&self) -> bool {
        matches!(self, UpdateOutcome::Updated { .. })
    }

    /// Returns true if the update was blocked by an unreachable source
    pub fn is_blocked(&self) -> bool {
        matches!(self, UpdateOutcome::Blocked { .. })
    }

    /// Returns the changed dependencies, empty unless `Updated`
    pub fn updated_dependencies(&self) -> &[Dependency] {
        match self {
            UpdateOutcome::Updated { dependencies, .. } => dependencies,
            _ => &[],
        }
    }

    /// Returns the name of the dependency the outcome is about
    pub fn package_name(&self) -> &str {
        match self {
            UpdateOutcome::Updated { dependencies, .. } => {
                dependencies.first().map(|d| d.name()).unwrap_or_default()
            }
            UpdateOutcome::UpToDate { dependency }
            | UpdateOutcome::NotPossible { dependency, .. }
            | UpdateOutcome::Blocked { dependency, .. }
            | UpdateOutcome::Skipped { dependency, .. } => dependency.name(),
        }
    }
}

impl fmt::Display for UpdateOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdateOutcome::UpToDate { dependency } => {
                write!(f, "{}: up to date", dependency.name())
            }
            UpdateOutcome::Updated { dependencies, .. } => {
                let parts: Vec<String> = dependencies
                    .iter()
                    .map(|d| {
                        format!(
                            "{}: {} → {}",
                            d.name(),
                            d.previous_version().unwrap_or("?"),
                            d.version().unwrap_or("?")
                        )
                    })
                    .collect();
                write!(f, "{}", parts.join(", "))
            }
            UpdateOutcome::NotPossible {
                dependency, reason, ..
            } => write!(f, "{}: update not possible ({})", dependency.name(), reason),
            UpdateOutcome::Blocked { dependency, error } => {
                write!(f, "{}: blocked ({})", dependency.name(), error)
            }
            UpdateOutcome::Skipped { dependency, reason } => {
                write!(f, "{}: skipped ({})", dependency.name(), reason)
            }
        }
    }
}
