//! Requirement and source records attached to a dependency

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Where a requirement's package comes from
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Source {
    /// The ecosystem's default registry
    Default { registry: String },
    /// A git repository
    Git {
        url: String,
        reference: Option<String>,
        branch: Option<String>,
    },
    /// A local path inside the project
    Path { path: String },
    /// An explicit registry or repository URL
    Registry { url: String },
}

impl Source {
    /// Returns true for sources the engine never updates (local paths)
    pub fn is_path(&self) -> bool {
        matches!(self, Source::Path { .. })
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Default { registry } => write!(f, "{}", registry),
            Source::Git { url, reference, .. } => match reference {
                Some(r) => write!(f, "{}#{}", url, r),
                None => write!(f, "{}", url),
            },
            Source::Path { path } => write!(f, "path:{}", path),
            Source::Registry { url } => write!(f, "{}", url),
        }
    }
}

/// A single declaration of a dependency inside one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    /// Constraint string as declared (or the resolved value of a property token)
    pub constraint: Option<String>,
    /// File the declaration lives in
    pub file: String,
    /// Declaration groups (e.g. `indirect`, `test`, `plugin`)
    pub groups: BTreeSet<String>,
    /// Package source, if known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<Source>,
    /// Property name when the declared literal is a `${name}` token
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property_name: Option<String>,
    /// File that defines the property value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property_file: Option<String>,
    /// The version is defined where the engine cannot edit it
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub external: bool,
}

impl Requirement {
    /// Creates a requirement declared in `file`
    pub fn new(constraint: Option<String>, file: impl Into<String>) -> Self {
        Self {
            constraint,
            file: file.into(),
            groups: BTreeSet::new(),
            source: None,
            property_name: None,
            property_file: None,
            external: false,
        }
    }

    /// Adds a group (builder pattern)
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.groups.insert(group.into());
        self
    }

    /// Sets the source (builder pattern)
    pub fn with_source(mut self, source: Source) -> Self {
        self.source = Some(source);
        self
    }

    /// Marks the declaration as a property reference defined in `defined_in`
    pub fn with_property(mut self, name: impl Into<String>, defined_in: impl Into<String>) -> Self {
        self.property_name = Some(name.into());
        self.property_file = Some(defined_in.into());
        self
    }

    /// Marks the version as defined outside the editable files (builder pattern)
    pub fn as_external(mut self) -> Self {
        self.external = true;
        self
    }

    /// Returns a copy with a different constraint
    pub fn with_constraint(&self, constraint: impl Into<String>) -> Self {
        Self {
            constraint: Some(constraint.into()),
            ..self.clone()
        }
    }

    /// Returns true if the declaration goes through a property
    pub fn is_property_linked(&self) -> bool {
        self.property_name.is_some()
    }

    /// Returns true if the constraint is a compound (comma separated) range
    pub fn is_range(&self) -> bool {
        self.constraint.as_deref().is_some_and(|c| c.contains(','))
    }

    /// Returns true if the requirement belongs to `group`
    pub fn in_group(&self, group: &str) -> bool {
        self.groups.contains(group)
    }
}
