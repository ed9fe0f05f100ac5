//! Materialized dependency files

use serde::{Deserialize, Serialize};

/// A manifest, lockfile or support file held in memory
///
/// Instances are never mutated; `with_content` returns a new file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyFile {
    name: String,
    content: String,
    directory: String,
    support_file: bool,
}

impl DependencyFile {
    /// Creates a file at `name` (a path relative to `directory`)
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
            directory: "/".to_string(),
            support_file: false,
        }
    }

    /// Sets the base directory (builder pattern)
    pub fn with_directory(mut self, directory: impl Into<String>) -> Self {
        self.directory = directory.into();
        self
    }

    /// Marks the file as a support file (read for context, never updated)
    pub fn as_support_file(mut self) -> Self {
        self.support_file = true;
        self
    }

    /// Returns a new file with the same identity and different content
    pub fn with_content(&self, content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..self.clone()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn directory(&self) -> &str {
        &self.directory
    }

    pub fn is_support_file(&self) -> bool {
        self.support_file
    }

    /// Final path component of the name
    pub fn file_name(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or(&self.name)
    }

    /// Directory part of the name, empty for root files
    pub fn parent_path(&self) -> &str {
        match self.name.rfind('/') {
            Some(idx) => &self.name[..idx],
            None => "",
        }
    }
}
