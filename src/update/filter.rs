//! Update filter configuration
//!
//! This module provides the UpdateFilter struct that decides which parsed
//! dependencies are checked at all.

use crate::domain::{Dependency, Ecosystem, SkipReason};

/// Filter configuration for update checks
#[derive(Debug, Clone, Default)]
pub struct UpdateFilter {
    /// Ecosystems to process (empty means all)
    pub ecosystems: Vec<Ecosystem>,
    /// Dependencies to exclude from updates
    pub exclude: Vec<String>,
    /// If non-empty, only update these dependencies
    pub only: Vec<String>,
    /// Also check dependencies that are only present transitively
    pub include_indirect: bool,
}

impl UpdateFilter {
    /// Create a new UpdateFilter with default settings (process all)
    pub fn new() -> Self {
        Self::default()
    }

    /// Set ecosystems to process
    pub fn with_ecosystems(mut self, ecosystems: Vec<Ecosystem>) -> Self {
        self.ecosystems = ecosystems;
        self
    }

    /// Set dependencies to exclude
    pub fn with_exclude(mut self, exclude: Vec<String>) -> Self {
        self.exclude = exclude;
        self
    }

    /// Set dependencies to include (only list)
    pub fn with_only(mut self, only: Vec<String>) -> Self {
        self.only = only;
        self
    }

    pub fn with_include_indirect(mut self, include: bool) -> Self {
        self.include_indirect = include;
        self
    }

    /// Check if an ecosystem should be processed
    pub fn should_process_ecosystem(&self, ecosystem: Ecosystem) -> bool {
        if self.ecosystems.is_empty() {
            return true;
        }
        self.ecosystems.contains(&ecosystem)
    }

    /// Check if a dependency should be processed based on name filters
    pub fn should_process_package(&self, name: &str) -> bool {
        // --only takes precedence over --exclude
        if !self.only.is_empty() {
            return self.only.iter().any(|p| p == name);
        }
        !self.exclude.iter().any(|p| p == name)
    }

    /// Returns why `dependency` must not be checked, `None` if it should be
    pub fn should_skip(&self, dependency: &Dependency) -> Option<SkipReason> {
        if !self.should_process_package(dependency.name()) {
            return Some(if self.only.is_empty() {
                SkipReason::Excluded
            } else {
                SkipReason::NotInOnlyList
            });
        }

        if dependency.is_path_sourced() {
            return Some(SkipReason::PathSource);
        }

        if dependency.requirements().iter().any(|r| r.external) {
            return Some(SkipReason::ExternalVersion);
        }

        if dependency.version().is_none() {
            return Some(SkipReason::NoVersion);
        }

        if !dependency.is_top_level() && !self.include_indirect {
            return Some(SkipReason::Indirect);
        }

        None
    }
}
