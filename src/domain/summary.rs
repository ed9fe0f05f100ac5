//! Run summary types
//!
//! Provides structures for tracking outcomes per ecosystem and overall.

use super::{Ecosystem, UpdateOutcome};
use serde::Serialize;

/// Outcomes for one ecosystem of the project
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EcosystemReport {
    pub ecosystem: Ecosystem,
    /// One outcome per checked or skipped dependency
    pub outcomes: Vec<UpdateOutcome>,
    /// Dependency files that changed (or would change in dry-run)
    pub changed_files: Vec<String>,
}

impl EcosystemReport {
    pub fn new(ecosystem: Ecosystem) -> Self {
        Self {
            ecosystem,
            outcomes: Vec::new(),
            changed_files: Vec::new(),
        }
    }

    pub fn add_outcome(&mut self, outcome: UpdateOutcome) {
        self.outcomes.push(outcome);
    }

    /// Returns the number of updated dependencies (property groups count each member)
    pub fn update_count(&self) -> usize {
        self.outcomes
            .iter()
            .map(|o| o.updated_dependencies().len())
            .sum()
    }

    pub fn skip_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, UpdateOutcome::Skipped { .. }))
            .count()
    }

    pub fn blocked_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_blocked()).count()
    }

    pub fn not_possible_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, UpdateOutcome::NotPossible { .. }))
            .count()
    }

    pub fn updates(&self) -> impl Iterator<Item = &UpdateOutcome> {
        self.outcomes.iter().filter(|o| o.is_update())
    }

    pub fn has_updates(&self) -> bool {
        self.outcomes.iter().any(|o| o.is_update())
    }
}

/// Overall summary of a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct UpdateSummary {
    pub ecosystems: Vec<EcosystemReport>,
    pub dry_run: bool,
}

impl UpdateSummary {
    pub fn new(dry_run: bool) -> Self {
        Self {
            ecosystems: Vec::new(),
            dry_run,
        }
    }

    pub fn add_ecosystem(&mut self, report: EcosystemReport) {
        self.ecosystems.push(report);
    }

    pub fn total_updates(&self) -> usize {
        self.ecosystems.iter().map(|e| e.update_count()).sum()
    }

    pub fn total_skips(&self) -> usize {
        self.ecosystems.iter().map(|e| e.skip_count()).sum()
    }

    pub fn total_blocked(&self) -> usize {
        self.ecosystems.iter().map(|e| e.blocked_count()).sum()
    }

    pub fn total_not_possible(&self) -> usize {
        self.ecosystems.iter().map(|e| e.not_possible_count()).sum()
    }

    /// Returns the total number of changed files across ecosystems
    pub fn files_modified(&self) -> usize {
        self.ecosystems.iter().map(|e| e.changed_files.len()).sum()
    }

    pub fn all_outcomes(&self) -> impl Iterator<Item = &UpdateOutcome> {
        self.ecosystems.iter().flat_map(|e| e.outcomes.iter())
    }
}
