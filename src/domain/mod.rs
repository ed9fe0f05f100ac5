//! Core domain models for depshift
//!
//! This module contains the normalized data model shared by every ecosystem:
//! - Ecosystem identifiers
//! - Dependency files as materialized in memory
//! - Dependencies, their per-file requirements and sources
//! - Update decision outcomes and run summaries

mod dependency;
mod dependency_file;
mod ecosystem;
mod requirement;
mod summary;
mod update_result;

pub use dependency::{Conflict, Dependency};
pub use dependency_file::DependencyFile;
pub use ecosystem::Ecosystem;
pub use requirement::{Requirement, Source};
pub use summary::{EcosystemReport, UpdateSummary};
pub use update_result::{NotPossibleReason, SkipReason, UpdateOutcome};
