//! JSON output formatter for machine processing
//!
//! This module provides:
//! - JSON serialization of update outcomes
//! - Per-ecosystem counts and changed files

use crate::domain::{Dependency, EcosystemReport, UpdateOutcome, UpdateSummary};
use crate::orchestrator::{OrchestratorResult, ParsedEcosystem};
use crate::output::{OutputFormatter, Verbosity};
use serde::Serialize;
use std::io::Write;

/// JSON formatter for machine-readable output
pub struct JsonFormatter {
    /// Verbosity level affects detail in output
    verbosity: Verbosity,
}

impl JsonFormatter {
    /// Create a new JSON formatter
    pub fn new(verbosity: Verbosity) -> Self {
        Self { verbosity }
    }

    fn ecosystem_output<'a>(&self, report: &'a EcosystemReport) -> JsonEcosystem<'a> {
        let verbose = self.verbosity == Verbosity::Verbose;
        JsonEcosystem {
            ecosystem: report.ecosystem.identifier(),
            updates: report.update_count(),
            skips: report.skip_count(),
            not_possible: report.not_possible_count(),
            blocked: report.blocked_count(),
            changed_files: &report.changed_files,
            outcomes: report
                .outcomes
                .iter()
                .filter(|o| {
                    verbose
                        || !matches!(
                            o,
                            UpdateOutcome::Skipped { .. } | UpdateOutcome::UpToDate { .. }
                        )
                })
                .collect(),
        }
    }

    fn write_json<T: Serialize>(value: &T, writer: &mut dyn Write) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(std::io::Error::other)?;
        writeln!(writer, "{}", json)
    }
}

/// JSON representation of the full result
#[derive(Serialize)]
struct JsonOutput<'a> {
    dry_run: bool,
    summary: JsonSummary,
    ecosystems: Vec<JsonEcosystem<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    errors: Vec<String>,
}

/// JSON representation of summary statistics
#[derive(Serialize)]
struct JsonSummary {
    updates: usize,
    skips: usize,
    not_possible: usize,
    blocked: usize,
    files_modified: usize,
}

impl From<&UpdateSummary> for JsonSummary {
    fn from(summary: &UpdateSummary) -> Self {
        Self {
            updates: summary.total_updates(),
            skips: summary.total_skips(),
            not_possible: summary.total_not_possible(),
            blocked: summary.total_blocked(),
            files_modified: summary.files_modified(),
        }
    }
}

#[derive(Serialize)]
struct JsonEcosystem<'a> {
    ecosystem: &'static str,
    updates: usize,
    skips: usize,
    not_possible: usize,
    blocked: usize,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    changed_files: &'a [String],
    outcomes: Vec<&'a UpdateOutcome>,
}

/// Parsed dependencies of one ecosystem (`--list`)
#[derive(Serialize)]
struct JsonListing<'a> {
    ecosystem: &'static str,
    files: Vec<&'a str>,
    dependencies: &'a [Dependency],
}

impl OutputFormatter for JsonFormatter {
    fn format(&self, result: &OrchestratorResult, writer: &mut dyn Write) -> std::io::Result<()> {
        let output = JsonOutput {
            dry_run: result.summary.dry_run,
            summary: JsonSummary::from(&result.summary),
            ecosystems: result
                .summary
                .ecosystems
                .iter()
                .map(|r| self.ecosystem_output(r))
                .collect(),
            errors: result.errors.iter().map(|e| e.to_string()).collect(),
        };
        Self::write_json(&output, writer)
    }

    fn format_summary(
        &self,
        summary: &UpdateSummary,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        Self::write_json(&JsonSummary::from(summary), writer)
    }

    fn format_ecosystem(
        &self,
        report: &EcosystemReport,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        Self::write_json(&self.ecosystem_output(report), writer)
    }

    fn format_dependencies(
        &self,
        parsed: &[ParsedEcosystem],
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let listing: Vec<JsonListing<'_>> = parsed
            .iter()
            .map(|p| JsonListing {
                ecosystem: p.ecosystem.identifier(),
                files: p.files.iter().map(|f| f.name()).collect(),
                dependencies: &p.dependencies,
            })
            .collect();
        Self::write_json(&listing, writer)
    }
}
