//! Text output formatter for human-readable display
//!
//! This module provides:
//! - Human-readable update result display with colors
//! - Version change type indication (major/minor/patch)
//! - Not-possible and blocked updates with their reasons
//! - Skipped and up-to-date dependencies in verbose mode

use crate::domain::{Dependency, EcosystemReport, UpdateOutcome, UpdateSummary};
use crate::orchestrator::{OrchestratorResult, ParsedEcosystem};
use crate::output::{OutputFormatter, Verbosity};
use colored::Colorize;
use std::io::Write;

/// Version change type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionChangeType {
    Major,
    Minor,
    Patch,
    /// Unknown or unparseable
    Unknown,
}

impl VersionChangeType {
    /// Determine the change type from the leading numeric components
    ///
    /// Works for Go (`1.4.0`) and the common Maven shapes (`23.3-jre`,
    /// `4.3.12.RELEASE`).
    pub fn from_versions(old: &str, new: &str) -> Self {
        let parse = |v: &str| -> Option<Vec<u64>> {
            let v = v.strip_prefix('v').unwrap_or(v);
            let numbers: Vec<u64> = v
                .split(['.', '-'])
                .map_while(|part| part.parse().ok())
                .take(3)
                .collect();
            (!numbers.is_empty()).then_some(numbers)
        };

        match (parse(old), parse(new)) {
            (Some(old), Some(new)) => {
                let component = |v: &[u64], i: usize| v.get(i).copied().unwrap_or(0);
                if component(&old, 0) != component(&new, 0) {
                    VersionChangeType::Major
                } else if component(&old, 1) != component(&new, 1) {
                    VersionChangeType::Minor
                } else {
                    VersionChangeType::Patch
                }
            }
            _ => VersionChangeType::Unknown,
        }
    }

    pub fn colored_label(&self) -> String {
        match self {
            VersionChangeType::Major => "major".red().bold().to_string(),
            VersionChangeType::Minor => "minor".yellow().to_string(),
            VersionChangeType::Patch => "patch".green().to_string(),
            VersionChangeType::Unknown => "?".dimmed().to_string(),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            VersionChangeType::Major => "major",
            VersionChangeType::Minor => "minor",
            VersionChangeType::Patch => "patch",
            VersionChangeType::Unknown => "?",
        }
    }
}

/// Text formatter for human-readable output
pub struct TextFormatter {
    verbosity: Verbosity,
    dry_run: bool,
    color: bool,
}

impl TextFormatter {
    pub fn new(verbosity: Verbosity, dry_run: bool) -> Self {
        Self::with_color(verbosity, dry_run, true)
    }

    pub fn with_color(verbosity: Verbosity, dry_run: bool, color: bool) -> Self {
        Self {
            verbosity,
            dry_run,
            color,
        }
    }

    fn dry_run_prefix(&self) -> String {
        match (self.dry_run, self.color) {
            (false, _) => String::new(),
            (true, true) => format!("{} ", "(dry-run)".cyan()),
            (true, false) => "(dry-run) ".to_string(),
        }
    }

    fn paint(&self, text: &str, style: fn(&str) -> colored::ColoredString) -> String {
        if self.color {
            style(text).to_string()
        } else {
            text.to_string()
        }
    }

    fn max_name_length(outcomes: &[UpdateOutcome]) -> usize {
        outcomes
            .iter()
            .map(|o| o.package_name().len())
            .max()
            .unwrap_or(0)
            .max(20)
    }

    fn format_update_line(
        &self,
        dependency: &Dependency,
        width: usize,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let old = dependency.previous_version().unwrap_or("?");
        let new = dependency.version().unwrap_or("?");
        let change = VersionChangeType::from_versions(old, new);

        if self.color {
            writeln!(
                writer,
                "  {:width$} {} {} {} [{}]",
                dependency.name(),
                old.dimmed(),
                "→".dimmed(),
                new.bright_white().bold(),
                change.colored_label(),
                width = width
            )
        } else {
            writeln!(
                writer,
                "  {:width$} {} -> {} [{}]",
                dependency.name(),
                old,
                new,
                change.label(),
                width = width
            )
        }
    }

    fn format_outcome(
        &self,
        outcome: &UpdateOutcome,
        width: usize,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        match outcome {
            UpdateOutcome::Updated {
                dependencies,
                conflicts,
            } => {
                for dependency in dependencies {
                    self.format_update_line(dependency, width, writer)?;
                }
                for conflict in conflicts {
                    let line = format!("conflict: {}", conflict);
                    writeln!(writer, "    {}", self.paint(&line, |s| s.yellow()))?;
                }
            }
            UpdateOutcome::NotPossible {
                dependency, reason, ..
            } => {
                let line = format!("({})", reason);
                writeln!(
                    writer,
                    "  {:width$} {} {}",
                    dependency.name(),
                    dependency.version().unwrap_or("?"),
                    self.paint(&line, |s| s.yellow()),
                    width = width
                )?;
            }
            UpdateOutcome::Blocked { dependency, error } => {
                let line = format!("blocked: {}", error);
                writeln!(
                    writer,
                    "  {:width$} {} {}",
                    dependency.name(),
                    dependency.version().unwrap_or("?"),
                    self.paint(&line, |s| s.red()),
                    width = width
                )?;
            }
            UpdateOutcome::UpToDate { dependency } => {
                if self.verbosity == Verbosity::Verbose {
                    let line = format!(
                        "{:width$} {} (latest)",
                        dependency.name(),
                        dependency.version().unwrap_or("?"),
                        width = width
                    );
                    writeln!(writer, "  {}", self.paint(&line, |s| s.dimmed()))?;
                }
            }
            UpdateOutcome::Skipped { dependency, reason } => {
                if self.verbosity == Verbosity::Verbose {
                    let line = format!("{:width$} ({})", dependency.name(), reason, width = width);
                    writeln!(writer, "  {}", self.paint(&line, |s| s.dimmed()))?;
                }
            }
        }
        Ok(())
    }
}

impl OutputFormatter for TextFormatter {
    fn format(&self, result: &OrchestratorResult, writer: &mut dyn Write) -> std::io::Result<()> {
        if self.verbosity == Verbosity::Quiet {
            return self.format_summary(&result.summary, writer);
        }

        for report in &result.summary.ecosystems {
            self.format_ecosystem(report, writer)?;
        }

        if !result.errors.is_empty() {
            writeln!(writer, "{}:", self.paint("Errors", |s| s.red().bold()))?;
            for error in &result.errors {
                writeln!(writer, "  {} {}", self.paint("✗", |s| s.red()), error)?;
            }
            writeln!(writer)?;
        }

        self.format_summary(&result.summary, writer)
    }

    fn format_summary(
        &self,
        summary: &UpdateSummary,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let prefix = self.dry_run_prefix();
        let updates = summary.total_updates();

        if self.verbosity == Verbosity::Quiet {
            return if updates > 0 {
                writeln!(writer, "{}{} updated", prefix, self.paint(&updates.to_string(), |s| s.green()))
            } else {
                writeln!(writer, "{}{}", prefix, self.paint("No updates", |s| s.dimmed()))
            };
        }

        writeln!(writer, "{}{}:", prefix, self.paint("Summary", |s| s.bold()))?;
        writeln!(
            writer,
            "  {} dependency(ies) updated in {} file(s)",
            self.paint(&updates.to_string(), |s| s.green()),
            summary.files_modified()
        )?;

        let not_possible = summary.total_not_possible();
        if not_possible > 0 {
            writeln!(
                writer,
                "  {} update(s) not possible",
                self.paint(&not_possible.to_string(), |s| s.yellow())
            )?;
        }
        let blocked = summary.total_blocked();
        if blocked > 0 {
            writeln!(
                writer,
                "  {} update(s) blocked by unreachable sources",
                self.paint(&blocked.to_string(), |s| s.red())
            )?;
        }
        let skips = summary.total_skips();
        if skips > 0 {
            writeln!(writer, "  {} skipped", skips)?;
        }
        Ok(())
    }

    fn format_ecosystem(
        &self,
        report: &EcosystemReport,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let visible = report.outcomes.iter().any(|o| {
            matches!(
                o,
                UpdateOutcome::Updated { .. }
                    | UpdateOutcome::NotPossible { .. }
                    | UpdateOutcome::Blocked { .. }
            )
        });
        if !visible && self.verbosity != Verbosity::Verbose {
            return Ok(());
        }

        let updates = report.update_count();
        writeln!(
            writer,
            "{}{} ({} {}, {} skipped)",
            self.dry_run_prefix(),
            self.paint(report.ecosystem.display_name(), |s| s.bold()),
            updates,
            if updates == 1 { "update" } else { "updates" },
            report.skip_count()
        )?;

        let width = Self::max_name_length(&report.outcomes);
        for outcome in &report.outcomes {
            self.format_outcome(outcome, width, writer)?;
        }

        if self.verbosity == Verbosity::Verbose && !report.changed_files.is_empty() {
            writeln!(writer, "  {}", self.paint("Changed files:", |s| s.dimmed()))?;
            for file in &report.changed_files {
                writeln!(writer, "    {}", file)?;
            }
        }

        writeln!(writer)
    }

    fn format_dependencies(
        &self,
        parsed: &[ParsedEcosystem],
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        for ecosystem in parsed {
            writeln!(
                writer,
                "{} ({} files)",
                self.paint(ecosystem.ecosystem.display_name(), |s| s.bold()),
                ecosystem.files.len()
            )?;
            for dependency in &ecosystem.dependencies {
                let scope = if dependency.is_top_level() { "" } else { " (indirect)" };
                writeln!(
                    writer,
                    "  {} {}{}",
                    dependency.name(),
                    dependency.version().unwrap_or("-"),
                    scope
                )?;
                if self.verbosity == Verbosity::Verbose {
                    for requirement in dependency.requirements() {
                        writeln!(
                            writer,
                            "    {} {}",
                            requirement.file,
                            requirement.constraint.as_deref().unwrap_or("-")
                        )?;
                    }
                }
            }
        }
        Ok(())
    }
}
