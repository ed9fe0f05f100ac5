//! Diff output formatter for showing changes
//!
//! Prints each changed requirement as a hunk under the file it lives in.

use crate::domain::{EcosystemReport, Requirement, UpdateSummary};
use crate::orchestrator::{OrchestratorResult, ParsedEcosystem};
use crate::output::OutputFormatter;
use std::collections::BTreeMap;
use std::io::Write;

/// Diff formatter for showing requirement changes
pub struct DiffFormatter {
    dry_run: bool,
}

/// One changed declaration
struct Hunk<'a> {
    name: &'a str,
    old: &'a Requirement,
    new: &'a Requirement,
}

impl DiffFormatter {
    pub fn new(dry_run: bool) -> Self {
        Self { dry_run }
    }

    fn dry_run_prefix(&self) -> &'static str {
        if self.dry_run {
            "(dry-run) "
        } else {
            ""
        }
    }

    /// Changed requirements grouped by file, in file name order
    fn hunks_by_file(report: &EcosystemReport) -> BTreeMap<&str, Vec<Hunk<'_>>> {
        let mut files: BTreeMap<&str, Vec<Hunk<'_>>> = BTreeMap::new();
        for outcome in report.updates() {
            for dependency in outcome.updated_dependencies() {
                for (new, old) in dependency.changed_requirements() {
                    files.entry(new.file.as_str()).or_default().push(Hunk {
                        name: dependency.name(),
                        old,
                        new,
                    });
                }
            }
        }
        files
    }

    fn constraint(requirement: &Requirement) -> String {
        let value = requirement.constraint.as_deref().unwrap_or("");
        match &requirement.property_name {
            Some(property) => format!("${{{}}} = {}", property, value),
            None => value.to_string(),
        }
    }
}

impl OutputFormatter for DiffFormatter {
    fn format(&self, result: &OrchestratorResult, writer: &mut dyn Write) -> std::io::Result<()> {
        for report in &result.summary.ecosystems {
            self.format_ecosystem(report, writer)?;
        }
        self.format_summary(&result.summary, writer)
    }

    fn format_summary(
        &self,
        summary: &UpdateSummary,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        writeln!(
            writer,
            "{}{} dependency(ies) updated in {} file(s)",
            self.dry_run_prefix(),
            summary.total_updates(),
            summary.files_modified()
        )
    }

    fn format_ecosystem(
        &self,
        report: &EcosystemReport,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let prefix = self.dry_run_prefix();
        for (file, hunks) in Self::hunks_by_file(report) {
            writeln!(writer, "{}--- a/{}", prefix, file)?;
            writeln!(writer, "{}+++ b/{}", prefix, file)?;
            for hunk in hunks {
                writeln!(writer, "@@ {} @@", hunk.name)?;
                writeln!(writer, "-  {}", Self::constraint(hunk.old))?;
                writeln!(writer, "+  {}", Self::constraint(hunk.new))?;
            }
            writeln!(writer)?;
        }
        Ok(())
    }

    fn format_dependencies(
        &self,
        parsed: &[ParsedEcosystem],
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        for ecosystem in parsed {
            for dependency in &ecosystem.dependencies {
                writeln!(
                    writer,
                    "{} {}",
                    dependency.name(),
                    dependency.version().unwrap_or("-")
                )?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Dependency, Ecosystem, UpdateOutcome};

    fn property_report() -> EcosystemReport {
        let requirement = |version: &str, file: &str| {
            Requirement::new(Some(version.to_string()), file)
                .with_property("guava.version", "pom.xml")
        };
        let guava = Dependency::new(
            "com.google.guava:guava",
            Some("23.3-jre".to_string()),
            vec![
                requirement("23.3-jre", "pom.xml"),
                requirement("23.3-jre", "core/pom.xml"),
            ],
            Ecosystem::Maven,
            true,
        )
        .unwrap()
        .with_update(
            Some("23.6-jre".to_string()),
            vec![
                requirement("23.6-jre", "pom.xml"),
                requirement("23.6-jre", "core/pom.xml"),
            ],
        )
        .unwrap();

        let mut report = EcosystemReport::new(Ecosystem::Maven);
        report.add_outcome(UpdateOutcome::Updated {
            dependencies: vec![guava],
            conflicts: Vec::new(),
        });
        report
    }

    #[test]
    fn test_diff_groups_by_file() {
        let formatter = DiffFormatter::new(false);
        let mut out = Vec::new();
        formatter
            .format_ecosystem(&property_report(), &mut out)
            .unwrap();
        let output = String::from_utf8(out).unwrap();

        let core = output.find("--- a/core/pom.xml").unwrap();
        let root = output.find("--- a/pom.xml").unwrap();
        assert!(core < root);
        assert!(output.contains("@@ com.google.guava:guava @@"));
        assert!(output.contains("-  ${guava.version} = 23.3-jre"));
        assert!(output.contains("+  ${guava.version} = 23.6-jre"));
    }

    #[test]
    fn test_dry_run_summary() {
        let formatter = DiffFormatter::new(true);
        let mut out = Vec::new();
        formatter
            .format_summary(&UpdateSummary::new(true), &mut out)
            .unwrap();
        assert!(String::from_utf8(out).unwrap().starts_with("(dry-run) 0 dependency"));
    }
}
