//! Output formatting for update results
//!
//! This module provides:
//! - Text output for human-readable display
//! - JSON output for machine processing
//! - Diff output for showing requirement changes

mod diff;
mod json;
mod text;

pub use diff::DiffFormatter;
pub use json::JsonFormatter;
pub use text::{TextFormatter, VersionChangeType};

use crate::domain::{EcosystemReport, UpdateSummary};
use crate::orchestrator::{OrchestratorResult, ParsedEcosystem};
use std::io::Write;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output for machine processing
    Json,
    /// Unified diff format
    Diff,
}

/// Output verbosity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Minimal output
    Quiet,
    /// Normal output
    #[default]
    Normal,
    /// Also show up-to-date and skipped dependencies
    Verbose,
}

/// Configuration for output formatting
#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub verbosity: Verbosity,
    pub dry_run: bool,
    /// Whether to use colors (when supported)
    pub color: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            verbosity: Verbosity::default(),
            dry_run: false,
            color: true,
        }
    }
}

impl OutputConfig {
    /// Create configuration from CLI arguments
    pub fn from_cli(json: bool, diff: bool, verbose: bool, quiet: bool, dry_run: bool) -> Self {
        let format = if json {
            OutputFormat::Json
        } else if diff {
            OutputFormat::Diff
        } else {
            OutputFormat::Text
        };

        let verbosity = if quiet {
            Verbosity::Quiet
        } else if verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Normal
        };

        Self {
            format,
            verbosity,
            dry_run,
            color: true,
        }
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }
}

/// Trait for output formatters
pub trait OutputFormatter {
    /// Format and write the orchestrator result
    fn format(&self, result: &OrchestratorResult, writer: &mut dyn Write) -> std::io::Result<()>;

    /// Format and write just the summary
    fn format_summary(&self, summary: &UpdateSummary, writer: &mut dyn Write)
        -> std::io::Result<()>;

    /// Format and write the outcomes of one ecosystem
    fn format_ecosystem(
        &self,
        report: &EcosystemReport,
        writer: &mut dyn Write,
    ) -> std::io::Result<()>;

    /// Format parsed dependencies (`--list`)
    fn format_dependencies(
        &self,
        parsed: &[ParsedEcosystem],
        writer: &mut dyn Write,
    ) -> std::io::Result<()>;
}

/// Create an output formatter based on configuration
pub fn create_formatter(config: OutputConfig) -> Box<dyn OutputFormatter> {
    match config.format {
        OutputFormat::Text => Box::new(TextFormatter::with_color(
            config.verbosity,
            config.dry_run,
            config.color,
        )),
        OutputFormat::Json => Box::new(JsonFormatter::new(config.verbosity)),
        OutputFormat::Diff => Box::new(DiffFormatter::new(config.dry_run)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_config_default() {
        let config = OutputConfig::default();
        assert_eq!(config.format, OutputFormat::Text);
        assert_eq!(config.verbosity, Verbosity::Normal);
        assert!(!config.dry_run);
        assert!(config.color);
    }

    #[test]
    fn test_output_config_from_cli() {
        let config = OutputConfig::from_cli(true, false, false, false, false);
        assert_eq!(config.format, OutputFormat::Json);

        let config = OutputConfig::from_cli(false, true, false, false, true);
        assert_eq!(config.format, OutputFormat::Diff);
        assert!(config.dry_run);

        let config = OutputConfig::from_cli(false, false, true, false, false);
        assert_eq!(config.verbosity, Verbosity::Verbose);

        let config = OutputConfig::from_cli(false, false, false, true, false);
        assert_eq!(config.verbosity, Verbosity::Quiet);
    }

    #[test]
    fn test_output_config_with_color() {
        assert!(!OutputConfig::default().with_color(false).color);
    }
}
