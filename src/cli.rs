//! CLI argument parsing module for depshift

use crate::config::EngineConfig;
use crate::domain::Ecosystem;
use crate::error::ConfigError;
use crate::update::UpdateFilter;
use clap::{ArgAction, Parser};
use std::path::PathBuf;
use std::time::Duration;

/// Parse duration string in format: Ns (seconds), Nm (minutes), Nh (hours)
fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }

    let (num_str, unit) = if let Some(n) = s.strip_suffix('s') {
        (n, 's')
    } else if let Some(n) = s.strip_suffix('m') {
        (n, 'm')
    } else if let Some(n) = s.strip_suffix('h') {
        (n, 'h')
    } else {
        return Err(format!("invalid duration format: {}", s));
    };

    let num: u64 = num_str
        .parse()
        .map_err(|_| format!("invalid number in duration: {}", num_str))?;
    if num == 0 {
        return Err("duration must be at least 1s".to_string());
    }

    let seconds = match unit {
        's' => num,
        'm' => num * 60,
        _ => num * 60 * 60,
    };

    Ok(Duration::from_secs(seconds))
}

/// Dependency update engine for Go modules and Maven projects
#[derive(Parser, Debug, Clone)]
#[command(
    name = "depshift",
    version,
    about = "Dependency update engine for Go modules and Maven projects"
)]
pub struct CliArgs {
    /// Target directory (default: current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    // General options
    /// Dry run mode - show what would be updated without making changes
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Enable verbose output (debug logging)
    #[arg(long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Enable quiet mode - minimal output
    #[arg(short, long)]
    pub quiet: bool,

    /// Configuration file (default: <path>/.depshift.toml when present)
    #[arg(long)]
    pub config: Option<PathBuf>,

    // Ecosystem filters
    /// Update only Go (go.mod) dependencies
    #[arg(long)]
    pub go: bool,

    /// Update only Maven (pom.xml) dependencies
    #[arg(long)]
    pub maven: bool,

    // Dependency filters
    /// Exclude specific dependencies from update (can be specified multiple times)
    #[arg(long, action = ArgAction::Append)]
    pub exclude: Vec<String>,

    /// Update only specific dependencies (can be specified multiple times)
    #[arg(long, action = ArgAction::Append)]
    pub only: Vec<String>,

    /// Also update Go dependencies marked `// indirect`
    #[arg(long)]
    pub include_indirect: bool,

    // Version policy
    /// Propose pre-release versions
    #[arg(long)]
    pub allow_prerelease: bool,

    /// Only propose versions that satisfy the current requirements
    #[arg(long)]
    pub no_unlock: bool,

    /// Registry request timeout (e.g., 30s, 2m)
    #[arg(long, value_parser = parse_duration)]
    pub timeout: Option<Duration>,

    // Output options
    /// List parsed dependencies without checking for updates
    #[arg(long)]
    pub list: bool,

    /// Output results in JSON format
    #[arg(long, conflicts_with = "diff")]
    pub json: bool,

    /// Show requirement changes in diff format
    #[arg(long)]
    pub diff: bool,
}

impl CliArgs {
    /// Check if any ecosystem filter is specified
    pub fn has_ecosystem_filter(&self) -> bool {
        self.go || self.maven
    }

    /// Ecosystems selected on the command line, empty for all
    pub fn ecosystems(&self) -> Vec<Ecosystem> {
        let mut ecosystems = Vec::new();
        if self.go {
            ecosystems.push(Ecosystem::GoModules);
        }
        if self.maven {
            ecosystems.push(Ecosystem::Maven);
        }
        ecosystems
    }

    /// Build an UpdateFilter from the arguments
    pub fn build_filter(&self) -> UpdateFilter {
        UpdateFilter::new()
            .with_ecosystems(self.ecosystems())
            .with_exclude(self.exclude.clone())
            .with_only(self.only.clone())
            .with_include_indirect(self.include_indirect)
    }

    /// Load the configuration file and apply command line overrides
    pub fn load_config(&self) -> Result<EngineConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => EngineConfig::load(path)?,
            None => EngineConfig::discover(&self.path)?,
        };

        if self.allow_prerelease {
            config.allow_prerelease = true;
        }
        if self.no_unlock {
            config.unlock = false;
        }
        if let Some(timeout) = self.timeout {
            config.timeout_secs = timeout.as_secs();
        }
        Ok(config)
    }
}
