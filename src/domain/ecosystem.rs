//! Ecosystem identifiers for supported package managers
//!
//! The set is closed: adding an ecosystem means adding a variant here and
//! wiring its scheme, parser, updater and registry in the match tables.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported packaging ecosystems
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ecosystem {
    /// Go modules (go.mod / go.sum)
    GoModules,
    /// Maven (pom.xml)
    Maven,
}

impl Ecosystem {
    /// Returns the manifest filename for this ecosystem
    pub fn manifest_filename(&self) -> &'static str {
        match self {
            Ecosystem::GoModules => "go.mod",
            Ecosystem::Maven => "pom.xml",
        }
    }

    /// Returns the lockfile name, if the ecosystem has one
    pub fn lockfile_name(&self) -> Option<&'static str> {
        match self {
            Ecosystem::GoModules => Some("go.sum"),
            Ecosystem::Maven => None,
        }
    }

    /// Returns the stable identifier used in config files and JSON output
    pub fn identifier(&self) -> &'static str {
        match self {
            Ecosystem::GoModules => "go_modules",
            Ecosystem::Maven => "maven",
        }
    }

    /// Returns the display name for this ecosystem
    pub fn display_name(&self) -> &'static str {
        match self {
            Ecosystem::GoModules => "Go modules",
            Ecosystem::Maven => "Maven",
        }
    }

    /// Returns all supported ecosystems
    pub fn all() -> &'static [Ecosystem] {
        &[Ecosystem::GoModules, Ecosystem::Maven]
    }
}

impl fmt::Display for Ecosystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for Ecosystem {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "go" | "gomod" | "go_modules" | "go-modules" => Ok(Ecosystem::GoModules),
            "maven" | "mvn" => Ok(Ecosystem::Maven),
            other => Err(format!(
                "unknown ecosystem '{}': expected 'go_modules' or 'maven'",
                other
            )),
        }
    }
}
