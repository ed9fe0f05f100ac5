//! Engine configuration
//!
//! Settings are read from `.depshift.toml` in the target directory (or an
//! explicit path) and then overridden by command line flags.
//!
//! ```toml
//! allow_prerelease = false
//! timeout_secs = 30
//! max_resolution_attempts = 5
//! repositories = ["https://repo.example.com/maven2"]
//!
//! [[ignore]]
//! dependency = "com.google.guava:guava"
//! versions = ["[24.0,)"]
//!
//! [[credentials]]
//! host = "repo.example.com"
//! username = "deploy"
//! password = "secret"
//! ```

use crate::domain::Ecosystem;
use crate::error::ConfigError;
use crate::scheme::requirement_scheme;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default configuration file name
pub const CONFIG_FILE_NAME: &str = ".depshift.toml";

/// Credentials for one registry host
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// Host name the credential applies to (e.g. `repo.example.com`)
    pub host: String,
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("host", &self.host)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Versions of a dependency that must never be proposed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IgnoreRule {
    /// Dependency name as reported by the parser
    pub dependency: String,
    /// Requirement strings in the ecosystem grammar; empty ignores every update
    #[serde(default)]
    pub versions: Vec<String>,
}

impl IgnoreRule {
    /// Returns true if `version` of `dependency` is ignored by this rule
    ///
    /// Requirements that do not parse in the ecosystem grammar fall back to
    /// exact string comparison.
    pub fn ignores(&self, ecosystem: Ecosystem, dependency: &str, version: &str) -> bool {
        if self.dependency != dependency {
            return false;
        }
        if self.versions.is_empty() {
            return true;
        }
        let scheme = requirement_scheme(ecosystem);
        self.versions.iter().any(|requirement| {
            scheme
                .satisfied_by(requirement, version)
                .unwrap_or_else(|_| requirement.trim() == version)
        })
    }
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_resolver_timeout_secs() -> u64 {
    300
}

fn default_max_resolution_attempts() -> usize {
    5
}

fn default_true() -> bool {
    true
}

/// Configuration for an update run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Propose pre-release versions even when the current version is stable
    #[serde(default)]
    pub allow_prerelease: bool,
    /// Propose Go `+incompatible` versions
    #[serde(default)]
    pub allow_incompatible: bool,
    /// Allow moving outside the current requirement (stage 2); otherwise
    /// only versions satisfying it are proposed
    #[serde(default = "default_true")]
    pub unlock: bool,
    /// HTTP timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Native resolver subprocess timeout in seconds
    #[serde(default = "default_resolver_timeout_secs")]
    pub resolver_timeout_secs: u64,
    /// Candidates tried against the resolver per dependency
    #[serde(default = "default_max_resolution_attempts")]
    pub max_resolution_attempts: usize,
    /// Extra Maven repositories consulted before Maven Central
    #[serde(default)]
    pub repositories: Vec<String>,
    /// Go module proxies consulted in order
    #[serde(default)]
    pub go_proxies: Vec<String>,
    #[serde(default)]
    pub ignore: Vec<IgnoreRule>,
    #[serde(default)]
    pub credentials: Vec<Credential>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            allow_prerelease: false,
            allow_incompatible: false,
            unlock: true,
            timeout_secs: default_timeout_secs(),
            resolver_timeout_secs: default_resolver_timeout_secs(),
            max_resolution_attempts: default_max_resolution_attempts(),
            repositories: Vec::new(),
            go_proxies: Vec::new(),
            ignore: Vec::new(),
            credentials: Vec::new(),
        }
    }
}

impl EngineConfig {
    /// Parse configuration from TOML text; `path` is only used for errors
    pub fn from_toml(path: &Path, content: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig =
            toml::from_str(content).map_err(|e| ConfigError::InvalidConfig {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        config.validate(path)?;
        Ok(config)
    }

    /// Load configuration from `path`
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml(path, &content)
    }

    /// Load `.depshift.toml` from `dir` if present, defaults otherwise
    pub fn discover(dir: &Path) -> Result<Self, ConfigError> {
        let path = Self::default_path(dir);
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Default configuration file location for `dir`
    pub fn default_path(dir: &Path) -> PathBuf {
        dir.join(CONFIG_FILE_NAME)
    }

    fn validate(&self, path: &Path) -> Result<(), ConfigError> {
        let invalid = |message: &str| ConfigError::InvalidConfig {
            path: path.to_path_buf(),
            message: message.to_string(),
        };
        if self.max_resolution_attempts == 0 {
            return Err(invalid("max_resolution_attempts must be at least 1"));
        }
        if self.timeout_secs == 0 || self.resolver_timeout_secs == 0 {
            return Err(invalid("timeouts must be at least 1 second"));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn resolver_timeout(&self) -> Duration {
        Duration::from_secs(self.resolver_timeout_secs)
    }

    /// Returns true if any ignore rule covers `version` of `dependency`
    pub fn is_ignored(&self, ecosystem: Ecosystem, dependency: &str, version: &str) -> bool {
        self.ignore
            .iter()
            .any(|rule| rule.ignores(ecosystem, dependency, version))
    }
}
