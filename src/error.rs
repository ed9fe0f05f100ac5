//! Engine error types using thiserror
//!
//! Error hierarchy:
//! - EngineError: everything the update pipeline surfaces to its caller
//! - VersionError: malformed version or requirement strings
//! - RegistryError: package registry communication
//! - ConfigError: configuration file and CLI option problems

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::Ecosystem;

/// Errors surfaced by the dependency update engine
#[derive(Error, Debug)]
pub enum EngineError {
    /// A dependency file exists but its content cannot be structurally parsed
    #[error("dependency file {path} is not parseable: {message}")]
    DependencyFileNotParseable { path: String, message: String },

    /// A mandatory dependency file is missing from the file set
    #[error("required dependency file not found: {path}")]
    DependencyFileNotFound { path: String },

    /// No candidate version satisfies the native resolver
    #[error("dependency files are not resolvable: {message}")]
    DependencyFileNotResolvable { message: String },

    /// A declared private registry or repository could not be reached
    #[error("private source not reachable: {url}")]
    PrivateSourceNotReachable { url: String },

    /// Locally path-referenced manifests are missing
    #[error("path dependencies not reachable: {}", names.join(", "))]
    PathDependenciesNotReachable { names: Vec<String> },

    /// Not every dependency sharing a property accepts the target version
    #[error(
        "property '{property}' cannot be updated to {target}: not available for {}",
        blocking.join(", ")
    )]
    PropertyUpdateNotPossible {
        property: String,
        target: String,
        blocking: Vec<String>,
    },

    /// Malformed version or requirement
    #[error(transparent)]
    InvalidVersion(#[from] VersionError),

    /// A computed replacement did not alter the file content
    #[error("expected content of {path} to change when updating {dependency}")]
    UnexpectedContentUnchanged { path: String, dependency: String },

    /// A dependency record violates a model invariant
    #[error("invalid dependency '{name}': {message}")]
    InvalidModel { name: String, message: String },

    /// Registry communication failure
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// A native tool could not be started or timed out
    #[error("failed to run '{command}': {message}")]
    Subprocess { command: String, message: String },

    /// IO failure while preparing a workspace or loading files
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors for malformed version and requirement strings
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionError {
    /// The string is not a version in the ecosystem's grammar
    #[error("invalid {ecosystem} version '{version}'")]
    InvalidVersion { version: String, ecosystem: Ecosystem },

    /// The string is not a requirement in the ecosystem's grammar
    #[error("invalid {ecosystem} requirement '{requirement}'")]
    InvalidRequirement {
        requirement: String,
        ecosystem: Ecosystem,
    },
}

/// Errors related to package registry communication
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Package (or file) definitively absent from the registry
    #[error("package '{package}' not found in {registry} registry")]
    PackageNotFound { package: String, registry: String },

    /// Connection failure; the answer is unknown rather than negative
    #[error("{registry} unreachable while fetching '{package}': {message}")]
    Unreachable {
        package: String,
        registry: String,
        message: String,
    },

    /// Request exceeded the configured timeout
    #[error("timeout while fetching '{package}' from {registry}")]
    Timeout { package: String, registry: String },

    /// Credentials missing or rejected
    #[error("authentication failed for {url}: {message}")]
    AuthenticationError { url: String, message: String },

    /// Invalid response body
    #[error("invalid response from {registry} for '{package}': {message}")]
    InvalidResponse {
        package: String,
        registry: String,
        message: String,
    },

    /// Package name does not fit the registry's naming scheme
    #[error("invalid package name '{name}' for {registry}: {reason}")]
    InvalidPackageName {
        name: String,
        registry: String,
        reason: String,
    },
}

/// Errors related to configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read
    #[error("failed to read config file {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for the expected schema
    #[error("invalid config file {path}: {message}")]
    InvalidConfig { path: PathBuf, message: String },

    /// Conflicting options
    #[error("conflicting options: {message}")]
    ConflictingOptions { message: String },
}

impl EngineError {
    /// Creates a new DependencyFileNotParseable error
    pub fn not_parseable(path: impl Into<String>, message: impl Into<String>) -> Self {
        EngineError::DependencyFileNotParseable {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a new DependencyFileNotFound error
    pub fn file_not_found(path: impl Into<String>) -> Self {
        EngineError::DependencyFileNotFound { path: path.into() }
    }

    /// Creates a new DependencyFileNotResolvable error
    pub fn not_resolvable(message: impl Into<String>) -> Self {
        EngineError::DependencyFileNotResolvable {
            message: message.into(),
        }
    }

    /// Creates a new PrivateSourceNotReachable error
    pub fn private_source(url: impl Into<String>) -> Self {
        EngineError::PrivateSourceNotReachable { url: url.into() }
    }

    /// Creates a new IO error
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        EngineError::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns true when the error means "the answer is unknown" rather than "no"
    ///
    /// Callers use this to report a blocked update instead of an impossible one.
    pub fn is_unreachable(&self) -> bool {
        match self {
            EngineError::PrivateSourceNotReachable { .. }
            | EngineError::PathDependenciesNotReachable { .. }
            | EngineError::Subprocess { .. } => true,
            EngineError::Registry(e) => e.is_unreachable(),
            _ => false,
        }
    }
}

impl RegistryError {
    /// Creates a new PackageNotFound error
    pub fn package_not_found(package: impl Into<String>, registry: impl Into<String>) -> Self {
        RegistryError::PackageNotFound {
            package: package.into(),
            registry: registry.into(),
        }
    }

    /// Creates a new Unreachable error
    pub fn unreachable(
        package: impl Into<String>,
        registry: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        RegistryError::Unreachable {
            package: package.into(),
            registry: registry.into(),
            message: message.into(),
        }
    }

    /// Creates a new Timeout error
    pub fn timeout(package: impl Into<String>, registry: impl Into<String>) -> Self {
        RegistryError::Timeout {
            package: package.into(),
            registry: registry.into(),
        }
    }

    /// Returns true for network-level failures
    pub fn is_unreachable(&self) -> bool {
        matches!(
            self,
            RegistryError::Unreachable { .. }
                | RegistryError::Timeout { .. }
                | RegistryError::AuthenticationError { .. }
        )
    }

    /// Returns the registry name for this ecosystem
    pub fn registry_name(ecosystem: Ecosystem) -> &'static str {
        match ecosystem {
            Ecosystem::GoModules => "Go Proxy",
            Ecosystem::Maven => "Maven Repository",
        }
    }
}
