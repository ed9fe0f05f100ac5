//! Native tool execution
//!
//! This module provides:
//! - A `CommandRunner` trait so resolvers can be tested without a toolchain
//! - `SystemCommandRunner`, which runs the tool with a cleared environment,
//!   a timeout and kill-on-drop

use crate::error::EngineError;
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

/// A command to run inside a resolver workspace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    /// Complete environment of the child; nothing is inherited
    pub env: Vec<(String, String)>,
    pub working_dir: PathBuf,
    pub timeout: Duration,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: Vec::new(),
            working_dir: working_dir.into(),
            timeout: Duration::from_secs(300),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Command line for logs and error messages
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Captured result of a finished command
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            success: true,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failure(stderr: impl Into<String>) -> Self {
        Self {
            success: false,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }
}

/// Trait for running native tools
///
/// A non-zero exit is a normal `CommandOutput`; `Err` means the command
/// could not be started or did not finish in time.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, EngineError>;
}

/// Runner that executes real commands
#[derive(Debug, Default)]
pub struct SystemCommandRunner;

impl SystemCommandRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandRunner for SystemCommandRunner {
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, EngineError> {
        let failed = |message: String| EngineError::Subprocess {
            command: spec.display(),
            message,
        };

        debug!(command = %spec.display(), dir = %spec.working_dir.display(), "running native tool");
        let child = Command::new(&spec.program)
            .args(&spec.args)
            .env_clear()
            .envs(spec.env.iter().map(|(k, v)| (k, v)))
            .current_dir(&spec.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| failed(e.to_string()))?;

        let output = tokio::time::timeout(spec.timeout, child.wait_with_output())
            .await
            .map_err(|_| failed(format!("timed out after {}s", spec.timeout.as_secs())))?
            .map_err(|e| failed(e.to_string()))?;

        Ok(CommandOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_spec_builder() {
        let spec = CommandSpec::new("go", "/tmp/work")
            .arg("get")
            .arg("rsc.io/quote@v1.5.2")
            .env("GOFLAGS", "-mod=mod")
            .timeout(Duration::from_secs(10));

        assert_eq!(spec.display(), "go get rsc.io/quote@v1.5.2");
        assert_eq!(spec.env, vec![("GOFLAGS".to_string(), "-mod=mod".to_string())]);
        assert_eq!(spec.timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_command_output_constructors() {
        assert!(CommandOutput::success("ok").success);
        let failure = CommandOutput::failure("boom");
        assert!(!failure.success);
        assert_eq!(failure.stderr, "boom");
    }

    #[tokio::test]
    async fn test_missing_program_is_subprocess_error() {
        let spec = CommandSpec::new("depshift-no-such-tool", std::env::temp_dir());
        let err = SystemCommandRunner::new().run(&spec).await.unwrap_err();
        assert!(matches!(err, EngineError::Subprocess { .. }));
        assert!(err.is_unreachable());
    }
}
