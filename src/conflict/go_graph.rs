//! `go mod graph` based inspection

use super::LockfileInspector;
use crate::config::Credential;
use crate::domain::{Conflict, DependencyFile, Ecosystem};
use crate::error::EngineError;
use crate::resolver::{
    go_environment, goproxy_setting, write_netrc, CommandRunner, CommandSpec, Workspace,
};
use crate::scheme::version_scheme;
use async_trait::async_trait;
use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

pub struct GoModGraphInspector {
    runner: Arc<dyn CommandRunner>,
    timeout: Duration,
    proxies: Vec<String>,
    credentials: Vec<Credential>,
}

impl GoModGraphInspector {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            runner,
            timeout: Duration::from_secs(300),
            proxies: Vec::new(),
            credentials: Vec::new(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_proxies(mut self, proxies: Vec<String>) -> Self {
        self.proxies = proxies;
        self
    }

    pub fn with_credentials(mut self, credentials: Vec<Credential>) -> Self {
        self.credentials = credentials;
        self
    }
}

/// Parses `go mod graph` output into conflicts on `dependency`
///
/// Edges from the main module (no `@version`) are the declarations being
/// updated and never conflict.
pub(crate) fn parse_graph(output: &str, dependency: &str, target: &str) -> Vec<Conflict> {
    let scheme = version_scheme(Ecosystem::GoModules);
    let mut conflicts: Vec<Conflict> = Vec::new();

    for line in output.lines() {
        let mut parts = line.split_whitespace();
        let (Some(from), Some(to)) = (parts.next(), parts.next()) else {
            continue;
        };
        let Some((parent, parent_version)) = from.rsplit_once('@') else {
            continue;
        };
        let Some((name, required)) = to.rsplit_once('@') else {
            continue;
        };
        if name != dependency {
            continue;
        }

        let newer = scheme
            .compare(required, target)
            .map(|ordering| ordering == Ordering::Greater)
            .unwrap_or(false);
        if !newer {
            continue;
        }

        let conflict = Conflict {
            name: parent.to_string(),
            version: scheme.normalize(parent_version),
            requirement: format!(">= {}", required),
        };
        if !conflicts.contains(&conflict) {
            conflicts.push(conflict);
        }
    }
    conflicts
}

#[async_trait]
impl LockfileInspector for GoModGraphInspector {
    async fn violations(
        &self,
        files: &[DependencyFile],
        dependency: &str,
        target: &str,
    ) -> Result<Vec<Conflict>, EngineError> {
        let workspace = Workspace::create(files)?;
        let netrc = write_netrc(&workspace, &self.credentials)?;
        let env = go_environment(&workspace, &goproxy_setting(&self.proxies), netrc);

        let mut conflicts = Vec::new();
        for manifest in files.iter().filter(|f| f.file_name() == "go.mod") {
            let mut spec = CommandSpec::new("go", workspace.path().join(manifest.parent_path()))
                .arg("mod")
                .arg("graph")
                .timeout(self.timeout);
            for (key, value) in &env {
                spec = spec.env(key, value);
            }

            let output = self.runner.run(&spec).await?;
            if !output.success {
                return Err(EngineError::Subprocess {
                    command: spec.display(),
                    message: output.stderr.trim().to_string(),
                });
            }

            for conflict in parse_graph(&output.stdout, dependency, target) {
                if !conflicts.contains(&conflict) {
                    conflicts.push(conflict);
                }
            }
        }

        debug!(dependency, target, count = conflicts.len(), "inspected module graph");
        Ok(conflicts)
    }
}
