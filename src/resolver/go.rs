//! Go toolchain resolver
//!
//! Runs `go get module@version` in a workspace copy of every go.mod that
//! requires the module and reads back the go.mod and go.sum it wrote. The
//! child process sees only an explicit environment.

use super::{CommandRunner, CommandSpec, ResolutionRequest, ResolvedFiles, Resolver, Workspace};
use crate::config::Credential;
use crate::domain::{DependencyFile, Ecosystem};
use crate::error::{EngineError, RegistryError};
use crate::manifest::{local_replacements, required_version, retarget_replacements};
use crate::registry::GO_PROXY_URL;
use crate::scheme::version_scheme;
use async_trait::async_trait;
use regex::Regex;
use std::path::Path;
use std::sync::{Arc, LazyLock};
use std::time::Duration;
use tracing::{debug, info};

/// Variables copied from the parent environment when set
const INHERITED_ENV: [&str; 5] = ["PATH", "HOME", "GOPATH", "GOMODCACHE", "GOCACHE"];

static MISSING_REPLACEMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"replacement directory (\S+) does not exist").unwrap());

static PRIVATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)terminal prompts disabled|could not read username|authentication failed|401 unauthorized|403 forbidden|repository not found",
    )
    .unwrap()
});

// Module path reported at the start of a `go: module@version: ...` line
static FAILING_MODULE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^go: (?:[a-z]+ )?([^\s@:]+)@").unwrap());

static NETWORK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)dial tcp|i/o timeout|connection refused|tls handshake timeout|no such host")
        .unwrap()
});

pub struct GoResolver {
    runner: Arc<dyn CommandRunner>,
    timeout: Duration,
    proxies: Vec<String>,
}

impl GoResolver {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            runner,
            timeout: Duration::from_secs(300),
            proxies: Vec::new(),
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
}

/// Value of GOPROXY for the configured proxy chain
pub(crate) fn goproxy_setting(proxies: &[String]) -> String {
    if proxies.is_empty() {
        format!("{},direct", GO_PROXY_URL)
    } else {
        proxies.join(",")
    }
}

/// The complete environment of a `go` child process
pub(crate) fn go_environment(workspace: &Workspace, goproxy: &str, netrc: bool) -> Vec<(String, String)> {
    let mut env: Vec<(String, String)> = INHERITED_ENV
        .iter()
        .filter_map(|key| std::env::var(key).ok().map(|value| (key.to_string(), value)))
        .collect();
    if !env.iter().any(|(k, _)| k == "HOME") {
        env.push(("HOME".to_string(), workspace.path().display().to_string()));
    }

    env.push(("GOPROXY".to_string(), goproxy.to_string()));
    env.push(("GOFLAGS".to_string(), "-mod=mod".to_string()));
    env.push(("GOTOOLCHAIN".to_string(), "local".to_string()));
    env.push(("GIT_TERMINAL_PROMPT".to_string(), "0".to_string()));
    if netrc {
        env.push((
            "NETRC".to_string(),
            workspace.path().join(".netrc").display().to_string(),
        ));
    }
    env
}

/// Writes `credentials` as a netrc file into the workspace
///
/// Returns false when there is nothing to write.
pub(crate) fn write_netrc(workspace: &Workspace, credentials: &[Credential]) -> Result<bool, EngineError> {
    if credentials.is_empty() {
        return Ok(false);
    }
    let content: String = credentials
        .iter()
        .map(|c| format!("machine {} login {} password {}\n", c.host, c.username, c.password))
        .collect();
    let path = workspace.path().join(".netrc");
    std::fs::write(&path, content).map_err(|e| EngineError::io(&path, e))?;
    Ok(true)
}

/// Joins a relative replacement target onto a directory inside the project
///
/// Returns `None` for absolute targets or targets leaving the project.
fn resolve_relative(base: &str, target: &str) -> Option<String> {
    if target.starts_with('/') {
        return None;
    }
    let mut parts: Vec<&str> = base.split('/').filter(|p| !p.is_empty()).collect();
    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop()?;
            }
            other => parts.push(other),
        }
    }
    Some(parts.join("/"))
}

/// A local replacement the workspace copy must reach on disk
#[derive(Debug, Clone, PartialEq, Eq)]
struct PinnedReplacement {
    manifest: String,
    target: String,
    absolute: String,
}

/// Local replacements of the file set, checked against the project on disk
///
/// Targets whose go.mod is part of the file set need nothing. Relative
/// targets found on disk outside the file set are pinned to their absolute
/// path; everything else is missing.
fn locate_replacements(
    files: &[DependencyFile],
) -> Result<(Vec<PinnedReplacement>, Vec<String>), EngineError> {
    let mut pinned = Vec::new();
    let mut missing = Vec::new();
    for file in files.iter().filter(|f| f.file_name() == "go.mod") {
        for target in local_replacements(file.name(), file.content())? {
            let in_files = resolve_relative(file.parent_path(), &target).is_some_and(|dir| {
                let manifest = if dir.is_empty() {
                    "go.mod".to_string()
                } else {
                    format!("{}/go.mod", dir)
                };
                files.iter().any(|f| f.name() == manifest)
            });
            if in_files {
                continue;
            }

            let on_disk = Path::new(file.directory())
                .join(file.parent_path())
                .join(&target);
            let found = on_disk
                .join("go.mod")
                .is_file()
                .then(|| std::fs::canonicalize(&on_disk).ok())
                .flatten()
                .and_then(|path| path.to_str().map(str::to_string));
            match found {
                Some(_) if target.starts_with('/') => {}
                Some(absolute) => pinned.push(PinnedReplacement {
                    manifest: file.name().to_string(),
                    target,
                    absolute,
                }),
                None if !missing.contains(&target) => missing.push(target),
                None => {}
            }
        }
    }
    Ok((pinned, missing))
}

/// Points the workspace copies of the manifests at pinned replacements
fn pin_replacements(
    workspace: &Workspace,
    files: &[DependencyFile],
    pinned: &[PinnedReplacement],
) -> Result<(), EngineError> {
    for file in files.iter().filter(|f| f.file_name() == "go.mod") {
        let pins: Vec<&PinnedReplacement> =
            pinned.iter().filter(|p| p.manifest == file.name()).collect();
        if pins.is_empty() {
            continue;
        }
        let content = retarget_replacements(file.name(), file.content(), |target| {
            pins.iter()
                .find(|p| p.target == target)
                .map(|p| p.absolute.clone())
        })?;
        workspace.write(file.name(), &content)?;
    }
    Ok(())
}

/// Restores the original targets in a go.mod read back from the workspace
fn unpin_replacements(
    manifest: &str,
    content: &str,
    pinned: &[PinnedReplacement],
) -> Result<String, EngineError> {
    if !pinned.iter().any(|p| p.manifest == manifest) {
        return Ok(content.to_string());
    }
    retarget_replacements(manifest, content, |target| {
        pinned
            .iter()
            .find(|p| p.manifest == manifest && p.absolute == target)
            .map(|p| p.target.clone())
    })
}

/// Collects `name` from the workspace when the tool changed it
fn changed_file(
    originals: &[DependencyFile],
    name: &str,
    content: String,
    changed: &mut Vec<DependencyFile>,
) {
    match originals.iter().find(|f| f.name() == name) {
        Some(file) if file.content() == content => {}
        Some(file) => changed.push(file.with_content(content)),
        None => changed.push(DependencyFile::new(name, content)),
    }
}

/// Translates `go` stderr into the engine error taxonomy
fn classify_failure(module: &str, stderr: &str) -> EngineError {
    let names: Vec<String> = MISSING_REPLACEMENT_RE
        .captures_iter(stderr)
        .map(|caps| caps[1].to_string())
        .collect();
    if !names.is_empty() {
        return EngineError::PathDependenciesNotReachable { names };
    }

    if PRIVATE_RE.is_match(stderr) {
        let url = FAILING_MODULE_RE
            .captures(stderr)
            .map(|caps| caps[1].to_string())
            .unwrap_or_else(|| module.to_string());
        return EngineError::private_source(url);
    }

    let message = stderr
        .lines()
        .filter(|l| !l.trim().is_empty())
        .last()
        .unwrap_or("go get failed")
        .trim()
        .to_string();

    if NETWORK_RE.is_match(stderr) {
        return RegistryError::unreachable(module, "Go Proxy", message).into();
    }

    EngineError::not_resolvable(message)
}

fn directory_of(manifest: &str) -> &str {
    manifest.strip_suffix("go.mod").unwrap_or("")
}

#[async_trait]
impl Resolver for GoResolver {
    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::GoModules
    }

    async fn resolve(&self, request: &ResolutionRequest) -> Result<ResolvedFiles, EngineError> {
        let module = request.dependency_name.as_str();
        let scheme = version_scheme(Ecosystem::GoModules);
        let target = format!("v{}", scheme.normalize(&request.candidate_version));

        let (pinned, missing) = locate_replacements(&request.files)?;
        if !missing.is_empty() {
            return Err(EngineError::PathDependenciesNotReachable { names: missing });
        }

        let mut manifests = Vec::new();
        for file in request.files.iter().filter(|f| f.file_name() == "go.mod") {
            if required_version(file.name(), file.content(), module)?.is_some() {
                manifests.push(file.name().to_string());
            }
        }
        if manifests.is_empty() {
            return Err(EngineError::not_resolvable(format!(
                "no go.mod requires {}",
                module
            )));
        }

        let workspace = Workspace::create(&request.files)?;
        pin_replacements(&workspace, &request.files, &pinned)?;
        let netrc = write_netrc(&workspace, &request.credentials)?;
        let env = go_environment(&workspace, &goproxy_setting(&self.proxies), netrc);

        let mut selected = None;
        let mut changed = Vec::new();
        for manifest in &manifests {
            let dir = directory_of(manifest);
            let mut spec = CommandSpec::new("go", workspace.path().join(dir))
                .arg("get")
                .arg(format!("{}@{}", module, target))
                .timeout(self.timeout);
            for (key, value) in &env {
                spec = spec.env(key, value);
            }

            let output = self.runner.run(&spec).await?;
            if !output.success {
                debug!(module, target = target.as_str(), stderr = output.stderr.as_str(), "go get rejected candidate");
                return Err(classify_failure(module, &output.stderr));
            }

            // go get may raise other requirements too; go.mod and go.sum must agree
            if let Some(content) = workspace.read(manifest)? {
                let content = unpin_replacements(manifest, &content, &pinned)?;
                if let Some(version) = required_version(manifest, &content, module)? {
                    selected.get_or_insert(scheme.normalize(&version));
                }
                changed_file(&request.files, manifest, content, &mut changed);
            }

            let sum_name = format!("{}go.sum", dir);
            if let Some(content) = workspace.read(&sum_name)? {
                changed_file(&request.files, &sum_name, content, &mut changed);
            }
        }

        let version = selected.unwrap_or_else(|| scheme.normalize(&target));
        info!(module, version = version.as_str(), "go accepted version");
        Ok(ResolvedFiles {
            version,
            files: changed,
        })
    }
}
