//! go.mod parser and updater for Go projects
//!
//! Handles:
//! - module, go and toolchain directives
//! - require statements (single and block), `// indirect` markers
//! - replace directives (local paths become path sources)
//! - exclude, retract and other directives (recognised, skipped)
//!
//! Every require line is checked against the major-version path rule.

use super::{merge_dependency, replace_span, FileParser, FileUpdater};
use crate::domain::{Dependency, DependencyFile, Ecosystem, Requirement, Source};
use crate::error::EngineError;
use crate::scheme::{version_scheme, GoVersion};
use async_trait::async_trait;
use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;
use tracing::debug;

// Whitespace separated tokens on a line
static TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\S+").unwrap());

// Trailing /vN major suffix of a module path
static PATH_MAJOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/v([2-9]|[1-9]\d+)$").unwrap());

// gopkg.in style .vN suffix
static GOPKG_MAJOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^gopkg\.in/.*\.v(\d+)(?:-unstable)?$").unwrap());

const DIRECTIVES: [&str; 10] = [
    "module", "go", "toolchain", "require", "replace", "exclude", "retract", "godebug", "tool",
    "ignore",
];

/// A require entry located in a go.mod file
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RequireEntry {
    pub module: String,
    pub version: String,
    /// Byte span of the version token in the file content
    pub span: Range<usize>,
    pub indirect: bool,
}

/// A replace directive
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ReplaceEntry {
    pub module: String,
    pub version: Option<String>,
    pub target: String,
    /// Byte span of the target token in the file content
    pub target_span: Range<usize>,
}

impl ReplaceEntry {
    /// Returns true when the replacement is a directory on disk
    pub fn is_local(&self) -> bool {
        self.target.starts_with("./") || self.target.starts_with("../") || self.target.starts_with('/')
    }

    fn applies_to(&self, module: &str, version: &str) -> bool {
        self.module == module && self.version.as_deref().map_or(true, |v| v == version)
    }
}

/// Structural view of a go.mod file
#[derive(Debug, Clone, Default)]
pub(crate) struct GoModFile {
    pub module: Option<String>,
    pub requires: Vec<RequireEntry>,
    pub replaces: Vec<ReplaceEntry>,
}

/// Local directory targets of the replace directives in a go.mod file
pub fn local_replacements(path: &str, content: &str) -> Result<Vec<String>, EngineError> {
    Ok(scan(path, content)?
        .replaces
        .into_iter()
        .filter(|r| r.is_local())
        .map(|r| r.target)
        .collect())
}

/// Rewrites local replace targets for which `retarget` returns a new path
pub fn retarget_replacements(
    path: &str,
    content: &str,
    retarget: impl Fn(&str) -> Option<String>,
) -> Result<String, EngineError> {
    let mut replaces: Vec<ReplaceEntry> = scan(path, content)?
        .replaces
        .into_iter()
        .filter(|r| r.is_local())
        .collect();
    replaces.sort_by_key(|r| std::cmp::Reverse(r.target_span.start));

    let mut result = content.to_string();
    for entry in replaces {
        if let Some(target) = retarget(&entry.target) {
            result = replace_span(&result, entry.target_span, &target);
        }
    }
    Ok(result)
}

/// Version literal with which a go.mod file requires `module`
pub fn required_version(
    path: &str,
    content: &str,
    module: &str,
) -> Result<Option<String>, EngineError> {
    Ok(scan(path, content)?
        .requires
        .into_iter()
        .find(|r| r.module == module)
        .map(|r| r.version))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Block {
    Require,
    Replace,
    Other,
}

/// Scans `content` into a [`GoModFile`]
pub(crate) fn scan(path: &str, content: &str) -> Result<GoModFile, EngineError> {
    let mut file = GoModFile::default();
    let mut block: Option<Block> = None;
    let mut offset = 0;

    for (index, raw_line) in content.split_inclusive('\n').enumerate() {
        let line_no = index + 1;
        let line_start = offset;
        offset += raw_line.len();

        let line = raw_line.trim_end_matches(['\n', '\r']);
        let (code, comment) = match line.find("//") {
            Some(pos) => (&line[..pos], &line[pos + 2..]),
            None => (line, ""),
        };
        let tokens: Vec<(Range<usize>, &str)> = TOKEN_RE
            .find_iter(code)
            .map(|m| ((line_start + m.start())..(line_start + m.end()), m.as_str()))
            .collect();

        if tokens.is_empty() {
            continue;
        }

        let fail = |message: String| EngineError::not_parseable(path, format!("line {}: {}", line_no, message));

        if let Some(kind) = block {
            if tokens.len() == 1 && tokens[0].1 == ")" {
                block = None;
                continue;
            }
            handle_entry(&mut file, kind, &tokens, comment).map_err(fail)?;
            continue;
        }

        let (keyword, opens_block) = match tokens[0].1.strip_suffix('(') {
            Some(keyword) => (keyword, true),
            None => (tokens[0].1, tokens.len() == 2 && tokens[1].1 == "("),
        };

        if !DIRECTIVES.contains(&keyword) {
            return Err(fail(format!("unknown directive: {}", keyword)));
        }

        let kind = match keyword {
            "require" => Block::Require,
            "replace" => Block::Replace,
            _ => Block::Other,
        };

        if opens_block {
            block = Some(kind);
            continue;
        }

        if keyword == "module" {
            let module = tokens
                .get(1)
                .ok_or_else(|| fail("module directive without a path".to_string()))?;
            file.module = Some(module.1.trim_matches('"').to_string());
            continue;
        }

        handle_entry(&mut file, kind, &tokens[1..], comment).map_err(fail)?;
    }

    if block.is_some() {
        return Err(EngineError::not_parseable(path, "unterminated block at end of file"));
    }

    Ok(file)
}

fn handle_entry(
    file: &mut GoModFile,
    kind: Block,
    tokens: &[(Range<usize>, &str)],
    comment: &str,
) -> Result<(), String> {
    match kind {
        Block::Require => {
            let [(_, module), (span, version)] = tokens else {
                return Err("require entry must be '<module> <version>'".to_string());
            };
            let parsed = GoVersion::parse(version)
                .ok()
                .filter(|_| version.starts_with('v'))
                .ok_or_else(|| format!("{}: invalid version {}", module, version))?;
            check_major_version(module, &parsed)?;

            file.requires.push(RequireEntry {
                module: module.to_string(),
                version: version.to_string(),
                span: span.clone(),
                indirect: is_indirect(comment),
            });
        }
        Block::Replace => {
            let arrow = tokens
                .iter()
                .position(|(_, t)| *t == "=>")
                .ok_or_else(|| "replace entry without '=>'".to_string())?;
            let (left, right) = (&tokens[..arrow], &tokens[arrow + 1..]);
            if left.is_empty() || left.len() > 2 || right.is_empty() || right.len() > 2 {
                return Err("replace entry must be '<module> [version] => <target> [version]'".to_string());
            }
            file.replaces.push(ReplaceEntry {
                module: left[0].1.to_string(),
                version: left.get(1).map(|(_, v)| v.to_string()),
                target: right[0].1.to_string(),
                target_span: right[0].0.clone(),
            });
        }
        Block::Other => {}
    }
    Ok(())
}

fn is_indirect(comment: &str) -> bool {
    comment
        .trim()
        .split(';')
        .next()
        .is_some_and(|first| first.trim() == "indirect")
}

/// Applies the major-version path rule
///
/// A module at major version 2 or above must carry a matching `/vN` suffix
/// (`.vN` for gopkg.in), unless the version is marked `+incompatible`.
fn check_major_version(module: &str, version: &GoVersion) -> Result<(), String> {
    let major = version.major();

    if let Some(caps) = GOPKG_MAJOR_RE.captures(module) {
        let suffix: u64 = caps[1].parse().unwrap_or(0);
        if suffix != major && !(suffix <= 1 && major <= 1) {
            return Err(format!(
                "{} {}: invalid version: should be v{}, not v{}",
                module, version, suffix, major
            ));
        }
        return Ok(());
    }

    match PATH_MAJOR_RE.captures(module) {
        Some(caps) => {
            let suffix: u64 = caps[1].parse().unwrap_or(0);
            if suffix != major {
                return Err(format!(
                    "{} {}: invalid version: should be v{}, not v{}",
                    module, version, suffix, major
                ));
            }
        }
        None if major >= 2 && !version.is_incompatible() => {
            return Err(format!(
                "{} {}: invalid version: should be v0 or v1, not v{}",
                module, version, major
            ));
        }
        None => {}
    }
    Ok(())
}

/// Parser for go.mod files
pub struct GoModParser;

impl GoModParser {
    fn parse_file(
        &self,
        file: &DependencyFile,
        dependencies: &mut Vec<Dependency>,
    ) -> Result<(), EngineError> {
        let go_mod = scan(file.name(), file.content())?;
        let scheme = version_scheme(Ecosystem::GoModules);

        for entry in &go_mod.requires {
            let mut requirement = Requirement::new(Some(entry.version.clone()), file.name());
            if entry.indirect {
                requirement = requirement.with_group("indirect");
            }

            if let Some(replace) = go_mod
                .replaces
                .iter()
                .find(|r| r.applies_to(&entry.module, &entry.version))
            {
                let source = if replace.is_local() {
                    Source::Path {
                        path: replace.target.clone(),
                    }
                } else {
                    Source::Default {
                        registry: replace.target.clone(),
                    }
                };
                requirement = requirement.with_source(source);
            }

            let dependency = Dependency::new(
                entry.module.clone(),
                Some(scheme.normalize(&entry.version)),
                vec![requirement],
                Ecosystem::GoModules,
                !entry.indirect,
            )?;
            merge_dependency(dependencies, dependency)?;
        }

        debug!(
            file = file.name(),
            requires = go_mod.requires.len(),
            replaces = go_mod.replaces.len(),
            "parsed go.mod"
        );
        Ok(())
    }
}

#[async_trait]
impl FileParser for GoModParser {
    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::GoModules
    }

    async fn parse(&self, files: &[DependencyFile]) -> Result<Vec<Dependency>, EngineError> {
        let manifests: Vec<&DependencyFile> = files
            .iter()
            .filter(|f| f.file_name() == "go.mod" && !f.is_support_file())
            .collect();

        if manifests.is_empty() {
            return Err(EngineError::file_not_found("go.mod"));
        }

        let mut dependencies = Vec::new();
        for file in manifests {
            self.parse_file(file, &mut dependencies)?;
        }
        Ok(dependencies)
    }
}

/// Rewrites require lines in go.mod files
pub struct GoModUpdater;

impl FileUpdater for GoModUpdater {
    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::GoModules
    }

    fn apply(
        &self,
        files: &[DependencyFile],
        dependencies: &[Dependency],
    ) -> Result<Vec<DependencyFile>, EngineError> {
        let mut updated: Vec<DependencyFile> = files.to_vec();

        for dependency in dependencies {
            for (new, old) in dependency.changed_requirements() {
                let (Some(new_version), Some(old_version)) = (&new.constraint, &old.constraint)
                else {
                    continue;
                };

                let file = updated
                    .iter_mut()
                    .find(|f| f.name() == new.file)
                    .ok_or_else(|| EngineError::file_not_found(new.file.clone()))?;

                let go_mod = scan(file.name(), file.content())?;
                let entry = go_mod
                    .requires
                    .iter()
                    .find(|e| e.module == dependency.name() && &e.version == old_version)
                    .ok_or_else(|| EngineError::UnexpectedContentUnchanged {
                        path: file.name().to_string(),
                        dependency: dependency.name().to_string(),
                    })?;

                let content = replace_span(file.content(), entry.span.clone(), new_version);
                if content == file.content() {
                    return Err(EngineError::UnexpectedContentUnchanged {
                        path: file.name().to_string(),
                        dependency: dependency.name().to_string(),
                    });
                }

                debug!(
                    file = file.name(),
                    dependency = dependency.name(),
                    from = old_version.as_str(),
                    to = new_version.as_str(),
                    "rewrote require"
                );
                *file = file.with_content(content);
            }
        }

        Ok(updated)
    }
}
