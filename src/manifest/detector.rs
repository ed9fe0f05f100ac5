//! Dependency file discovery
//!
//! Features:
//! - Detects which ecosystems a directory uses (go.mod, pom.xml)
//! - Loads every manifest and lockfile below the directory as `DependencyFile`s
//! - Skips VCS, build output and vendored directories

use crate::domain::{DependencyFile, Ecosystem};
use crate::error::EngineError;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Directories never searched for dependency files
const SKIPPED_DIRS: [&str; 5] = ["target", "vendor", "node_modules", "testdata", "build"];

/// Detect the ecosystems whose manifest sits at the root of `dir`
pub fn detect_ecosystems(dir: &Path) -> Vec<Ecosystem> {
    Ecosystem::all()
        .iter()
        .copied()
        .filter(|ecosystem| dir.join(ecosystem.manifest_filename()).exists())
        .collect()
}

/// Load the dependency files of `ecosystem` found below `dir`
///
/// Names are relative to `dir` with `/` separators, root files first, then
/// subdirectories in lexical order.
pub fn load_dependency_files(
    dir: &Path,
    ecosystem: Ecosystem,
) -> Result<Vec<DependencyFile>, EngineError> {
    let mut wanted = vec![ecosystem.manifest_filename()];
    wanted.extend(ecosystem.lockfile_name());

    let mut files = Vec::new();
    collect(dir, "", &wanted, &mut files)?;

    let directory = dir.display().to_string();
    debug!(
        directory = %directory,
        ecosystem = %ecosystem,
        count = files.len(),
        "loaded dependency files"
    );
    Ok(files
        .into_iter()
        .map(|file| file.with_directory(directory.clone()))
        .collect())
}

fn collect(
    dir: &Path,
    prefix: &str,
    wanted: &[&str],
    files: &mut Vec<DependencyFile>,
) -> Result<(), EngineError> {
    let entries = fs::read_dir(dir).map_err(|e| EngineError::io(dir, e))?;
    let mut entries: Vec<_> = entries.flatten().collect();
    entries.sort_by_key(|entry| entry.file_name());

    let mut subdirs = Vec::new();
    for entry in entries {
        let path = entry.path();
        let Some(name) = entry.file_name().to_str().map(String::from) else {
            continue;
        };

        if path.is_dir() {
            if !name.starts_with('.') && !SKIPPED_DIRS.contains(&name.as_str()) {
                subdirs.push((path, name));
            }
            continue;
        }

        if wanted.contains(&name.as_str()) {
            let content = fs::read_to_string(&path).map_err(|e| EngineError::io(&path, e))?;
            files.push(DependencyFile::new(format!("{}{}", prefix, name), content));
        }
    }

    for (path, name) in subdirs {
        collect(&path, &format!("{}{}/", prefix, name), wanted, files)?;
    }
    Ok(())
}
