//! Writing updated dependency files back to disk
//!
//! This module provides:
//! - ManifestWriter for persisting changed `DependencyFile`s
//! - Dry-run mode support (no actual file modifications)
//! - Unchanged files are never rewritten

use crate::domain::DependencyFile;
use crate::error::EngineError;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Writer for dependency files
pub struct ManifestWriter {
    /// Whether to run in dry-run mode (no file modifications)
    dry_run: bool,
}

/// Result of writing one changed file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteResult {
    /// Path the file was (or would be) written to
    pub path: PathBuf,
    /// Whether the file was actually written
    pub file_modified: bool,
}

impl ManifestWriter {
    /// Create a new ManifestWriter
    pub fn new(dry_run: bool) -> Self {
        Self { dry_run }
    }

    /// Create a ManifestWriter in dry-run mode
    pub fn dry_run() -> Self {
        Self { dry_run: true }
    }

    /// Check if this writer is in dry-run mode
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Write every file of `updated` whose content differs from `original`
    ///
    /// Names are resolved relative to `root`.
    pub fn write_changes(
        &self,
        root: &Path,
        original: &[DependencyFile],
        updated: &[DependencyFile],
    ) -> Result<Vec<WriteResult>, EngineError> {
        let mut results = Vec::new();

        for file in updated {
            let unchanged = original
                .iter()
                .any(|o| o.name() == file.name() && o.content() == file.content());
            if unchanged {
                continue;
            }

            let path = root.join(file.name());
            if !self.dry_run {
                fs::write(&path, file.content()).map_err(|e| EngineError::io(&path, e))?;
                info!(path = %path.display(), "wrote updated file");
            }
            results.push(WriteResult {
                path,
                file_modified: !self.dry_run,
            });
        }

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const BEFORE: &str = "module m\n\nrequire rsc.io/quote v1.4.0\n";
    const AFTER: &str = "module m\n\nrequire rsc.io/quote v1.5.2\n";

    fn setup() -> (TempDir, Vec<DependencyFile>, Vec<DependencyFile>) {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("go.mod"), BEFORE).unwrap();
        fs::write(dir.path().join("go.sum"), "").unwrap();

        let original = vec![
            DependencyFile::new("go.mod", BEFORE),
            DependencyFile::new("go.sum", ""),
        ];
        let updated = vec![original[0].with_content(AFTER), original[1].clone()];
        (dir, original, updated)
    }

    #[test]
    fn test_manifest_writer_new() {
        assert!(!ManifestWriter::new(false).is_dry_run());
        assert!(ManifestWriter::new(true).is_dry_run());
        assert!(ManifestWriter::dry_run().is_dry_run());
    }

    #[test]
    fn test_write_changes() {
        let (dir, original, updated) = setup();

        let results = ManifestWriter::new(false)
            .write_changes(dir.path(), &original, &updated)
            .unwrap();

        assert_eq!(results.len(), 1);
        assert!(results[0].file_modified);
        assert_eq!(results[0].path, dir.path().join("go.mod"));
        assert_eq!(fs::read_to_string(dir.path().join("go.mod")).unwrap(), AFTER);
    }

    #[test]
    fn test_write_changes_dry_run() {
        let (dir, original, updated) = setup();

        let results = ManifestWriter::dry_run()
            .write_changes(dir.path(), &original, &updated)
            .unwrap();

        assert_eq!(results.len(), 1);
        assert!(!results[0].file_modified);
        assert_eq!(fs::read_to_string(dir.path().join("go.mod")).unwrap(), BEFORE);
    }

    #[test]
    fn test_write_nothing_when_unchanged() {
        let (dir, original, _) = setup();

        let results = ManifestWriter::new(false)
            .write_changes(dir.path(), &original, &original)
            .unwrap();
        assert!(results.is_empty());
    }
}
