//! Temporary resolver workspaces
//!
//! A workspace is a fresh temporary directory holding copies of the
//! dependency files. It is removed when dropped, on every exit path.

use crate::domain::DependencyFile;
use crate::error::EngineError;
use std::fs;
use std::path::{Component, Path, PathBuf};
use tempfile::TempDir;
use tracing::debug;

pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    /// Create a workspace containing `files`
    ///
    /// File names must be relative paths that stay inside the workspace.
    pub fn create(files: &[DependencyFile]) -> Result<Self, EngineError> {
        let dir = tempfile::Builder::new()
            .prefix("depshift-")
            .tempdir()
            .map_err(|e| EngineError::io(std::env::temp_dir(), e))?;
        let workspace = Self { dir };

        for file in files {
            let path = workspace.file_path(file.name())?;
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).map_err(|e| EngineError::io(parent, e))?;
            }
            fs::write(&path, file.content()).map_err(|e| EngineError::io(&path, e))?;
        }

        debug!(path = %workspace.path().display(), files = files.len(), "created workspace");
        Ok(workspace)
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Absolute path of `name` inside the workspace
    pub fn file_path(&self, name: &str) -> Result<PathBuf, EngineError> {
        let relative = Path::new(name);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            return Err(EngineError::not_parseable(
                name,
                "file name must be a relative path inside the project",
            ));
        }
        Ok(self.dir.path().join(relative))
    }

    /// Overwrite `name` inside the workspace
    pub fn write(&self, name: &str, content: &str) -> Result<(), EngineError> {
        let path = self.file_path(name)?;
        fs::write(&path, content).map_err(|e| EngineError::io(&path, e))
    }

    /// Read `name` back, `None` if the tool did not create it
    pub fn read(&self, name: &str) -> Result<Option<String>, EngineError> {
        let path = self.file_path(name)?;
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(EngineError::io(&path, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_read() {
        let files = vec![
            DependencyFile::new("go.mod", "module m\n"),
            DependencyFile::new("tools/go.mod", "module m/tools\n"),
        ];
        let workspace = Workspace::create(&files).unwrap();

        assert_eq!(workspace.read("go.mod").unwrap().as_deref(), Some("module m\n"));
        assert_eq!(
            workspace.read("tools/go.mod").unwrap().as_deref(),
            Some("module m/tools\n")
        );
        assert_eq!(workspace.read("go.sum").unwrap(), None);

        workspace.write("go.mod", "module n\n").unwrap();
        assert_eq!(workspace.read("go.mod").unwrap().as_deref(), Some("module n\n"));
    }

    #[test]
    fn test_removed_on_drop() {
        let workspace = Workspace::create(&[DependencyFile::new("pom.xml", "<project/>")]).unwrap();
        let path = workspace.path().to_path_buf();
        assert!(path.exists());
        drop(workspace);
        assert!(!path.exists());
    }

    #[test]
    fn test_rejects_escaping_names() {
        let result = Workspace::create(&[DependencyFile::new("../go.mod", "module m\n")]);
        assert!(matches!(
            result,
            Err(EngineError::DependencyFileNotParseable { .. })
        ));
    }
}
