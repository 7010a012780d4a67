//! Temporary staging area and live-tree file operations.

use crate::error::InstallError;
use crate::kit::KitFile;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, warn};

const STAGING_PREFIX: &str = "multikit-";

/// Exclusively owned temporary directory. Removed when dropped.
#[derive(Debug)]
pub struct StagingArea {
    dir: TempDir,
}

impl StagingArea {
    pub fn new() -> Result<Self, InstallError> {
        let dir = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempdir()
            .map_err(|source| InstallError::Staging {
                path: std::env::temp_dir().display().to_string(),
                source,
            })?;
        debug!(path = %dir.path().display(), "Created staging area");
        Ok(Self { dir })
    }

    #[cfg(test)]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn staged_path(&self, file: &KitFile) -> PathBuf {
        self.dir.path().join(file.subdir.as_str()).join(&file.filename)
    }

    /// Write `content` at `<staging>/<subdir>/<filename>`.
    pub fn stage_file(&self, file: &KitFile, content: &[u8]) -> Result<PathBuf, InstallError> {
        let dest = self.staged_path(file);
        let staging_err = |source| InstallError::Staging {
            path: file.relative_path(),
            source,
        };
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent).map_err(staging_err)?;
        }
        std::fs::write(&dest, content).map_err(staging_err)?;
        Ok(dest)
    }

    pub fn read_staged(&self, file: &KitFile) -> Result<Vec<u8>, InstallError> {
        std::fs::read(self.staged_path(file)).map_err(|source| InstallError::Staging {
            path: file.relative_path(),
            source,
        })
    }

    /// Move staged files into `target_dir`, creating parents as needed.
    ///
    /// Files absent from staging are skipped. Returns the relative paths moved.
    pub fn move_staged_files(
        &self,
        target_dir: &Path,
        files: &[KitFile],
    ) -> Result<Vec<String>, InstallError> {
        let mut installed = Vec::with_capacity(files.len());
        for file in files {
            let src = self.staged_path(file);
            if !src.exists() {
                warn!(file = %file, "Staged file missing, not committed");
                continue;
            }
            let dst = target_dir.join(file.subdir.as_str()).join(&file.filename);
            let commit_err = |source| InstallError::Commit {
                path: file.relative_path(),
                source,
            };
            if let Some(parent) = dst.parent() {
                std::fs::create_dir_all(parent).map_err(commit_err)?;
            }
            move_file(&src, &dst).map_err(commit_err)?;
            debug!(file = %file, dest = %dst.display(), "Committed file");
            installed.push(file.relative_path());
        }
        Ok(installed)
    }
}

/// Rename, falling back to copy + remove when the rename crosses filesystems.
fn move_file(src: &Path, dst: &Path) -> std::io::Result<()> {
    match std::fs::rename(src, dst) {
        Ok(()) => Ok(()),
        Err(_) => {
            std::fs::copy(src, dst)?;
            std::fs::remove_file(src)
        }
    }
}

/// Read a live file, `None` when it does not exist.
pub fn read_local(path: &Path) -> std::io::Result<Option<Vec<u8>>> {
    match std::fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

/// Delete tracked files under `github_dir`. Returns how many existed and were removed.
pub fn delete_kit_files(github_dir: &Path, file_paths: &[String]) -> std::io::Result<usize> {
    let mut deleted = 0;
    for rel_path in file_paths {
        let relative = Path::new(rel_path);
        if !relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
        {
            warn!(path = %rel_path, "Refusing to delete path outside kit directories");
            continue;
        }
        let target = github_dir.join(relative);
        match std::fs::remove_file(&target) {
            Ok(()) => {
                debug!(path = %target.display(), "Deleted kit file");
                deleted += 1;
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %target.display(), "Kit file already absent");
            }
            Err(e) => return Err(e),
        }
    }
    Ok(deleted)
}
