//! mirror
//!
//! Local working copy of the site repository.
//!
//! The mirror is optional. When configured, uploads and album creation also
//! write into it so a later `gal sync` commits them alongside any local
//! edits. All paths are store paths relative to the mirror root; anything
//! that would escape the root is rejected.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;
use tracing::debug;

/// Errors from local mirror operations.
#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("path escapes the mirror root: {0}")]
    UnsafePath(String),

    #[error("failed to {action} {path}: {source}")]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// A local checkout of the site repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalMirror {
    root: PathBuf,
}

impl LocalMirror {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a relative store path under the root.
    pub fn resolve(&self, relative: &str) -> Result<PathBuf, MirrorError> {
        let trimmed = relative.trim_start_matches('/');
        let candidate = Path::new(trimmed);
        if trimmed.is_empty()
            || candidate
                .components()
                .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(MirrorError::UnsafePath(relative.to_string()));
        }
        Ok(self.root.join(candidate))
    }

    /// Create a directory and its parents. Existing directories are fine.
    pub fn ensure_dir(&self, relative: &str) -> Result<PathBuf, MirrorError> {
        let path = self.resolve(relative)?;
        fs::create_dir_all(&path).map_err(|source| MirrorError::Io {
            action: "create directory",
            path: path.clone(),
            source,
        })?;
        debug!(path = %path.display(), "mirror directory ready");
        Ok(path)
    }

    /// Write a file, creating parent directories.
    pub fn write_file(&self, relative: &str, content: &[u8]) -> Result<PathBuf, MirrorError> {
        let path = self.resolve(relative)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| MirrorError::Io {
                action: "create directory",
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(&path, content).map_err(|source| MirrorError::Io {
            action: "write",
            path: path.clone(),
            source,
        })?;
        debug!(path = %path.display(), bytes = content.len(), "wrote mirror file");
        Ok(path)
    }

    /// Delete a file. Returns `Ok(false)` when it was already absent.
    pub fn delete_if_exists(&self, relative: &str) -> Result<bool, MirrorError> {
        let path = self.resolve(relative)?;
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(path = %path.display(), "removed mirror file");
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(MirrorError::Io {
                action: "remove",
                path,
                source,
            }),
        }
    }

    pub fn read_file(&self, relative: &str) -> Result<Vec<u8>, MirrorError> {
        let path = self.resolve(relative)?;
        fs::read(&path).map_err(|source| MirrorError::Io {
            action: "read",
            path,
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn mirror() -> (TempDir, LocalMirror) {
        let dir = TempDir::new().unwrap();
        let mirror = LocalMirror::new(dir.path());
        (dir, mirror)
    }

    #[test]
    fn write_creates_parents() {
        let (dir, mirror) = mirror();
        mirror
            .write_file("images/albums/beach/thumbs/a.jpg", b"thumb")
            .unwrap();
        assert_eq!(
            fs::read(dir.path().join("images/albums/beach/thumbs/a.jpg")).unwrap(),
            b"thumb"
        );
        assert_eq!(
            mirror.read_file("images/albums/beach/thumbs/a.jpg").unwrap(),
            b"thumb"
        );
    }

    #[test]
    fn ensure_dir_is_idempotent() {
        let (dir, mirror) = mirror();
        mirror.ensure_dir("images/albums/beach").unwrap();
        mirror.ensure_dir("images/albums/beach").unwrap();
        assert!(dir.path().join("images/albums/beach").is_dir());
    }

    #[test]
    fn delete_missing_is_false() {
        let (_dir, mirror) = mirror();
        assert!(!mirror.delete_if_exists("images/nothing.jpg").unwrap());

        mirror.write_file("images/a.jpg", b"x").unwrap();
        assert!(mirror.delete_if_exists("images/a.jpg").unwrap());
        assert!(!mirror.delete_if_exists("images/a.jpg").unwrap());
    }

    #[test]
    fn leading_slash_is_relative() {
        let (dir, mirror) = mirror();
        let path = mirror.resolve("/images/a.jpg").unwrap();
        assert_eq!(path, dir.path().join("images/a.jpg"));
    }

    #[test]
    fn rejects_escaping_paths() {
        let (_dir, mirror) = mirror();
        for bad in ["../outside.jpg", "images/../../x", "", "./a.jpg"] {
            assert!(
                matches!(mirror.resolve(bad), Err(MirrorError::UnsafePath(_))),
                "accepted {bad:?}"
            );
        }
    }
}
