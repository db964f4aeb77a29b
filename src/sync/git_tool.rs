//! sync::git_tool
//!
//! [`SyncTool`] backed by the `git` CLI for mutations and git2 for inspection.

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use super::{CommandOutput, SyncError, SyncTool};
use crate::git::{Git, GitError};

/// Git working copy of the site repository.
#[derive(Debug, Clone)]
pub struct GitSyncTool {
    workdir: PathBuf,
}

impl GitSyncTool {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
        }
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// Open the repository fresh; state changes between pipeline steps.
    fn git(&self) -> Result<Git, SyncError> {
        Git::open(&self.workdir).map_err(inspect_error)
    }
}

fn inspect_error(err: GitError) -> SyncError {
    SyncError::Inspect(err.to_string())
}

impl SyncTool for GitSyncTool {
    fn run(&self, args: &[&str]) -> Result<CommandOutput, SyncError> {
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.workdir)
            .output()
            .map_err(|e| SyncError::Spawn {
                command: args.join(" "),
                message: e.to_string(),
            })?;

        Ok(CommandOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    fn has_tracked_changes(&self) -> Result<bool, SyncError> {
        let status = self.git()?.worktree_status(false).map_err(inspect_error)?;
        Ok(status.has_tracked_changes())
    }

    fn untracked_files(&self) -> Result<Vec<String>, SyncError> {
        self.git()?.untracked_files().map_err(inspect_error)
    }

    fn remote_tree_files(&self, remote_ref: &str) -> Result<BTreeSet<String>, SyncError> {
        self.git()?.tree_files(remote_ref).map_err(inspect_error)
    }

    fn conflicted_paths(&self) -> Result<Vec<String>, SyncError> {
        self.git()?.conflicted_paths().map_err(inspect_error)
    }

    fn is_clean(&self) -> Result<bool, SyncError> {
        let status = self.git()?.worktree_status(true).map_err(inspect_error)?;
        Ok(status.is_pristine())
    }

    fn remove_file(&self, path: &str) -> Result<(), SyncError> {
        match fs::remove_file(self.workdir.join(path)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SyncError::Inspect(format!("failed to remove {}: {}", path, e))),
        }
    }
}
