//! sync
//!
//! Reconcile the local mirror with its remote branch.
//!
//! # Pipeline
//!
//! [`LocalMirrorSync::sync`] runs these steps in order, stopping at the
//! first failing command:
//!
//! 1. Stash tracked edits, if any
//! 2. Fetch the remote branch
//! 3. Delete untracked files the remote also has, so the pull can land
//! 4. Pull with a merge (never a rebase)
//! 5. Restore the stash; on conflicts keep the local side of every path
//! 6. Stage everything
//! 7. Commit with a timestamped message and push, unless nothing changed
//!
//! # Conflict Policy
//!
//! Local wins. While a stash is being applied, git calls the stashed
//! changes "theirs", so conflicts are resolved with `checkout --theirs`.
//! A path the local side deleted is removed instead.
//!
//! There is no rollback: a failure leaves the mirror where the failing
//! command left it, and the error carries that command's stderr.

pub mod git_tool;

use std::collections::BTreeSet;

use chrono::{DateTime, Local};
use thiserror::Error;
use tracing::{debug, info, warn};

pub use git_tool::GitSyncTool;

/// Stash message used for local edits during sync.
pub const STASH_MESSAGE: &str = "Temporary stash before sync";

/// Errors from mirror synchronization.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The sync tool could not be started.
    #[error("failed to run git {command}: {message}")]
    Spawn { command: String, message: String },

    /// A command exited non-zero.
    #[error("git {command} failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    /// Inspecting the repository failed.
    #[error("failed to inspect mirror: {0}")]
    Inspect(String),
}

/// Captured result of one tool invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn ok() -> Self {
        Self {
            success: true,
            ..Default::default()
        }
    }

    pub fn failed(stderr: impl Into<String>) -> Self {
        Self {
            success: false,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }
}

/// External version-control tool bound to one working directory.
pub trait SyncTool {
    /// Run a subcommand. A non-zero exit is reported in the output, not as `Err`.
    fn run(&self, args: &[&str]) -> Result<CommandOutput, SyncError>;

    /// Whether tracked files have staged or unstaged edits.
    fn has_tracked_changes(&self) -> Result<bool, SyncError>;

    /// Untracked, non-ignored files, relative to the working directory.
    fn untracked_files(&self) -> Result<Vec<String>, SyncError>;

    /// Every file in the tree of `remote_ref` (e.g. `origin/main`).
    fn remote_tree_files(&self, remote_ref: &str) -> Result<BTreeSet<String>, SyncError>;

    /// Paths with unresolved conflicts.
    fn conflicted_paths(&self) -> Result<Vec<String>, SyncError>;

    /// No changes of any kind, untracked files included.
    fn is_clean(&self) -> Result<bool, SyncError>;

    /// Delete a working-tree file. Missing files are not an error.
    fn remove_file(&self, path: &str) -> Result<(), SyncError>;
}

/// What a sync run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Local edits were stashed and restored.
    pub stashed: bool,
    /// Untracked files deleted because the remote had them.
    pub removed_untracked: Vec<String>,
    /// Conflicted paths resolved in favour of the local side.
    pub resolved_conflicts: Vec<String>,
    /// Commit message, when something was committed and pushed.
    pub commit: Option<String>,
}

impl SyncReport {
    /// Human-readable one-line summary.
    pub fn summary(&self) -> String {
        match &self.commit {
            Some(_) => "Synchronized and pushed local changes".to_string(),
            None => "Already up to date; nothing to commit".to_string(),
        }
    }
}

/// Sync pipeline over a [`SyncTool`].
#[derive(Debug)]
pub struct LocalMirrorSync<T> {
    tool: T,
    remote: String,
    branch: String,
}

impl<T: SyncTool> LocalMirrorSync<T> {
    pub fn new(tool: T, remote: impl Into<String>, branch: impl Into<String>) -> Self {
        Self {
            tool,
            remote: remote.into(),
            branch: branch.into(),
        }
    }

    pub fn tool(&self) -> &T {
        &self.tool
    }

    /// Run the full pipeline.
    pub fn sync(&self) -> Result<SyncReport, SyncError> {
        let mut report = SyncReport::default();
        let remote_ref = format!("{}/{}", self.remote, self.branch);

        if self.tool.has_tracked_changes()? {
            info!("stashing local changes");
            self.step(&["stash", "push", "-m", STASH_MESSAGE])?;
            report.stashed = true;
        }

        self.step(&["fetch", &self.remote, &self.branch])?;

        let remote_files = self.tool.remote_tree_files(&remote_ref)?;
        for path in self.tool.untracked_files()? {
            if remote_files.contains(&path) {
                debug!(path = %path, "removing untracked file shadowed by remote");
                self.tool.remove_file(&path)?;
                report.removed_untracked.push(path);
            }
        }

        self.step(&["pull", "--no-rebase", "--no-edit", &self.remote, &self.branch])?;

        if report.stashed {
            report.resolved_conflicts = self.restore_stash()?;
        }

        self.step(&["add", "-A"])?;

        if self.tool.is_clean()? {
            info!("mirror is up to date");
            return Ok(report);
        }

        let message = commit_message(Local::now());
        self.step(&["commit", "-m", &message])?;
        self.step(&["push", &self.remote, &self.branch])?;
        info!(remote = %remote_ref, "pushed local changes");
        report.commit = Some(message);

        Ok(report)
    }

    /// Pop the sync stash, keeping local versions of conflicted paths.
    fn restore_stash(&self) -> Result<Vec<String>, SyncError> {
        let pop = self.tool.run(&["stash", "pop"])?;
        if pop.success {
            return Ok(Vec::new());
        }

        let conflicted = self.tool.conflicted_paths()?;
        if conflicted.is_empty() {
            return Err(SyncError::CommandFailed {
                command: "stash pop".to_string(),
                stderr: pop.stderr,
            });
        }

        warn!(count = conflicted.len(), "stash conflicts; keeping local versions");
        for path in &conflicted {
            let kept = self.tool.run(&["checkout", "--theirs", "--", path])?;
            if !kept.success {
                // Local side deleted it.
                self.step(&["rm", "--quiet", "--", path])?;
            }
        }
        self.step(&["add", "-A"])?;
        self.step(&["stash", "drop"])?;

        Ok(conflicted)
    }

    /// Run a command that must succeed.
    fn step(&self, args: &[&str]) -> Result<CommandOutput, SyncError> {
        debug!(command = %args.join(" "), "git");
        let output = self.tool.run(args)?;
        if output.success {
            Ok(output)
        } else {
            Err(SyncError::CommandFailed {
                command: args.join(" "),
                stderr: output.stderr.trim().to_string(),
            })
        }
    }
}

/// Commit message for a sync at `now`.
pub fn commit_message(now: DateTime<Local>) -> String {
    format!("Updated gallery content - {}", now.format("%Y-%m-%d %H:%M:%S"))
}
