//! git
//!
//! Single interface for inspecting the local mirror repository.
//!
//! # Architecture
//!
//! This module is the only place that imports `git2`. It answers
//! questions about the mirror (what is dirty, what is conflicted, what a
//! remote branch contains) and never mutates it. Mutations go through the
//! git CLI in `sync::git_tool`.
//!
//! # Example
//!
//! ```ignore
//! use gallerist::git::Git;
//! use std::path::Path;
//!
//! let git = Git::open(Path::new("."))?;
//! let remote_files = git.tree_files("origin/gh-pages")?;
//! let conflicts = git.conflicted_paths()?;
//! ```

mod interface;

pub use interface::{Git, GitError, WorktreeStatus};
