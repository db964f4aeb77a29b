//! gallerist - administration core for a GitHub-hosted photo gallery
//!
//! The site is a static gallery whose content (images and one YAML
//! front-matter index document per gallery) lives on a branch of a GitHub
//! repository. gallerist keeps those documents consistent with the files
//! an operator uploads and deletes, provisions new albums, and keeps an
//! optional local git working copy in step with the remote branch.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface (`gal`)
//! - [`gallery`] - Index reconciliation, album provisioning, operator service
//! - [`core`] - Domain types, front-matter documents, paths, configuration
//! - [`store`] - Versioned content store abstraction (GitHub Contents API)
//! - [`mirror`] - Local working-copy filesystem access
//! - [`sync`] - Local mirror synchronization with the remote branch
//! - [`git`] - Read-only repository inspection
//! - [`thumbnail`] - Thumbnail generation
//! - [`session`] - Operator identity and the mutation gate
//! - [`ui`] - User-facing output
//!
//! # Consistency
//!
//! Every index write is guarded by the revision read just before it. A
//! concurrent writer turns the late write into a conflict instead of a
//! silent overwrite.

pub mod cli;
pub mod core;
pub mod gallery;
pub mod git;
pub mod mirror;
pub mod session;
pub mod store;
pub mod sync;
pub mod thumbnail;
pub mod ui;
