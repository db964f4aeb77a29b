//! cli::commands::sync
//!
//! Synchronize the local mirror with the remote branch.
//!
//! # Design
//!
//! The sync command:
//! - Stashes tracked local edits
//! - Fetches and pulls the configured branch
//! - Restores the edits, keeping the local side of any conflict
//! - Commits and pushes whatever changed
//!
//! It runs synchronously: every step is a local `git` invocation.
//!
//! # Example
//!
//! ```bash
//! # Mirror configured in the config file
//! gal sync
//!
//! # One-off mirror location
//! GALLERIST_MIRROR=~/src/gallery gal sync
//! ```

use anyhow::{bail, Context as _, Result};

use super::Context;
use crate::session::{SessionLookup, TokenSession};
use crate::sync::{GitSyncTool, LocalMirrorSync};
use crate::ui::output;

/// Run the sync command.
pub fn sync(ctx: &Context) -> Result<()> {
    let config = ctx.load_config()?;

    let Some(path) = config.mirror_path() else {
        bail!("No local mirror configured. Set [mirror] path or GALLERIST_MIRROR.");
    };
    if !path.is_dir() {
        bail!("Mirror path '{}' is not a directory", path.display());
    }

    let operator = TokenSession::from_env(config.token_env()).lookup();
    operator.require()?;

    let pipeline = LocalMirrorSync::new(
        GitSyncTool::new(&path),
        config.mirror_remote(),
        config.branch(),
    );
    let report = pipeline
        .sync()
        .with_context(|| format!("Sync of '{}' failed", path.display()))?;

    for path in &report.removed_untracked {
        output::print(format!("  removed untracked {}", path), ctx.verbosity);
    }
    for path in &report.resolved_conflicts {
        output::warn(format!("kept local version of {}", path), ctx.verbosity);
    }
    output::success(report.summary(), ctx.verbosity);
    Ok(())
}
