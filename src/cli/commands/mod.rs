//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Loads configuration and builds what it needs (store, curator, session)
//! 2. Calls into the library
//! 3. Formats and displays output
//!
//! # Async Commands
//!
//! Store-backed commands are async because they involve network I/O. Each
//! handler creates a `tokio::runtime::Runtime` and blocks on its async half.
//!
//! # Outcomes
//!
//! Mutations report an [`Outcome`]. Warnings are printed either way; a failed
//! outcome becomes the command's error so the process exits non-zero.

mod album;
mod browse;
mod completion;
mod config_cmd;
mod delete;
mod fix_paths;
mod header;
mod slider;
mod sync;
mod upload;

pub use album::create_album;
pub use browse::{galleries, images};
pub use completion::completion;
pub use config_cmd::{init as config_init, show as config_show};
pub use delete::delete;
pub use fix_paths::fix_paths;
pub use header::{show as header_show, set as header_set};
pub use slider::{list as slider_list, update as slider_update};
pub use sync::sync;
pub use upload::upload;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context as _, Result};
use tracing::debug;

use crate::cli::args::{AlbumAction, Command, ConfigAction, HeaderAction, SliderAction};
use crate::core::config::Config;
use crate::gallery::{Curator, GalleryIndexReconciler, Outcome};
use crate::git::Git;
use crate::mirror::LocalMirror;
use crate::session::{OperatorContext, SessionLookup, TokenSession};
use crate::store::GitHubStore;
use crate::ui::output::{self, Verbosity};

/// Per-invocation settings from global flags.
#[derive(Debug, Clone)]
pub struct Context {
    pub config_path: Option<PathBuf>,
    pub verbosity: Verbosity,
}

impl Context {
    /// Load the effective configuration.
    pub fn load_config(&self) -> Result<Config> {
        let result = Config::load(self.config_path.as_deref()).context("Failed to load config")?;
        for name in &result.overrides {
            debug!(variable = %name, "config overridden from environment");
        }
        Ok(result.config)
    }
}

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Galleries => galleries(ctx),
        Command::Images { gallery } => images(ctx, &gallery),
        Command::Upload {
            gallery,
            file,
            caption,
            copyright,
            name,
        } => upload(
            ctx,
            &gallery,
            &file,
            caption.as_deref(),
            copyright.as_deref(),
            name.as_deref(),
        ),
        Command::Delete { gallery, filename } => delete(ctx, &gallery, &filename),
        Command::Header { action } => match action {
            HeaderAction::Show { gallery } => header_show(ctx, &gallery),
            HeaderAction::Set { gallery, path } => header_set(ctx, &gallery, &path),
        },
        Command::Slider { action } => match action {
            SliderAction::List => slider_list(ctx),
            SliderAction::Update {
                old_path,
                new_path,
                gallery,
            } => slider_update(ctx, &old_path, &new_path, &gallery),
        },
        Command::Album { action } => match action {
            AlbumAction::Create { name, description } => {
                create_album(ctx, &name, description.as_deref())
            }
        },
        Command::Sync => sync(ctx),
        Command::FixPaths { gallery } => fix_paths(ctx, &gallery),
        Command::Config { action } => match action {
            ConfigAction::Show => config_show(ctx),
            ConfigAction::Init { force } => config_init(ctx, force),
        },
        Command::Completion { shell } => completion(shell),
    }
}

/// Everything a store-backed command needs.
pub(crate) struct Workspace {
    pub curator: Curator,
    pub operator: OperatorContext,
}

/// Build the curator and operator session from configuration.
pub(crate) fn open_workspace(ctx: &Context) -> Result<Workspace> {
    let mut config = ctx.load_config()?;
    let mirror = config.mirror_path();

    if let Some(path) = &mirror {
        if let Some(url) = origin_url(path, config.mirror_remote()) {
            if config.infer_repository(&url) {
                debug!(remote = %url, "repository inferred from mirror remote");
            }
        }
    }

    let (Some(owner), Some(name)) = (config.owner(), config.repo_name()) else {
        bail!(
            "Repository not configured. Set [repository] owner and name in the config \
             file, or GALLERIST_REPO=owner/name."
        );
    };

    let session = TokenSession::from_env(config.token_env());
    let mut store = GitHubStore::new(owner, name, config.branch()).with_api_base(config.api_url());
    if let Some(token) = session.token() {
        store = store.with_token(token);
    }
    debug!(?store, "opened content store");

    let mut reconciler =
        GalleryIndexReconciler::new(Arc::new(store), config.layout(), config.default_copyright());
    if let Some(path) = mirror {
        reconciler = reconciler.with_mirror(LocalMirror::new(path));
    }

    Ok(Workspace {
        curator: Curator::new(reconciler).with_thumbnail_size(config.thumbnail_size()),
        operator: session.lookup(),
    })
}

fn origin_url(path: &std::path::Path, remote: &str) -> Option<String> {
    Git::open(path).ok()?.remote_url(remote).ok()?
}

/// Run an async command body on a fresh runtime.
pub(crate) fn block_on<F: std::future::Future<Output = Result<()>>>(future: F) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(future)
}

/// Print an outcome; a failed outcome becomes an error.
pub(crate) fn report(outcome: Outcome, verbosity: Verbosity) -> Result<()> {
    for warning in &outcome.warnings {
        output::warn(warning, verbosity);
    }
    if outcome.success {
        output::success(&outcome.message, verbosity);
        Ok(())
    } else {
        bail!("{}", outcome.message)
    }
}
