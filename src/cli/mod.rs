//! cli
//!
//! Command-line interface layer for gallerist.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Initialize logging
//! - Delegate to command handlers
//!
//! # Architecture
//!
//! The CLI layer is thin. It parses arguments via clap and dispatches to
//! [`commands`], which build a [`crate::gallery::Curator`] from configuration
//! and report its outcomes.

pub mod args;
pub mod commands;

pub use args::{Cli, Shell};

use anyhow::Result;

use crate::ui::output::Verbosity;

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();

    // A missing .env is fine.
    let _ = dotenvy::dotenv();

    let verbosity = Verbosity::from_flags(cli.quiet, cli.debug);
    init_tracing(verbosity);

    let ctx = commands::Context {
        config_path: cli.config.clone(),
        verbosity,
    };

    commands::dispatch(cli.command, &ctx)
}

fn init_tracing(verbosity: Verbosity) {
    let _ = tracing_subscriber::fmt()
        .with_max_level(verbosity.log_level())
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
