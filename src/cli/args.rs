//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--config <path>`: Use this config file
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Minimal output

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// gal - curate a GitHub-hosted photo gallery
#[derive(Parser, Debug)]
#[command(name = "gal")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Use this config file instead of the default locations
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the galleries of the site
    Galleries,

    /// List the images of a gallery
    #[command(
        long_about = "List the image files of a gallery together with their index entries.\n\n\
            Files present in the album folder but missing from the gallery index are \
            flagged as unindexed."
    )]
    Images {
        /// Gallery name (e.g. "landscape")
        gallery: String,
    },

    /// Upload an image into a gallery
    #[command(
        long_about = "Upload an image into a gallery.\n\n\
            The image is stored under images/albums/<gallery>/, added to the gallery \
            index, and a thumbnail is written to the thumbs/ folder (or to the local \
            mirror, when one is configured). Re-uploading a file replaces it.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Upload with a caption; copyright falls back to the configured default
    gal upload beach ~/Pictures/dunes.jpg --caption \"Dunes at dusk\"

    # Store under a different file name
    gal upload street IMG_0042.JPG --name market.jpg --copyright \"Ann\""
    )]
    Upload {
        /// Gallery to upload into
        gallery: String,

        /// Image file on disk
        file: PathBuf,

        /// Caption (defaults to the file name)
        #[arg(long)]
        caption: Option<String>,

        /// Copyright holder; "© " is prepended
        #[arg(long)]
        copyright: Option<String>,

        /// File name to store the image under
        #[arg(long)]
        name: Option<String>,
    },

    /// Delete an image from a gallery
    #[command(
        long_about = "Remove an image from a gallery index and delete the image and its \
            thumbnail.\n\n\
            Deleting an image that is already gone succeeds with warnings."
    )]
    Delete {
        /// Gallery name
        gallery: String,

        /// File name of the image
        filename: String,
    },

    /// Show or set a gallery's header image
    Header {
        #[command(subcommand)]
        action: HeaderAction,
    },

    /// List or edit the homepage slider
    Slider {
        #[command(subcommand)]
        action: SliderAction,
    },

    /// Manage albums
    Album {
        #[command(subcommand)]
        action: AlbumAction,
    },

    /// Synchronize the local mirror with the remote branch
    #[command(
        long_about = "Synchronize the local mirror with the remote branch.\n\n\
            Local edits are stashed, the remote branch is pulled, and the edits are \
            re-applied. When both sides changed a file, the local version wins. The \
            result is committed and pushed.",
        after_help = "\
REQUIREMENTS:
    [mirror] path must point at a git working copy of the site repository."
    )]
    Sync,

    /// Rewrite legacy album folders in a gallery index
    #[command(
        name = "fix-paths",
        long_about = "Rewrite image paths that still point at a legacy album folder \
            (/albums/landscape/, /albums/portraits/, ...) so they point at the \
            gallery's own album folder."
    )]
    FixPaths {
        /// Gallery name
        gallery: String,
    },

    /// Show or initialize configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completion scripts
    #[command(
        name = "completion",
        long_about = "Generate shell completion scripts for tab-completion.\n\n\
            Outputs a completion script for the specified shell.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Bash (add to ~/.bashrc)
    gal completion bash >> ~/.bashrc

    # Fish
    gal completion fish > ~/.config/fish/completions/gal.fish"
    )]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum HeaderAction {
    /// Show the current header image
    Show {
        gallery: String,
    },
    /// Point the header at another image
    Set {
        gallery: String,
        /// Site path of the image (e.g. /images/albums/beach/dunes.jpg)
        path: String,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum SliderAction {
    /// List slider entries
    List,
    /// Replace the image of a slider entry
    Update {
        /// Current image path of the entry
        old_path: String,
        /// New image path
        new_path: String,
        /// Gallery the entry links to
        #[arg(long)]
        gallery: String,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum AlbumAction {
    /// Create a new album and register it
    Create {
        /// Album name; lowercased, spaces become dashes
        name: String,
        /// Description for the gallery page
        #[arg(long)]
        description: Option<String>,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Write a starter config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Supported shells for completion
#[derive(clap::ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_upload() {
        let cli = Cli::try_parse_from([
            "gal", "upload", "beach", "a.jpg", "--caption", "Sea", "--debug",
        ])
        .unwrap();
        assert!(cli.debug);
        match cli.command {
            Command::Upload {
                gallery, caption, name, ..
            } => {
                assert_eq!(gallery, "beach");
                assert_eq!(caption.as_deref(), Some("Sea"));
                assert!(name.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn slider_update_requires_gallery() {
        assert!(Cli::try_parse_from(["gal", "slider", "update", "/a.jpg", "/b.jpg"]).is_err());
    }

    #[test]
    fn fix_paths_name() {
        let cli = Cli::try_parse_from(["gal", "fix-paths", "landscape"]).unwrap();
        assert!(matches!(cli.command, Command::FixPaths { .. }));
    }
}
