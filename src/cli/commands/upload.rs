//! upload command - Store an image in a gallery

use std::path::Path;

use anyhow::{anyhow, Context as _, Result};

use super::{block_on, open_workspace, report, Context};

/// Upload an image file into a gallery.
///
/// The stored file name is `name` when given, otherwise the file's own name.
pub fn upload(
    ctx: &Context,
    gallery: &str,
    file: &Path,
    caption: Option<&str>,
    copyright: Option<&str>,
    name: Option<&str>,
) -> Result<()> {
    let filename = match name {
        Some(name) => name.to_string(),
        None => file
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string)
            .ok_or_else(|| anyhow!("Cannot derive a file name from '{}'", file.display()))?,
    };
    let content =
        std::fs::read(file).with_context(|| format!("Failed to read '{}'", file.display()))?;

    let workspace = open_workspace(ctx)?;
    block_on(async {
        let outcome = workspace
            .curator
            .upload_image(
                &workspace.operator,
                gallery,
                &filename,
                &content,
                caption,
                copyright,
            )
            .await;
        report(outcome, ctx.verbosity)
    })
}
