//! browse commands - List galleries and their images

use anyhow::{Context as _, Result};

use super::{block_on, open_workspace, Context};
use crate::ui::output;

/// List the galleries of the site.
pub fn galleries(ctx: &Context) -> Result<()> {
    let workspace = open_workspace(ctx)?;
    block_on(async {
        let names = workspace
            .curator
            .galleries()
            .await
            .context("Failed to list galleries")?;
        if names.is_empty() {
            output::print("No galleries found.", ctx.verbosity);
        } else {
            println!("{}", output::format_list(&names, ""));
        }
        Ok(())
    })
}

/// List the images of a gallery.
pub fn images(ctx: &Context, gallery: &str) -> Result<()> {
    let workspace = open_workspace(ctx)?;
    block_on(async {
        let images = workspace
            .curator
            .gallery_images(gallery)
            .await
            .with_context(|| format!("Failed to list images of '{}'", gallery))?;

        if images.is_empty() {
            output::print(format!("No images in {}.", gallery), ctx.verbosity);
            return Ok(());
        }

        for image in &images {
            let marker = if image.indexed { " " } else { "!" };
            println!(
                "{} {:<32} {} ({})",
                marker, image.filename, image.caption, image.copyright
            );
        }

        let unindexed = images.iter().filter(|i| !i.indexed).count();
        if unindexed > 0 {
            output::warn(
                format!("{} image(s) marked ! are not in the gallery index", unindexed),
                ctx.verbosity,
            );
        }
        Ok(())
    })
}
