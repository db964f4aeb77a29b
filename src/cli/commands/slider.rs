//! slider commands - List or edit the homepage slider

use anyhow::{Context as _, Result};

use super::{block_on, open_workspace, report, Context};
use crate::ui::output;

pub fn list(ctx: &Context) -> Result<()> {
    let workspace = open_workspace(ctx)?;
    block_on(async {
        let entries = workspace
            .curator
            .slider_images()
            .await
            .context("Failed to read slider")?;

        if entries.is_empty() {
            output::print("The slider is empty.", ctx.verbosity);
        }
        for entry in entries {
            println!(
                "{}  -> {} {}",
                entry.image_path,
                output::or_unset(entry.gallery_name.as_deref()),
                entry.gallery_folder.as_deref().unwrap_or_default()
            );
        }
        Ok(())
    })
}

pub fn update(ctx: &Context, old_path: &str, new_path: &str, gallery: &str) -> Result<()> {
    let workspace = open_workspace(ctx)?;
    block_on(async {
        let outcome = workspace
            .curator
            .update_slider(&workspace.operator, old_path, new_path, gallery)
            .await;
        report(outcome, ctx.verbosity)
    })
}
