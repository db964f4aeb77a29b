//! header commands - Show or set a gallery's header image

use anyhow::{Context as _, Result};

use super::{block_on, open_workspace, report, Context};
use crate::ui::output;

pub fn show(ctx: &Context, gallery: &str) -> Result<()> {
    let workspace = open_workspace(ctx)?;
    block_on(async {
        let header = workspace
            .curator
            .header_image(gallery)
            .await
            .with_context(|| format!("Failed to read header image of '{}'", gallery))?;
        println!("{}", output::or_unset(header.path.as_deref()));
        if let Some(url) = header.url {
            output::print(url, ctx.verbosity);
        }
        Ok(())
    })
}

pub fn set(ctx: &Context, gallery: &str, path: &str) -> Result<()> {
    let workspace = open_workspace(ctx)?;
    block_on(async {
        let outcome = workspace
            .curator
            .set_header_image(&workspace.operator, gallery, path)
            .await;
        report(outcome, ctx.verbosity)
    })
}
