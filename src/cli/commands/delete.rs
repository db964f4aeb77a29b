//! delete command - Remove an image from a gallery

use anyhow::Result;

use super::{block_on, open_workspace, report, Context};

/// Delete an image and its index entry.
pub fn delete(ctx: &Context, gallery: &str, filename: &str) -> Result<()> {
    let workspace = open_workspace(ctx)?;
    block_on(async {
        let outcome = workspace
            .curator
            .delete_image(&workspace.operator, gallery, filename)
            .await;
        report(outcome, ctx.verbosity)
    })
}
