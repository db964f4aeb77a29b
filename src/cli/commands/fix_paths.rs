//! fix-paths command - Rewrite legacy album folders

use anyhow::Result;

use super::{block_on, open_workspace, report, Context};

pub fn fix_paths(ctx: &Context, gallery: &str) -> Result<()> {
    let workspace = open_workspace(ctx)?;
    block_on(async {
        let outcome = workspace
            .curator
            .fix_paths(&workspace.operator, gallery)
            .await;
        report(outcome, ctx.verbosity)
    })
}
