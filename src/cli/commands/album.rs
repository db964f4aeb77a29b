//! album command - Create a new album

use anyhow::Result;

use super::{block_on, open_workspace, report, Context};

pub fn create_album(ctx: &Context, name: &str, description: Option<&str>) -> Result<()> {
    let workspace = open_workspace(ctx)?;
    block_on(async {
        let outcome = workspace
            .curator
            .create_album(&workspace.operator, name, description)
            .await;
        report(outcome, ctx.verbosity)
    })
}
