//! config command - Show or initialize configuration

use anyhow::{bail, Context as _, Result};

use super::Context;
use crate::core::config::Config;
use crate::ui::output;

/// Print the effective configuration as TOML.
///
/// Defaults are filled in so the output shows what commands will use.
pub fn show(ctx: &Context) -> Result<()> {
    let config = ctx.load_config()?;

    let mut effective = config.file.clone();
    let repo = effective.repository.get_or_insert_with(Default::default);
    repo.branch = Some(config.branch().to_string());
    repo.api_url = Some(config.api_url().to_string());
    repo.token_env = Some(config.token_env().to_string());
    let layout = config.layout();
    let site = effective.site.get_or_insert_with(Default::default);
    site.default_copyright = Some(config.default_copyright().to_string());
    site.slider_index = Some(layout.slider_index);
    site.album_registry = Some(layout.album_registry);
    effective
        .thumbnails
        .get_or_insert_with(Default::default)
        .max_dimension = Some(config.thumbnail_size());
    if let Some(mirror) = effective.mirror.as_mut() {
        mirror.remote = Some(config.mirror_remote().to_string());
    }

    match config.loaded_from() {
        Some(path) => println!("# Loaded from {}", path.display()),
        None => println!("# No config file found; showing defaults"),
    }
    let text = toml::to_string_pretty(&effective).context("Failed to render config")?;
    print!("{}", text);
    Ok(())
}

/// Write a starter config file.
pub fn init(ctx: &Context, force: bool) -> Result<()> {
    let path = match &ctx.config_path {
        Some(path) => path.clone(),
        None => Config::default_path()?,
    };

    if path.exists() && !force {
        bail!(
            "Config file '{}' already exists (use --force to overwrite)",
            path.display()
        );
    }

    Config::write(&path, &Config::template()).context("Failed to write config")?;
    output::success(format!("Wrote {}", path.display()), ctx.verbosity);
    output::print(
        "Edit [repository] owner and name, then export your token as GITHUB_TOKEN.",
        ctx.verbosity,
    );
    Ok(())
}
