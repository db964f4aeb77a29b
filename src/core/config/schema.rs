//! core::config::schema
//!
//! Configuration schema types.
//!
//! Every section and field is optional in the file; defaults are applied by
//! the accessors on [`super::Config`]. Unknown keys are rejected so typos
//! surface instead of silently falling back to defaults.

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::core::types::BranchName;

/// Contents of a `config.toml`.
///
/// # Example
///
/// ```toml
/// [repository]
/// owner = "brik"
/// name = "gallery"
/// branch = "gh-pages"
///
/// [site]
/// default_copyright = "© Brik"
///
/// [mirror]
/// path = "/home/brik/gallery"
///
/// [thumbnails]
/// max_dimension = 400
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub repository: Option<RepositoryConfig>,
    pub site: Option<SiteConfig>,
    pub mirror: Option<MirrorConfig>,
    pub thumbnails: Option<ThumbnailConfig>,
}

impl FileConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(repo) = &self.repository {
            repo.validate()?;
        }
        if let Some(site) = &self.site {
            site.validate()?;
        }
        if let Some(mirror) = &self.mirror {
            if mirror.path.as_deref().is_some_and(|p| p.trim().is_empty()) {
                return Err(ConfigError::InvalidValue(
                    "mirror.path cannot be empty".to_string(),
                ));
            }
            if mirror.remote.as_deref().is_some_and(|r| r.trim().is_empty()) {
                return Err(ConfigError::InvalidValue(
                    "mirror.remote cannot be empty".to_string(),
                ));
            }
        }
        if let Some(ThumbnailConfig {
            max_dimension: Some(0),
        }) = &self.thumbnails
        {
            return Err(ConfigError::InvalidValue(
                "thumbnails.max_dimension must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// The GitHub repository that hosts the site.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct RepositoryConfig {
    pub owner: Option<String>,
    pub name: Option<String>,

    /// Branch the site is published from (default: "main")
    pub branch: Option<String>,

    /// API base URL, for GitHub Enterprise
    pub api_url: Option<String>,

    /// Environment variable holding the API token (default: "GITHUB_TOKEN")
    pub token_env: Option<String>,
}

impl RepositoryConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [("owner", &self.owner), ("name", &self.name)] {
            if let Some(value) = value {
                if value.trim().is_empty() || value.contains('/') {
                    return Err(ConfigError::InvalidValue(format!(
                        "repository.{} '{}' is not a valid GitHub name",
                        field, value
                    )));
                }
            }
        }

        if let Some(branch) = &self.branch {
            BranchName::new(branch.as_str()).map_err(|e| {
                ConfigError::InvalidValue(format!("invalid repository.branch: {}", e))
            })?;
        }

        if let Some(url) = &self.api_url {
            if !(url.starts_with("https://") || url.starts_with("http://")) {
                return Err(ConfigError::InvalidValue(format!(
                    "repository.api_url must be an http(s) URL, got '{}'",
                    url
                )));
            }
        }

        if self.token_env.as_deref().is_some_and(|v| v.trim().is_empty()) {
            return Err(ConfigError::InvalidValue(
                "repository.token_env cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Site layout and defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Copyright applied to images uploaded without one
    pub default_copyright: Option<String>,

    /// Document holding the homepage slider (repository-relative)
    pub slider_index: Option<String>,

    /// Document listing every album (repository-relative)
    pub album_registry: Option<String>,
}

impl SiteConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("slider_index", &self.slider_index),
            ("album_registry", &self.album_registry),
        ] {
            if let Some(path) = value {
                if path.trim().is_empty() || path.starts_with('/') || path.contains("..") {
                    return Err(ConfigError::InvalidValue(format!(
                        "site.{} must be a relative path inside the repository, got '{}'",
                        field, path
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Local working copy of the site repository.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct MirrorConfig {
    pub path: Option<String>,

    /// Remote to sync with (default: "origin")
    pub remote: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ThumbnailConfig {
    /// Bounding box edge in pixels (default: 400)
    pub max_dimension: Option<u32>,
}
