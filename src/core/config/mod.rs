//! core::config
//!
//! Configuration schema and loading.
//!
//! # Precedence
//!
//! Values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Config file
//! 3. Environment overrides (`GALLERIST_REPO`, `GALLERIST_BRANCH`, `GALLERIST_MIRROR`)
//! 4. CLI flags (not handled here)
//!
//! # Config File Locations
//!
//! Searched in order:
//! 1. The explicit `--config` path
//! 2. `$GALLERIST_CONFIG` if set
//! 3. `$XDG_CONFIG_HOME/gallerist/config.toml`
//! 4. `~/.config/gallerist/config.toml` (canonical write location)
//!
//! An explicit path that does not exist is an error; the other locations are
//! simply skipped. With no file at all the defaults apply.
//!
//! # Example
//!
//! ```no_run
//! use gallerist::core::config::Config;
//!
//! let result = Config::load(None).unwrap();
//! let config = result.config;
//!
//! println!("Branch: {}", config.branch());
//! println!("Copyright: {}", config.default_copyright());
//! ```

pub mod schema;

pub use schema::{FileConfig, MirrorConfig, RepositoryConfig, SiteConfig, ThumbnailConfig};

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::core::paths::{SiteLayout, DEFAULT_SITE_INDEX};
use crate::store::github::parse_github_url;

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "GALLERIST_CONFIG";

/// `owner/name` override for the repository.
pub const REPO_ENV: &str = "GALLERIST_REPO";

pub const BRANCH_ENV: &str = "GALLERIST_BRANCH";

pub const MIRROR_ENV: &str = "GALLERIST_MIRROR";

const DEFAULT_BRANCH: &str = "main";
const DEFAULT_API_URL: &str = "https://api.github.com";
const DEFAULT_TOKEN_ENV: &str = "GITHUB_TOKEN";
const DEFAULT_COPYRIGHT: &str = "© Brik";
const DEFAULT_REMOTE: &str = "origin";
const DEFAULT_THUMBNAIL_SIZE: u32 = 400;

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("failed to write config file '{path}': {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config value: {0}")]
    InvalidValue(String),

    #[error("home directory not found")]
    NoHomeDir,
}

/// Result of loading configuration.
#[derive(Debug)]
pub struct ConfigLoadResult {
    pub config: Config,
    /// Environment variables that overrode file values.
    pub overrides: Vec<String>,
}

/// Effective configuration.
///
/// Accessors apply defaults, so callers never see a missing value for
/// anything that has one.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub file: FileConfig,
    loaded_from: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the standard locations and the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be read, parsed,
    /// or validated, or if `explicit` names a missing file.
    pub fn load(explicit: Option<&Path>) -> Result<ConfigLoadResult, ConfigError> {
        Self::load_with(explicit, |name| std::env::var(name).ok())
    }

    /// Like [`Config::load`], with environment lookups routed through `env`.
    pub fn load_with<F>(explicit: Option<&Path>, env: F) -> Result<ConfigLoadResult, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match Self::locate(explicit, &env)? {
            Some(path) => {
                debug!(path = %path.display(), "loading config");
                Self::from_path(&path)?
            }
            None => Config::default(),
        };

        let overrides = config.apply_overrides(&env)?;
        config.file.validate()?;

        Ok(ConfigLoadResult { config, overrides })
    }

    /// Read and parse one config file.
    pub fn from_path(path: &Path) -> Result<Config, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let file: FileConfig = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        Ok(Config {
            file,
            loaded_from: Some(path.to_path_buf()),
        })
    }

    /// Find the config file to load, if any.
    fn locate<F>(explicit: Option<&Path>, env: &F) -> Result<Option<PathBuf>, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(ConfigError::ReadError {
                    path: path.to_path_buf(),
                    source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
                });
            }
            return Ok(Some(path.to_path_buf()));
        }

        let mut candidates = Vec::new();
        if let Some(path) = env(CONFIG_ENV).filter(|p| !p.is_empty()) {
            candidates.push(PathBuf::from(path));
        }
        if let Some(xdg_home) = env("XDG_CONFIG_HOME").filter(|p| !p.is_empty()) {
            candidates.push(PathBuf::from(xdg_home).join("gallerist/config.toml"));
        }
        if let Some(home) = dirs::home_dir() {
            candidates.push(home.join(".config/gallerist/config.toml"));
        }

        Ok(candidates.into_iter().find(|p| p.exists()))
    }

    /// Apply environment overrides on top of the file values.
    ///
    /// Returns the names of the variables that took effect.
    pub fn apply_overrides<F>(&mut self, env: F) -> Result<Vec<String>, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut applied = Vec::new();

        if let Some(value) = env(REPO_ENV).filter(|v| !v.trim().is_empty()) {
            let (owner, name) = value
                .trim()
                .split_once('/')
                .filter(|(o, n)| !o.is_empty() && !n.is_empty() && !n.contains('/'))
                .ok_or_else(|| {
                    ConfigError::InvalidValue(format!(
                        "{} must be 'owner/name', got '{}'",
                        REPO_ENV, value
                    ))
                })?;
            let repo = self.file.repository.get_or_insert_with(Default::default);
            repo.owner = Some(owner.to_string());
            repo.name = Some(name.to_string());
            applied.push(REPO_ENV.to_string());
        }

        if let Some(value) = env(BRANCH_ENV).filter(|v| !v.trim().is_empty()) {
            self.file
                .repository
                .get_or_insert_with(Default::default)
                .branch = Some(value.trim().to_string());
            applied.push(BRANCH_ENV.to_string());
        }

        if let Some(value) = env(MIRROR_ENV).filter(|v| !v.trim().is_empty()) {
            self.file.mirror.get_or_insert_with(Default::default).path = Some(value);
            applied.push(MIRROR_ENV.to_string());
        }

        Ok(applied)
    }

    /// Fill in a missing owner and name from the mirror's remote URL.
    ///
    /// Returns true if the repository was inferred.
    pub fn infer_repository(&mut self, remote_url: &str) -> bool {
        if self.owner().is_some() && self.repo_name().is_some() {
            return false;
        }
        let Some((owner, name)) = parse_github_url(remote_url) else {
            return false;
        };
        let repo = self.file.repository.get_or_insert_with(Default::default);
        repo.owner.get_or_insert(owner);
        repo.name.get_or_insert(name);
        true
    }

    /// Canonical config file location: `~/.config/gallerist/config.toml`.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        Ok(home.join(".config/gallerist/config.toml"))
    }

    /// Write a config file atomically.
    ///
    /// Creates parent directories if needed, writes to a temporary file in
    /// the same directory and renames it over the target.
    pub fn write(path: &Path, config: &FileConfig) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError {
                path: path.to_path_buf(),
                source: e,
            })?;
        }

        let contents =
            toml::to_string_pretty(config).map_err(|e| ConfigError::InvalidValue(e.to_string()))?;

        let temp_path = path.with_extension("toml.tmp");
        let write_err = |e| ConfigError::WriteError {
            path: temp_path.clone(),
            source: e,
        };
        let mut file = fs::File::create(&temp_path).map_err(write_err)?;
        file.write_all(contents.as_bytes()).map_err(write_err)?;
        file.sync_all().map_err(write_err)?;

        fs::rename(&temp_path, path).map_err(|e| ConfigError::WriteError {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Starting point for `gal config init`.
    pub fn template() -> FileConfig {
        FileConfig {
            repository: Some(RepositoryConfig {
                owner: Some("your-github-user".to_string()),
                name: Some("your-gallery-repo".to_string()),
                branch: Some(DEFAULT_BRANCH.to_string()),
                api_url: None,
                token_env: Some(DEFAULT_TOKEN_ENV.to_string()),
            }),
            site: Some(SiteConfig {
                default_copyright: Some(DEFAULT_COPYRIGHT.to_string()),
                slider_index: Some(DEFAULT_SITE_INDEX.to_string()),
                album_registry: Some(DEFAULT_SITE_INDEX.to_string()),
            }),
            mirror: None,
            thumbnails: Some(ThumbnailConfig {
                max_dimension: Some(DEFAULT_THUMBNAIL_SIZE),
            }),
        }
    }

    // =========================================================================
    // Accessors with defaults
    // =========================================================================

    fn repository(&self) -> Option<&RepositoryConfig> {
        self.file.repository.as_ref()
    }

    pub fn owner(&self) -> Option<&str> {
        self.repository().and_then(|r| r.owner.as_deref())
    }

    pub fn repo_name(&self) -> Option<&str> {
        self.repository().and_then(|r| r.name.as_deref())
    }

    /// Defaults to "main".
    pub fn branch(&self) -> &str {
        self.repository()
            .and_then(|r| r.branch.as_deref())
            .unwrap_or(DEFAULT_BRANCH)
    }

    pub fn api_url(&self) -> &str {
        self.repository()
            .and_then(|r| r.api_url.as_deref())
            .unwrap_or(DEFAULT_API_URL)
    }

    /// Name of the environment variable holding the API token.
    pub fn token_env(&self) -> &str {
        self.repository()
            .and_then(|r| r.token_env.as_deref())
            .unwrap_or(DEFAULT_TOKEN_ENV)
    }

    pub fn default_copyright(&self) -> &str {
        self.file
            .site
            .as_ref()
            .and_then(|s| s.default_copyright.as_deref())
            .unwrap_or(DEFAULT_COPYRIGHT)
    }

    /// Site layout with the configured special documents.
    pub fn layout(&self) -> SiteLayout {
        let site = self.file.site.as_ref();
        let slider = site.and_then(|s| s.slider_index.as_deref());
        let registry = site.and_then(|s| s.album_registry.as_deref());
        match (slider, registry) {
            (None, None) => SiteLayout::default(),
            _ => SiteLayout::new(
                slider.unwrap_or(DEFAULT_SITE_INDEX),
                registry.unwrap_or(DEFAULT_SITE_INDEX),
            ),
        }
    }

    /// Local mirror directory, if one is configured.
    pub fn mirror_path(&self) -> Option<PathBuf> {
        self.file
            .mirror
            .as_ref()
            .and_then(|m| m.path.as_deref())
            .map(PathBuf::from)
    }

    /// Defaults to "origin".
    pub fn mirror_remote(&self) -> &str {
        self.file
            .mirror
            .as_ref()
            .and_then(|m| m.remote.as_deref())
            .unwrap_or(DEFAULT_REMOTE)
    }

    pub fn thumbnail_size(&self) -> u32 {
        self.file
            .thumbnails
            .as_ref()
            .and_then(|t| t.max_dimension)
            .unwrap_or(DEFAULT_THUMBNAIL_SIZE)
    }

    /// Path of the file this config was loaded from.
    pub fn loaded_from(&self) -> Option<&Path> {
        self.loaded_from.as_deref()
    }
}
