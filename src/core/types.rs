//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`GalleryName`] - Normalized gallery identifier
//! - [`ImageFilename`] - A bare image file name (no directories)
//! - [`Revision`] - Opaque revision token handed out by a content store
//! - [`BranchName`] - Validated Git branch name
//!
//! # Validation
//!
//! These types enforce validity at construction time. A gallery name that
//! would escape its directory, or a filename carrying a path, cannot be
//! represented.
//!
//! # Examples
//!
//! ```
//! use gallerist::core::types::{GalleryName, ImageFilename};
//!
//! let gallery = GalleryName::new("Landscapes").unwrap();
//! assert_eq!(gallery.as_str(), "landscape");
//! assert_eq!(gallery.index_folder(), "landscapes");
//!
//! assert!(ImageFilename::new("sunset.jpg").is_ok());
//! assert!(ImageFilename::new("../sunset.jpg").is_err());
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid gallery name: {0}")]
    InvalidGalleryName(String),

    #[error("invalid filename: {0}")]
    InvalidFilename(String),

    #[error("invalid branch name: {0}")]
    InvalidBranchName(String),
}

/// On-disk folder name of the landscape gallery index.
const LANDSCAPE_FOLDER: &str = "landscapes";

/// URL-facing name of the landscape gallery.
const LANDSCAPE_GALLERY: &str = "landscape";

/// File extensions accepted as gallery images (compared case-insensitively).
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif"];

/// A normalized gallery identifier.
///
/// Names are trimmed and lowercased. The historical folder name
/// `landscapes` is folded into `landscape`, so every boundary that accepts
/// a gallery name sees the same identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GalleryName(String);

impl GalleryName {
    /// Create a normalized gallery name.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidGalleryName` if the name is empty or
    /// contains path separators, `..`, whitespace, or control characters.
    pub fn new(name: impl AsRef<str>) -> Result<Self, TypeError> {
        let normalized = name.as_ref().trim().to_lowercase();

        if normalized.is_empty() {
            return Err(TypeError::InvalidGalleryName(
                "gallery name cannot be empty".into(),
            ));
        }
        if normalized.contains('/') || normalized.contains('\\') {
            return Err(TypeError::InvalidGalleryName(format!(
                "'{}' cannot contain path separators",
                normalized
            )));
        }
        if normalized.contains("..") {
            return Err(TypeError::InvalidGalleryName(format!(
                "'{}' cannot contain '..'",
                normalized
            )));
        }
        if normalized
            .chars()
            .any(|c| c.is_whitespace() || c.is_control())
        {
            return Err(TypeError::InvalidGalleryName(format!(
                "'{}' cannot contain whitespace or control characters",
                normalized
            )));
        }

        if normalized == LANDSCAPE_FOLDER {
            return Ok(Self(LANDSCAPE_GALLERY.to_string()));
        }

        Ok(Self(normalized))
    }

    /// The normalized identifier, as used in site URLs.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Folder under `images/` that holds this gallery's index document.
    pub fn index_folder(&self) -> &str {
        if self.0 == LANDSCAPE_GALLERY {
            LANDSCAPE_FOLDER
        } else {
            &self.0
        }
    }

    /// Display title: first character uppercased.
    ///
    /// ```
    /// use gallerist::core::types::GalleryName;
    ///
    /// assert_eq!(GalleryName::new("beach").unwrap().title(), "Beach");
    /// ```
    pub fn title(&self) -> String {
        crate::core::naming::titlecase(&self.0)
    }
}

impl TryFrom<String> for GalleryName {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<GalleryName> for String {
    fn from(name: GalleryName) -> Self {
        name.0
    }
}

impl fmt::Display for GalleryName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for GalleryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A bare file name inside a gallery folder.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageFilename(String);

impl ImageFilename {
    /// Create a validated filename.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidFilename` for empty names, `.`/`..`,
    /// names with path separators, or names with control characters.
    pub fn new(name: impl AsRef<str>) -> Result<Self, TypeError> {
        let name = name.as_ref();

        if name.trim().is_empty() {
            return Err(TypeError::InvalidFilename(
                "filename cannot be empty".into(),
            ));
        }
        if name == "." || name == ".." {
            return Err(TypeError::InvalidFilename(format!(
                "'{}' is not a file name",
                name
            )));
        }
        if name.contains('/') || name.contains('\\') {
            return Err(TypeError::InvalidFilename(format!(
                "'{}' cannot contain path separators",
                name
            )));
        }
        if name.chars().any(char::is_control) {
            return Err(TypeError::InvalidFilename(format!(
                "'{}' cannot contain control characters",
                name
            )));
        }

        Ok(Self(name.to_string()))
    }

    /// Create a filename that must carry a gallery image extension.
    pub fn image(name: impl AsRef<str>) -> Result<Self, TypeError> {
        let filename = Self::new(name)?;
        if !filename.has_image_extension() {
            return Err(TypeError::InvalidFilename(format!(
                "'{}' is not an image (expected one of: {})",
                filename.0,
                IMAGE_EXTENSIONS.join(", ")
            )));
        }
        Ok(filename)
    }

    /// Whether the extension is one of [`IMAGE_EXTENSIONS`].
    pub fn has_image_extension(&self) -> bool {
        has_image_extension(&self.0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageFilename {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ImageFilename {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Check a path or name for a gallery image extension, case-insensitively.
pub fn has_image_extension(name: &str) -> bool {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => {
            let ext = ext.to_ascii_lowercase();
            IMAGE_EXTENSIONS.contains(&ext.as_str())
        }
        _ => false,
    }
}

/// Opaque revision token issued by a content store.
///
/// For the GitHub store this is the blob SHA. Callers never inspect it;
/// they hand it back on the next write to prove they saw the latest state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Revision(String);

impl Revision {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A validated Git branch name.
///
/// Follows the subset of `git check-ref-format` rules that matter for a
/// branch supplied in configuration:
/// - Cannot be empty or exactly `@`
/// - Cannot start with `.`, `-` or `/`, or end with `.lock` or `/`
/// - Cannot contain `..`, `@{`, `//`, whitespace, control characters,
///   or any of `~ ^ : \ ? * [`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BranchName(String);

impl BranchName {
    /// Create a new validated branch name.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidBranchName` if the name violates the rules above.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        Self::validate(&name)?;
        Ok(Self(name))
    }

    fn validate(name: &str) -> Result<(), TypeError> {
        let invalid = |reason: &str| -> Result<(), TypeError> {
            Err(TypeError::InvalidBranchName(format!("'{}' {}", name, reason)))
        };

        if name.is_empty() {
            return invalid("is empty");
        }
        if name == "@" {
            return invalid("is reserved");
        }
        if name.starts_with('.') || name.starts_with('-') || name.starts_with('/') {
            return invalid("has an invalid first character");
        }
        if name.ends_with(".lock") || name.ends_with('/') {
            return invalid("has an invalid suffix");
        }
        if name.contains("..") || name.contains("@{") || name.contains("//") {
            return invalid("contains a forbidden sequence");
        }
        if name.chars().any(|c| {
            c.is_whitespace()
                || c.is_control()
                || matches!(c, '~' | '^' | ':' | '\\' | '?' | '*' | '[')
        }) {
            return invalid("contains a forbidden character");
        }

        Ok(())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for BranchName {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<BranchName> for String {
    fn from(name: BranchName) -> Self {
        name.0
    }
}

impl fmt::Display for BranchName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod gallery_name {
        use super::*;

        #[test]
        fn lowercases_and_trims() {
            let name = GalleryName::new("  Beach ").unwrap();
            assert_eq!(name.as_str(), "beach");
        }

        #[test]
        fn folds_landscapes_alias() {
            let name = GalleryName::new("landscapes").unwrap();
            assert_eq!(name.as_str(), "landscape");
            assert_eq!(name.index_folder(), "landscapes");

            let name = GalleryName::new("LANDSCAPE").unwrap();
            assert_eq!(name.as_str(), "landscape");
        }

        #[test]
        fn other_galleries_use_their_own_folder() {
            let name = GalleryName::new("portrait").unwrap();
            assert_eq!(name.index_folder(), "portrait");
        }

        #[test]
        fn rejects_path_tricks() {
            assert!(GalleryName::new("").is_err());
            assert!(GalleryName::new("   ").is_err());
            assert!(GalleryName::new("a/b").is_err());
            assert!(GalleryName::new("a\\b").is_err());
            assert!(GalleryName::new("..").is_err());
            assert!(GalleryName::new("new york").is_err());
        }

        #[test]
        fn title_capitalizes_first_letter() {
            assert_eq!(GalleryName::new("street").unwrap().title(), "Street");
            assert_eq!(GalleryName::new("new-york").unwrap().title(), "New-york");
        }

        #[test]
        fn serde_roundtrip_normalizes() {
            let name: GalleryName = serde_json::from_str("\"Landscapes\"").unwrap();
            assert_eq!(name.as_str(), "landscape");
            assert_eq!(serde_json::to_string(&name).unwrap(), "\"landscape\"");
        }
    }

    mod image_filename {
        use super::*;

        #[test]
        fn accepts_plain_names() {
            assert!(ImageFilename::new("a.jpg").is_ok());
            assert!(ImageFilename::new("my photo (1).JPG").is_ok());
        }

        #[test]
        fn rejects_paths() {
            assert!(ImageFilename::new("").is_err());
            assert!(ImageFilename::new("..").is_err());
            assert!(ImageFilename::new("thumbs/a.jpg").is_err());
            assert!(ImageFilename::new("a\nb.jpg").is_err());
        }

        #[test]
        fn image_requires_extension() {
            assert!(ImageFilename::image("a.JPEG").is_ok());
            assert!(ImageFilename::image("a.gif").is_ok());
            assert!(ImageFilename::image("notes.txt").is_err());
            assert!(ImageFilename::image("jpg").is_err());
        }

        #[test]
        fn extension_check_ignores_hidden_stem() {
            assert!(!has_image_extension(".jpg"));
            assert!(has_image_extension("images/albums/g/x.Png"));
        }
    }

    mod branch_name {
        use super::*;

        #[test]
        fn valid_names() {
            assert!(BranchName::new("main").is_ok());
            assert!(BranchName::new("gh-pages").is_ok());
            assert!(BranchName::new("release/2024").is_ok());
        }

        #[test]
        fn invalid_names() {
            assert!(BranchName::new("").is_err());
            assert!(BranchName::new("@").is_err());
            assert!(BranchName::new(".hidden").is_err());
            assert!(BranchName::new("a..b").is_err());
            assert!(BranchName::new("has space").is_err());
            assert!(BranchName::new("branch.lock").is_err());
            assert!(BranchName::new("a:b").is_err());
        }
    }
}
