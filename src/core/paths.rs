//! core::paths
//!
//! Centralized path routing for the gallery site layout.
//!
//! # Layout
//!
//! Every gallery lives in two places inside the site repository:
//! - `images/<folder>/index.html` - the gallery index document
//! - `images/albums/<gallery>/` - the image files, with `thumbs/` beneath
//!
//! where `<folder>` is [`GalleryName::index_folder`] (the landscape gallery
//! keeps its historical `landscapes` folder). The slider document and the
//! album registry are site-wide documents whose locations are configurable.
//!
//! Store paths never carry a leading slash. Site paths (what the front
//! matter records and the browser requests) always do.
//!
//! **Hard rule:** No code outside this module formats `images/...` paths.
//!
//! # Example
//!
//! ```
//! use gallerist::core::paths::SiteLayout;
//! use gallerist::core::types::{GalleryName, ImageFilename};
//!
//! let layout = SiteLayout::default();
//! let gallery = GalleryName::new("landscape").unwrap();
//! let file = ImageFilename::new("dune.jpg").unwrap();
//!
//! assert_eq!(layout.gallery_index(&gallery), "images/landscapes/index.html");
//! assert_eq!(layout.image_file(&gallery, &file), "images/albums/landscape/dune.jpg");
//! assert_eq!(layout.image_site_path(&gallery, &file), "/images/albums/landscape/dune.jpg");
//! ```

use crate::core::types::{GalleryName, ImageFilename};

/// Root folder of all gallery content.
pub const IMAGES_ROOT: &str = "images";

/// Root folder of album image files.
pub const ALBUMS_ROOT: &str = "images/albums";

/// Subfolder holding derived thumbnails.
pub const THUMBS_DIR: &str = "thumbs";

/// Default location of the slider document and the album registry.
pub const DEFAULT_SITE_INDEX: &str = "images/index.html";

/// Folders under `images/` that are not galleries.
pub const RESERVED_FOLDERS: &[&str] = &["albums", "slider"];

/// Path routing for a site repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteLayout {
    /// Store path of the homepage slider document.
    pub slider_index: String,
    /// Store path of the site-wide album registry document.
    pub album_registry: String,
}

impl Default for SiteLayout {
    fn default() -> Self {
        Self {
            slider_index: DEFAULT_SITE_INDEX.to_string(),
            album_registry: DEFAULT_SITE_INDEX.to_string(),
        }
    }
}

impl SiteLayout {
    /// Create a layout with explicit special-document locations.
    pub fn new(slider_index: impl AsRef<str>, album_registry: impl AsRef<str>) -> Self {
        Self {
            slider_index: store_path(slider_index.as_ref()),
            album_registry: store_path(album_registry.as_ref()),
        }
    }

    /// Store path of a gallery's index document.
    pub fn gallery_index(&self, gallery: &GalleryName) -> String {
        format!("{}/index.html", self.gallery_dir(gallery))
    }

    /// Store folder holding a gallery's index document.
    pub fn gallery_dir(&self, gallery: &GalleryName) -> String {
        format!("{}/{}", IMAGES_ROOT, gallery.index_folder())
    }

    /// Store folder holding a gallery's image files.
    pub fn album_dir(&self, gallery: &GalleryName) -> String {
        format!("{}/{}", ALBUMS_ROOT, gallery)
    }

    /// Store path of an image file.
    pub fn image_file(&self, gallery: &GalleryName, filename: &ImageFilename) -> String {
        format!("{}/{}", self.album_dir(gallery), filename)
    }

    /// Store path of an image's thumbnail.
    pub fn thumbnail_file(&self, gallery: &GalleryName, filename: &ImageFilename) -> String {
        format!("{}/{}/{}", self.album_dir(gallery), THUMBS_DIR, filename)
    }

    /// Site path recorded as `image_path` in the gallery index.
    pub fn image_site_path(&self, gallery: &GalleryName, filename: &ImageFilename) -> String {
        format!("/{}", self.image_file(gallery, filename))
    }

    /// Conventional header image of a freshly created gallery.
    pub fn default_header(&self, gallery: &GalleryName) -> String {
        format!("/{}/header.jpg", self.album_dir(gallery))
    }

    /// `gallery-folder` value for slider and registry entries.
    ///
    /// Derived from the display name, lowercased, not from the on-disk folder.
    pub fn gallery_folder(&self, gallery_name: &str) -> String {
        format!("/{}/{}/", IMAGES_ROOT, gallery_name.trim().to_lowercase())
    }
}

/// Convert a site path or loose input into a store path.
///
/// Strips leading and trailing slashes and collapses empty segments.
///
/// ```
/// use gallerist::core::paths::store_path;
///
/// assert_eq!(store_path("/images/albums/x.jpg"), "images/albums/x.jpg");
/// assert_eq!(store_path("images//index.html/"), "images/index.html");
/// ```
pub fn store_path(path: &str) -> String {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gallery(name: &str) -> GalleryName {
        GalleryName::new(name).unwrap()
    }

    fn file(name: &str) -> ImageFilename {
        ImageFilename::new(name).unwrap()
    }

    #[test]
    fn default_special_documents() {
        let layout = SiteLayout::default();
        assert_eq!(layout.slider_index, "images/index.html");
        assert_eq!(layout.album_registry, "images/index.html");
    }

    #[test]
    fn new_normalizes_special_paths() {
        let layout = SiteLayout::new("/images/slider/index.html", "images/index.html");
        assert_eq!(layout.slider_index, "images/slider/index.html");
    }

    #[test]
    fn gallery_paths() {
        let layout = SiteLayout::default();
        let g = gallery("beach");
        let f = file("a.jpg");

        assert_eq!(layout.gallery_index(&g), "images/beach/index.html");
        assert_eq!(layout.album_dir(&g), "images/albums/beach");
        assert_eq!(layout.image_file(&g, &f), "images/albums/beach/a.jpg");
        assert_eq!(layout.thumbnail_file(&g, &f), "images/albums/beach/thumbs/a.jpg");
        assert_eq!(layout.image_site_path(&g, &f), "/images/albums/beach/a.jpg");
        assert_eq!(layout.default_header(&g), "/images/albums/beach/header.jpg");
    }

    #[test]
    fn landscape_index_uses_legacy_folder() {
        let layout = SiteLayout::default();
        let g = gallery("landscapes");
        assert_eq!(layout.gallery_index(&g), "images/landscapes/index.html");
        assert_eq!(layout.album_dir(&g), "images/albums/landscape");
    }

    #[test]
    fn gallery_folder_lowercases_display_name() {
        let layout = SiteLayout::default();
        assert_eq!(layout.gallery_folder("Street"), "/images/street/");
    }
}
