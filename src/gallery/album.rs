//! gallery::album
//!
//! Provisioning of new galleries.
//!
//! Creating an album writes three things, in order: the local mirror
//! folders (if a mirror is configured), the gallery index document, and an
//! entry in the site-wide album registry. An existing index is never
//! overwritten, and a gallery already in the registry is not added twice.
//! A failing step stops the sequence; nothing is rolled back.

use tracing::info;

use super::entries;
use super::reconciler::GalleryIndexReconciler;
use super::{retry_on_conflict, ReconcileError};
use crate::core::document::{FrontMatterDocument, ImageEntry};
use crate::core::naming::album_slug;
use crate::core::types::GalleryName;

/// Page body of a freshly created gallery.
pub const ALBUM_BODY: &str = r#"<div class="gallery-grid">
  {% for image in page.images %}
  <figure class="gallery-item">
    <a href="{{ image.image_path }}" class="gallery-link" data-caption="{{ image.caption }}">
      <img src="{{ image.image_path }}" alt="{{ image.caption }}" loading="lazy">
    </a>
    <figcaption>{{ image.caption }} <span class="copyright">{{ image.copyright }}</span></figcaption>
  </figure>
  {% endfor %}
</div>
"#;

/// What [`AlbumProvisioner::create_album`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlbumCreated {
    pub name: GalleryName,
    pub index_path: String,
    /// False when the registry already listed the gallery.
    pub registered: bool,
}

/// Creates gallery skeletons through a reconciler.
#[derive(Debug)]
pub struct AlbumProvisioner<'a> {
    reconciler: &'a GalleryIndexReconciler,
}

impl<'a> AlbumProvisioner<'a> {
    pub fn new(reconciler: &'a GalleryIndexReconciler) -> Self {
        Self { reconciler }
    }

    /// Create a gallery from an operator-typed name.
    ///
    /// # Errors
    ///
    /// - [`ReconcileError::InvalidInput`] if the name normalizes to nothing usable
    /// - [`ReconcileError::Mirror`] if a mirror folder cannot be created
    /// - [`ReconcileError::AlreadyExists`] if the gallery index exists
    pub async fn create_album(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> Result<AlbumCreated, ReconcileError> {
        let slug = album_slug(name);
        if slug.is_empty() {
            return Err(ReconcileError::InvalidInput("album name is empty".into()));
        }
        let gallery = GalleryName::new(&slug)?;
        let layout = self.reconciler.layout();

        if let Some(mirror) = self.reconciler.mirror() {
            for dir in [layout.album_dir(&gallery), layout.gallery_dir(&gallery)] {
                mirror
                    .ensure_dir(&dir)
                    .map_err(|source| ReconcileError::Mirror { path: dir, source })?;
            }
        }

        let title = gallery.title();
        let metadata = entries::skeleton(&title, description, &layout.default_header(&gallery));
        let doc = FrontMatterDocument::new(metadata, format!("\n{}", ALBUM_BODY));
        let index_path = layout.gallery_index(&gallery);
        let message = format!("Create new album: {}", gallery);
        self.reconciler
            .store_document(&index_path, &doc, &message)
            .await?;
        info!(album = %gallery, path = %index_path, "created album");

        let registered = retry_on_conflict(|| self.register(&gallery, &title)).await?;

        Ok(AlbumCreated {
            name: gallery,
            index_path,
            registered,
        })
    }

    /// Add a gallery to the registry unless it is already listed.
    async fn register(&self, gallery: &GalleryName, title: &str) -> Result<bool, ReconcileError> {
        let layout = self.reconciler.layout();
        let path = layout.album_registry.clone();
        let mut doc = self.reconciler.load(&path).await?;

        if entries::registry_contains(&doc.metadata, title) {
            info!(album = %gallery, "album already registered");
            return Ok(false);
        }

        doc.metadata
            .images
            .get_or_insert_with(Vec::new)
            .push(ImageEntry::slider(
                layout.default_header(gallery),
                layout.gallery_folder(title),
                title,
            ));

        let message = format!("Add new album to index: {}", gallery);
        self.reconciler.store_document(&path, &doc, &message).await?;
        Ok(true)
    }
}
