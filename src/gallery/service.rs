//! gallery::service
//!
//! Operator-facing gallery operations.
//!
//! # Design
//!
//! [`Curator`] wraps a reconciler with the session gate and the multi-step
//! pipelines an operator triggers. Mutations take the request's
//! [`OperatorContext`] and report an [`Outcome`] rather than an error: a
//! half-finished upload is still something the operator needs to read
//! about. Read views are not gated and return plain results.
//!
//! # Upload Order
//!
//! The index is read before any bytes are sent, so an unreachable or
//! malformed index fails the upload without leaving a stray file. Once
//! the image is stored, an index write failure is reported as an orphan.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use super::album::AlbumProvisioner;
use super::reconciler::{GalleryImage, GalleryIndexReconciler, HeaderImage, SliderImage};
use super::{retry_on_conflict, Outcome, ReconcileError, Warning};
use crate::core::types::{GalleryName, ImageFilename};
use crate::session::OperatorContext;
use crate::store::StoreError;
use crate::thumbnail::{ImageThumbnailer, ThumbnailGenerator};

/// Default bounding box for thumbnails, in pixels.
pub const DEFAULT_THUMBNAIL_SIZE: u32 = 400;

/// Session-gated gallery operations.
pub struct Curator {
    reconciler: GalleryIndexReconciler,
    thumbnailer: Arc<dyn ThumbnailGenerator>,
    thumbnail_size: u32,
}

impl std::fmt::Debug for Curator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Curator")
            .field("reconciler", &self.reconciler)
            .field("thumbnail_size", &self.thumbnail_size)
            .finish()
    }
}

impl Curator {
    pub fn new(reconciler: GalleryIndexReconciler) -> Self {
        Self {
            reconciler,
            thumbnailer: Arc::new(ImageThumbnailer::new()),
            thumbnail_size: DEFAULT_THUMBNAIL_SIZE,
        }
    }

    pub fn with_thumbnailer(mut self, thumbnailer: Arc<dyn ThumbnailGenerator>) -> Self {
        self.thumbnailer = thumbnailer;
        self
    }

    pub fn with_thumbnail_size(mut self, size: u32) -> Self {
        self.thumbnail_size = size;
        self
    }

    pub fn reconciler(&self) -> &GalleryIndexReconciler {
        &self.reconciler
    }

    // =========================================================================
    // Read views
    // =========================================================================

    pub async fn galleries(&self) -> Result<Vec<GalleryName>, ReconcileError> {
        self.reconciler.list_galleries().await
    }

    pub async fn gallery_images(&self, gallery: &str) -> Result<Vec<GalleryImage>, ReconcileError> {
        let gallery = GalleryName::new(gallery)?;
        self.reconciler.gallery_images(&gallery).await
    }

    pub async fn slider_images(&self) -> Result<Vec<SliderImage>, ReconcileError> {
        self.reconciler.slider_images().await
    }

    pub async fn header_image(&self, gallery: &str) -> Result<HeaderImage, ReconcileError> {
        let gallery = GalleryName::new(gallery)?;
        self.reconciler.header_image(&gallery).await
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Store an image, index it, and produce its thumbnail.
    pub async fn upload_image(
        &self,
        ctx: &OperatorContext,
        gallery: &str,
        filename: &str,
        content: &[u8],
        caption: Option<&str>,
        copyright: Option<&str>,
    ) -> Outcome {
        if let Some(denied) = gate(ctx) {
            return denied;
        }
        let (gallery, filename) = match (GalleryName::new(gallery), ImageFilename::image(filename)) {
            (Ok(g), Ok(f)) => (g, f),
            (Err(e), _) | (_, Err(e)) => return Outcome::failed(e.to_string()),
        };
        let layout = self.reconciler.layout();

        // Fail closed: nothing is uploaded if the index is unusable.
        let index = match self.reconciler.load(&layout.gallery_index(&gallery)).await {
            Ok(doc) => doc,
            Err(e) => {
                error!(gallery = %gallery, error = %e, "cannot read gallery index");
                return Outcome::failed(format!("Failed to read gallery index: {}", e));
            }
        };

        let image_path = layout.image_file(&gallery, &filename);
        if let Err(e) = self
            .put_file(&image_path, content, &format!("Add {}", filename), &format!("Update {}", filename))
            .await
        {
            error!(path = %image_path, error = %e, "image upload failed");
            return Outcome::failed(format!("Failed to upload {}: {}", filename, e));
        }
        info!(operator = ctx.name(), path = %image_path, bytes = content.len(), "uploaded image");

        let mut first = Some(index);
        let reconciler = &self.reconciler;
        let (g, f) = (&gallery, &filename);
        let indexed = retry_on_conflict(move || {
            let pre_read = first.take();
            async move {
                match pre_read {
                    Some(doc) => reconciler.add_image_to(doc, g, f, caption, copyright).await,
                    None => reconciler.add_image(g, f, caption, copyright).await,
                }
            }
        })
        .await;

        if let Err(e) = indexed {
            warn!(path = %image_path, error = %e, "image stored but not indexed");
            return Outcome::failed(format!(
                "Uploaded {} but could not update the gallery index; {} is orphaned: {}",
                filename, image_path, e
            ))
            .with_warnings([Warning::OrphanedImage {
                path: image_path,
                reason: e.to_string(),
            }]);
        }

        let warnings = self.store_derivatives(&gallery, &filename, content).await;
        Outcome::ok(format!("Uploaded {} to {}", filename, gallery)).with_warnings(warnings)
    }

    /// Mirror the original and write the thumbnail. Failures become warnings.
    async fn store_derivatives(
        &self,
        gallery: &GalleryName,
        filename: &ImageFilename,
        content: &[u8],
    ) -> Vec<Warning> {
        let layout = self.reconciler.layout();
        let image_path = layout.image_file(gallery, filename);
        let thumb_path = layout.thumbnail_file(gallery, filename);
        let mut warnings = Vec::new();

        let thumbnail = match self.thumbnailer.resize(content, self.thumbnail_size) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                warn!(path = %image_path, error = %e, "thumbnail generation failed");
                warnings.push(Warning::ThumbnailFailure {
                    path: thumb_path.clone(),
                    reason: e.to_string(),
                });
                None
            }
        };

        match self.reconciler.mirror() {
            Some(mirror) => {
                let mut files = vec![(image_path, content.to_vec())];
                if let Some(bytes) = thumbnail {
                    files.push((thumb_path, bytes));
                }
                for (path, bytes) in files {
                    if let Err(e) = mirror.write_file(&path, &bytes) {
                        warn!(path = %path, error = %e, "mirror write failed");
                        warnings.push(Warning::MirrorFailure {
                            path,
                            reason: e.to_string(),
                        });
                    }
                }
            }
            None => {
                if let Some(bytes) = thumbnail {
                    let message = format!("Add thumbnail {}", filename);
                    if let Err(e) = self.put_file(&thumb_path, &bytes, &message, &message).await {
                        warn!(path = %thumb_path, error = %e, "thumbnail upload failed");
                        warnings.push(Warning::ThumbnailFailure {
                            path: thumb_path,
                            reason: e.to_string(),
                        });
                    }
                }
            }
        }

        warnings
    }

    /// Create a file, or update it in place when it already exists.
    async fn put_file(
        &self,
        path: &str,
        content: &[u8],
        create_message: &str,
        update_message: &str,
    ) -> Result<(), StoreError> {
        let store = self.reconciler.store();
        match store.read(path).await {
            Ok(existing) => {
                debug!(path, "replacing existing file");
                store
                    .update(path, update_message, content, &existing.revision)
                    .await?;
            }
            Err(StoreError::NotFound(_)) => {
                store.create(path, create_message, content).await?;
            }
            Err(e) => return Err(e),
        }
        Ok(())
    }

    /// Remove an image from its gallery.
    pub async fn delete_image(&self, ctx: &OperatorContext, gallery: &str, filename: &str) -> Outcome {
        if let Some(denied) = gate(ctx) {
            return denied;
        }
        let (gallery, filename) = match (GalleryName::new(gallery), ImageFilename::new(filename)) {
            (Ok(g), Ok(f)) => (g, f),
            (Err(e), _) | (_, Err(e)) => return Outcome::failed(e.to_string()),
        };

        let (g, f) = (&gallery, &filename);
        match retry_on_conflict(|| self.reconciler.remove_image(g, f)).await {
            Ok(warnings) => {
                info!(operator = ctx.name(), gallery = %gallery, %filename, "deleted image");
                Outcome::ok(format!("Deleted {} from {}", filename, gallery)).with_warnings(warnings)
            }
            Err(e) => failure("Failed to delete image", e),
        }
    }

    pub async fn set_header_image(&self, ctx: &OperatorContext, gallery: &str, path: &str) -> Outcome {
        if let Some(denied) = gate(ctx) {
            return denied;
        }
        let gallery = match GalleryName::new(gallery) {
            Ok(g) => g,
            Err(e) => return Outcome::failed(e.to_string()),
        };

        match retry_on_conflict(|| self.reconciler.set_header_image(&gallery, path)).await {
            Ok(()) => Outcome::ok(format!("Header image of {} set to {}", gallery, path.trim())),
            Err(e) => failure("Failed to update header image", e),
        }
    }

    pub async fn update_slider(
        &self,
        ctx: &OperatorContext,
        old_path: &str,
        new_path: &str,
        gallery_name: &str,
    ) -> Outcome {
        if let Some(denied) = gate(ctx) {
            return denied;
        }

        match retry_on_conflict(|| {
            self.reconciler
                .update_slider_entry(old_path, new_path, gallery_name)
        })
        .await
        {
            Ok(0) => Outcome::ok(format!("No slider entry uses {}; nothing changed", old_path)),
            Ok(n) => Outcome::ok(format!("Updated {} slider entr{}", n, if n == 1 { "y" } else { "ies" })),
            Err(e) => failure("Failed to update slider", e),
        }
    }

    pub async fn create_album(
        &self,
        ctx: &OperatorContext,
        name: &str,
        description: Option<&str>,
    ) -> Outcome {
        if let Some(denied) = gate(ctx) {
            return denied;
        }

        match AlbumProvisioner::new(&self.reconciler)
            .create_album(name, description)
            .await
        {
            Ok(created) => {
                let message = if created.registered {
                    format!("Album '{}' created", created.name)
                } else {
                    format!("Album '{}' created (already in the album index)", created.name)
                };
                Outcome::ok(message)
            }
            Err(e) => failure("Failed to create album", e),
        }
    }

    /// Rewrite legacy album folders in a gallery index.
    pub async fn fix_paths(&self, ctx: &OperatorContext, gallery: &str) -> Outcome {
        if let Some(denied) = gate(ctx) {
            return denied;
        }
        let gallery = match GalleryName::new(gallery) {
            Ok(g) => g,
            Err(e) => return Outcome::failed(e.to_string()),
        };

        match retry_on_conflict(|| self.reconciler.normalize_album_paths(&gallery)).await {
            Ok(0) => Outcome::ok(format!("Paths in {} are already normalized", gallery)),
            Ok(n) => Outcome::ok(format!("Normalized {} path(s) in {}", n, gallery)),
            Err(e) => failure("Failed to normalize paths", e),
        }
    }
}

/// Refuse mutations from unauthenticated operators.
fn gate(ctx: &OperatorContext) -> Option<Outcome> {
    match ctx.require() {
        Ok(()) => None,
        Err(e) => {
            warn!("rejected unauthenticated mutation");
            Some(Outcome::failed(e.to_string()))
        }
    }
}

fn failure(action: &str, err: ReconcileError) -> Outcome {
    error!(error = %err, "{}", action);
    Outcome::failed(format!("{}: {}", action, err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::paths::SiteLayout;
    use crate::store::mock::{FailOn, MockStore};
    use crate::thumbnail::ThumbnailError;

    const INDEX: &str = "images/beach/index.html";

    /// Thumbnailer that copies its input.
    struct CopyThumbnailer;

    impl ThumbnailGenerator for CopyThumbnailer {
        fn resize(&self, bytes: &[u8], _max_dim: u32) -> Result<Vec<u8>, ThumbnailError> {
            Ok(bytes.to_vec())
        }
    }

    fn curator(store: &MockStore) -> Curator {
        let reconciler =
            GalleryIndexReconciler::new(Arc::new(store.clone()), SiteLayout::default(), "© Brik");
        Curator::new(reconciler).with_thumbnailer(Arc::new(CopyThumbnailer))
    }

    fn operator() -> OperatorContext {
        OperatorContext::authenticated("brik")
    }

    #[tokio::test]
    async fn anonymous_mutations_touch_nothing() {
        let store = MockStore::new().with_file(INDEX, "---\nimages: []\n---\n");
        let c = curator(&store);
        let anon = OperatorContext::anonymous();

        let outcomes = [
            c.upload_image(&anon, "beach", "a.jpg", b"x", None, None).await,
            c.delete_image(&anon, "beach", "a.jpg").await,
            c.set_header_image(&anon, "beach", "/h.jpg").await,
            c.update_slider(&anon, "/a", "/b", "Beach").await,
            c.create_album(&anon, "street", None).await,
            c.fix_paths(&anon, "beach").await,
        ];
        for outcome in outcomes {
            assert!(!outcome.success);
            assert_eq!(outcome.message, "not authenticated");
        }
        assert!(store.operations().is_empty());
    }

    #[tokio::test]
    async fn upload_without_mirror_uploads_thumbnail() {
        let store = MockStore::new().with_file(INDEX, "---\nimages: []\n---\n");
        let outcome = curator(&store)
            .upload_image(&operator(), "beach", "a.jpg", b"img", Some("Sea"), None)
            .await;

        assert!(outcome.success, "{}", outcome.message);
        assert!(outcome.warnings.is_empty());
        let messages: Vec<_> = store
            .writes()
            .iter()
            .filter_map(|op| op.message().map(String::from))
            .collect();
        assert_eq!(
            messages,
            vec![
                "Add a.jpg",
                "Update index.html with new image a.jpg",
                "Add thumbnail a.jpg"
            ]
        );
        assert_eq!(
            store.file_content("images/albums/beach/thumbs/a.jpg"),
            Some(b"img".to_vec())
        );
    }

    #[tokio::test]
    async fn reupload_updates_existing_file() {
        let store = MockStore::new()
            .with_file(INDEX, "---\nimages: []\n---\n")
            .with_file("images/albums/beach/a.jpg", "old");
        let outcome = curator(&store)
            .upload_image(&operator(), "beach", "a.jpg", b"new", None, None)
            .await;

        assert!(outcome.success);
        assert_eq!(store.writes()[0].message(), Some("Update a.jpg"));
        assert_eq!(store.file_text("images/albums/beach/a.jpg").as_deref(), Some("new"));
    }

    #[tokio::test]
    async fn upload_rejects_non_images() {
        let store = MockStore::new().with_file(INDEX, "---\nimages: []\n---\n");
        let c = curator(&store);
        for name in ["notes.txt", "../a.jpg", ""] {
            let outcome = c.upload_image(&operator(), "beach", name, b"x", None, None).await;
            assert!(!outcome.success, "{name}");
        }
        assert!(store.writes().is_empty());
    }

    #[tokio::test]
    async fn thumbnail_failure_is_a_warning() {
        struct Broken;
        impl ThumbnailGenerator for Broken {
            fn resize(&self, _: &[u8], _: u32) -> Result<Vec<u8>, ThumbnailError> {
                Err(ThumbnailError::UnknownFormat)
            }
        }

        let store = MockStore::new().with_file(INDEX, "---\nimages: []\n---\n");
        let outcome = curator(&store)
            .with_thumbnailer(Arc::new(Broken))
            .upload_image(&operator(), "beach", "a.jpg", b"x", None, None)
            .await;

        assert!(outcome.success);
        assert!(matches!(outcome.warnings[..], [Warning::ThumbnailFailure { .. }]));
    }

    #[tokio::test]
    async fn upload_with_mirror_writes_locally() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = MockStore::new().with_file(INDEX, "---\nimages: []\n---\n");
        let reconciler =
            GalleryIndexReconciler::new(Arc::new(store.clone()), SiteLayout::default(), "© Brik")
                .with_mirror(crate::mirror::LocalMirror::new(dir.path()));
        let c = Curator::new(reconciler).with_thumbnailer(Arc::new(CopyThumbnailer));

        let outcome = c
            .upload_image(&operator(), "beach", "a.jpg", b"img", None, None)
            .await;
        assert!(outcome.success);
        assert!(dir.path().join("images/albums/beach/a.jpg").is_file());
        assert!(dir.path().join("images/albums/beach/thumbs/a.jpg").is_file());
        assert!(!store.contains("images/albums/beach/thumbs/a.jpg"));
    }

    #[tokio::test]
    async fn update_failure_reports_orphan() {
        let store = MockStore::new()
            .with_file(INDEX, "---\nimages: []\n---\n")
            .fail_on(FailOn::Update(StoreError::RateLimited));
        let outcome = curator(&store)
            .upload_image(&operator(), "beach", "a.jpg", b"img", None, None)
            .await;

        assert!(!outcome.success);
        assert!(outcome.message.contains("orphaned"));
        assert!(matches!(outcome.warnings[..], [Warning::OrphanedImage { .. }]));
        assert!(store.contains("images/albums/beach/a.jpg"));
    }

    #[tokio::test]
    async fn slider_noop_message() {
        let store = MockStore::new().with_file("images/index.html", "---\nimages: []\n---\n");
        let outcome = curator(&store)
            .update_slider(&operator(), "/a.jpg", "/b.jpg", "Beach")
            .await;
        assert!(outcome.success);
        assert!(outcome.message.contains("nothing changed"));
    }

    #[tokio::test]
    async fn read_views_are_not_gated() {
        let store = MockStore::new().with_file("images/beach/index.html", "---\n---\n");
        let galleries = curator(&store).galleries().await.unwrap();
        assert_eq!(galleries, vec![GalleryName::new("beach").unwrap()]);
    }
}
