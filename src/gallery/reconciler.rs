//! gallery::reconciler
//!
//! Read-modify-write of gallery index documents against a content store.
//!
//! # Design
//!
//! Each mutation touches exactly one document: it reads the document and
//! its revision, edits the metadata with [`super::entries`], and writes it
//! back guarded by that revision. A stale revision surfaces as
//! [`ReconcileError::UpdateConflict`]; the reconciler itself never retries.
//!
//! The body of a document is never inspected and is written back as read.
//!
//! # Example
//!
//! ```ignore
//! use gallerist::gallery::GalleryIndexReconciler;
//!
//! let reconciler = GalleryIndexReconciler::new(store, SiteLayout::default(), "© Brik");
//! reconciler.add_image(&gallery, &filename, Some("Dunes"), None).await?;
//! ```

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::entries;
use super::{ReconcileError, Warning};
use crate::core::document::{FrontMatterDocument, ImageEntry, IndexMetadata};
use crate::core::paths::{SiteLayout, IMAGES_ROOT, RESERVED_FOLDERS};
use crate::core::types::{has_image_extension, GalleryName, ImageFilename, Revision};
use crate::mirror::LocalMirror;
use crate::store::{ContentStore, StoreError};

const MSG_SET_HEADER: &str = "Update header image";
const MSG_SLIDER: &str = "Update slider image";
const MSG_NORMALIZE: &str = "Normalize album paths";

/// An image file of a gallery, joined with its index entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryImage {
    pub filename: String,
    /// Site path, as recorded in the index.
    pub image_path: String,
    pub caption: String,
    pub copyright: String,
    /// Whether the index lists this file.
    pub indexed: bool,
    pub url: Option<String>,
}

/// One entry of the homepage slider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SliderImage {
    pub image_path: String,
    pub gallery_folder: Option<String>,
    pub gallery_name: Option<String>,
    pub url: Option<String>,
}

/// Header image of a gallery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderImage {
    pub path: Option<String>,
    pub url: Option<String>,
}

/// Reconciles gallery, slider, and registry documents with a store.
pub struct GalleryIndexReconciler {
    store: Arc<dyn ContentStore>,
    layout: SiteLayout,
    default_copyright: String,
    mirror: Option<LocalMirror>,
}

impl std::fmt::Debug for GalleryIndexReconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GalleryIndexReconciler")
            .field("store", &self.store.name())
            .field("layout", &self.layout)
            .field("mirror", &self.mirror)
            .finish()
    }
}

impl GalleryIndexReconciler {
    pub fn new(
        store: Arc<dyn ContentStore>,
        layout: SiteLayout,
        default_copyright: impl Into<String>,
    ) -> Self {
        Self {
            store,
            layout,
            default_copyright: default_copyright.into(),
            mirror: None,
        }
    }

    /// Also mirror deletions into a local working copy.
    pub fn with_mirror(mut self, mirror: LocalMirror) -> Self {
        self.mirror = Some(mirror);
        self
    }

    pub fn store(&self) -> &Arc<dyn ContentStore> {
        &self.store
    }

    pub fn layout(&self) -> &SiteLayout {
        &self.layout
    }

    pub fn mirror(&self) -> Option<&LocalMirror> {
        self.mirror.as_ref()
    }

    pub fn default_copyright(&self) -> &str {
        &self.default_copyright
    }

    // =========================================================================
    // Document I/O
    // =========================================================================

    /// Read and parse a document, keeping its revision.
    pub async fn load(&self, path: &str) -> Result<FrontMatterDocument, ReconcileError> {
        let file = self
            .store
            .read(path)
            .await
            .map_err(|source| ReconcileError::StoreRead {
                path: path.to_string(),
                source,
            })?;

        let doc = FrontMatterDocument::parse(&file.content).map_err(|source| {
            ReconcileError::MalformedDocument {
                path: path.to_string(),
                source,
            }
        })?;
        debug!(path, revision = %file.revision, "loaded document");
        Ok(doc.with_revision(file.revision))
    }

    /// Write a document: update at its revision, or create when it has none.
    pub async fn store_document(
        &self,
        path: &str,
        doc: &FrontMatterDocument,
        message: &str,
    ) -> Result<Revision, ReconcileError> {
        let text = doc
            .serialize()
            .map_err(|source| ReconcileError::MalformedDocument {
                path: path.to_string(),
                source,
            })?;
        // Never write what the next load would refuse.
        FrontMatterDocument::parse(text.as_bytes()).map_err(|source| {
            ReconcileError::MalformedDocument {
                path: path.to_string(),
                source,
            }
        })?;

        let result = match &doc.revision {
            Some(revision) => {
                self.store
                    .update(path, message, text.as_bytes(), revision)
                    .await
            }
            None => self.store.create(path, message, text.as_bytes()).await,
        };

        match result {
            Ok(revision) => {
                info!(path, %revision, message, "wrote document");
                Ok(revision)
            }
            Err(StoreError::Conflict(_)) => Err(ReconcileError::UpdateConflict {
                path: path.to_string(),
            }),
            Err(StoreError::AlreadyExists(_)) => Err(ReconcileError::AlreadyExists {
                path: path.to_string(),
            }),
            Err(source) => Err(ReconcileError::StoreWrite {
                path: path.to_string(),
                source,
            }),
        }
    }

    // =========================================================================
    // Gallery index mutations
    // =========================================================================

    /// Add (or refresh) an image entry in a gallery index.
    pub async fn add_image(
        &self,
        gallery: &GalleryName,
        filename: &ImageFilename,
        caption: Option<&str>,
        copyright: Option<&str>,
    ) -> Result<(), ReconcileError> {
        let doc = self.load(&self.layout.gallery_index(gallery)).await?;
        self.add_image_to(doc, gallery, filename, caption, copyright)
            .await
    }

    /// Like [`add_image`](Self::add_image), on a document the caller already read.
    pub async fn add_image_to(
        &self,
        mut doc: FrontMatterDocument,
        gallery: &GalleryName,
        filename: &ImageFilename,
        caption: Option<&str>,
        copyright: Option<&str>,
    ) -> Result<(), ReconcileError> {
        let path = self.layout.gallery_index(gallery);

        if entries::ensure_skeleton(
            &mut doc.metadata,
            &gallery.title(),
            &self.layout.default_header(gallery),
        ) {
            debug!(path = %path, "initialized gallery skeleton");
        }

        let entry = ImageEntry::gallery(
            self.layout.image_site_path(gallery, filename),
            entries::caption_or_default(caption, filename.as_str()),
            entries::copyright_or_default(copyright, &self.default_copyright),
        );
        if !entries::upsert_entry(&mut doc.metadata, entry) {
            debug!(%filename, "image already indexed; refreshing entry");
        }

        let message = format!("Update index.html with new image {}", filename);
        self.store_document(&path, &doc, &message).await?;
        Ok(())
    }

    /// Remove an image from a gallery, then delete its files best-effort.
    pub async fn remove_image(
        &self,
        gallery: &GalleryName,
        filename: &ImageFilename,
    ) -> Result<Vec<Warning>, ReconcileError> {
        let path = self.layout.gallery_index(gallery);
        let target = self.layout.image_site_path(gallery, filename);
        let mut warnings = Vec::new();

        let mut doc = self.load(&path).await?;
        let removed = entries::remove_entries(&mut doc.metadata, &target);
        if removed != 1 {
            warn!(image_path = %target, removed, "unexpected number of index entries removed");
            warnings.push(Warning::CountMismatch {
                image_path: target.clone(),
                removed,
            });
        }
        if removed > 0 {
            let message = format!("Remove {} from gallery index", filename);
            self.store_document(&path, &doc, &message).await?;
        }

        let files = [
            self.layout.image_file(gallery, filename),
            self.layout.thumbnail_file(gallery, filename),
        ];
        for file in &files {
            if let Some(warning) = self.delete_from_store(file, filename).await {
                warnings.push(warning);
            }
            if let Some(mirror) = &self.mirror {
                match mirror.delete_if_exists(file) {
                    Ok(true) => debug!(path = %file, "removed from mirror"),
                    Ok(false) => {}
                    Err(e) => warnings.push(Warning::MirrorFailure {
                        path: file.clone(),
                        reason: e.to_string(),
                    }),
                }
            }
        }

        Ok(warnings)
    }

    async fn delete_from_store(&self, path: &str, filename: &ImageFilename) -> Option<Warning> {
        let revision = match self.store.read(path).await {
            Ok(file) => file.revision,
            Err(StoreError::NotFound(_)) => {
                return Some(Warning::NotFoundIgnorable {
                    path: path.to_string(),
                })
            }
            Err(e) => {
                return Some(Warning::DeleteFailure {
                    path: path.to_string(),
                    reason: e.to_string(),
                })
            }
        };

        let message = format!("Delete {}", filename);
        match self.store.delete(path, &message, &revision).await {
            Ok(()) => {
                info!(path, "deleted from store");
                None
            }
            Err(StoreError::NotFound(_)) => Some(Warning::NotFoundIgnorable {
                path: path.to_string(),
            }),
            Err(e) => Some(Warning::DeleteFailure {
                path: path.to_string(),
                reason: e.to_string(),
            }),
        }
    }

    /// Set `header-img` of a gallery index.
    pub async fn set_header_image(
        &self,
        gallery: &GalleryName,
        new_path: &str,
    ) -> Result<(), ReconcileError> {
        let new_path = new_path.trim();
        if new_path.is_empty() {
            return Err(ReconcileError::InvalidInput(
                "header image path must not be empty".into(),
            ));
        }

        let path = self.layout.gallery_index(gallery);
        let mut doc = self.load(&path).await?;
        doc.metadata.header_img = Some(new_path.to_string());
        self.store_document(&path, &doc, MSG_SET_HEADER).await?;
        Ok(())
    }

    /// Rewrite slider entries pointing at `old_path`.
    ///
    /// Returns the number of entries changed. Zero means nothing was written.
    pub async fn update_slider_entry(
        &self,
        old_path: &str,
        new_path: &str,
        gallery_name: &str,
    ) -> Result<usize, ReconcileError> {
        let gallery_name = gallery_name.trim();
        if new_path.trim().is_empty() || gallery_name.is_empty() {
            return Err(ReconcileError::InvalidInput(
                "slider image path and gallery name are required".into(),
            ));
        }

        let path = self.layout.slider_index.clone();
        let mut doc = self.load(&path).await?;
        let count = entries::rewrite_slider(
            &mut doc.metadata,
            old_path.trim(),
            new_path.trim(),
            &self.layout.gallery_folder(gallery_name),
            gallery_name,
        );
        if count == 0 {
            debug!(old_path, "no slider entry matched");
            return Ok(0);
        }

        self.store_document(&path, &doc, MSG_SLIDER).await?;
        Ok(count)
    }

    /// Rewrite legacy album folders in a gallery index.
    pub async fn normalize_album_paths(&self, gallery: &GalleryName) -> Result<usize, ReconcileError> {
        let path = self.layout.gallery_index(gallery);
        let mut doc = self.load(&path).await?;
        let changed = entries::normalize_album_paths(&mut doc.metadata, gallery.as_str());
        if changed > 0 {
            self.store_document(&path, &doc, MSG_NORMALIZE).await?;
        }
        Ok(changed)
    }

    // =========================================================================
    // Read views
    // =========================================================================

    /// Galleries present under `images/`, normalized and sorted.
    pub async fn list_galleries(&self) -> Result<Vec<GalleryName>, ReconcileError> {
        let listing = self
            .store
            .list_directory(IMAGES_ROOT)
            .await
            .map_err(|source| ReconcileError::StoreRead {
                path: IMAGES_ROOT.to_string(),
                source,
            })?;

        let names: BTreeSet<GalleryName> = listing
            .into_iter()
            .filter(|entry| entry.is_dir())
            .filter(|entry| !RESERVED_FOLDERS.contains(&entry.name.as_str()))
            .filter_map(|entry| GalleryName::new(&entry.name).ok())
            .collect();
        Ok(names.into_iter().collect())
    }

    /// Image files of a gallery joined with their index entries.
    pub async fn gallery_images(
        &self,
        gallery: &GalleryName,
    ) -> Result<Vec<GalleryImage>, ReconcileError> {
        let dir = self.layout.album_dir(gallery);
        let listing = match self.store.list_directory(&dir).await {
            Ok(listing) => listing,
            Err(StoreError::NotFound(_)) => Vec::new(),
            Err(source) => return Err(ReconcileError::StoreRead { path: dir, source }),
        };

        let metadata = match self.load(&self.layout.gallery_index(gallery)).await {
            Ok(doc) => doc.metadata,
            Err(ReconcileError::StoreRead {
                source: StoreError::NotFound(_),
                ..
            }) => IndexMetadata::default(),
            Err(e) => return Err(e),
        };

        let images = listing
            .into_iter()
            .filter(|entry| entry.is_file() && has_image_extension(&entry.name))
            .filter_map(|entry| {
                let filename = ImageFilename::new(&entry.name).ok()?;
                let image_path = self.layout.image_site_path(gallery, &filename);
                let indexed = metadata.entries().find(|e| e.image_path == image_path);
                Some(GalleryImage {
                    caption: indexed
                        .and_then(|e| e.caption.clone())
                        .unwrap_or_else(|| entry.name.clone()),
                    copyright: indexed
                        .and_then(|e| e.copyright.clone())
                        .unwrap_or_else(|| self.default_copyright.clone()),
                    indexed: indexed.is_some(),
                    url: self.store.raw_url(&entry.path),
                    filename: entry.name,
                    image_path,
                })
            })
            .collect();
        Ok(images)
    }

    /// Entries of the homepage slider.
    pub async fn slider_images(&self) -> Result<Vec<SliderImage>, ReconcileError> {
        let doc = self.load(&self.layout.slider_index).await?;
        Ok(doc
            .metadata
            .entries()
            .map(|e| SliderImage {
                url: self.store.raw_url(&e.image_path),
                image_path: e.image_path.clone(),
                gallery_folder: e.gallery_folder.clone(),
                gallery_name: e.gallery_name.clone(),
            })
            .collect())
    }

    /// Current header image of a gallery.
    pub async fn header_image(&self, gallery: &GalleryName) -> Result<HeaderImage, ReconcileError> {
        let doc = self.load(&self.layout.gallery_index(gallery)).await?;
        let path = doc.metadata.header_img;
        let url = path.as_deref().and_then(|p| self.store.raw_url(p));
        Ok(HeaderImage { path, url })
    }
}
