//! gallery::entries
//!
//! Pure edits of index metadata. Nothing here reads or writes a store.

use crate::core::document::{IndexMetadata, ImageEntry};

/// `layout` of every gallery page.
pub const PAGE_LAYOUT: &str = "page";

/// `active` navigation marker of every gallery page.
pub const ACTIVE_GALLERY: &str = "gallery";

/// `album-title` of every gallery page.
pub const ALBUM_TITLE: &str = "🎞️";

/// Album folder names that predate per-gallery folders.
pub const LEGACY_ALBUM_SEGMENTS: &[&str] = &["landscape", "landscapes", "portrait", "portraits"];

/// Default description for a gallery with the given title.
pub fn default_description(title: &str) -> String {
    format!("{} gallery", title)
}

/// Metadata for a brand-new gallery.
pub fn skeleton(title: &str, description: Option<&str>, header_img: &str) -> IndexMetadata {
    let description = description
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(String::from)
        .unwrap_or_else(|| default_description(title));

    IndexMetadata {
        layout: Some(PAGE_LAYOUT.to_string()),
        title: Some(title.to_string()),
        description: Some(description),
        active: Some(ACTIVE_GALLERY.to_string()),
        header_img: Some(header_img.to_string()),
        album_title: Some(ALBUM_TITLE.to_string()),
        images: Some(Vec::new()),
        ..Default::default()
    }
}

/// Initialize a document that has no image list yet.
///
/// Fills only the fields that are absent. Returns `false` (and changes
/// nothing) when `images` is already present.
pub fn ensure_skeleton(meta: &mut IndexMetadata, title: &str, header_img: &str) -> bool {
    if meta.images.is_some() {
        return false;
    }

    let defaults = skeleton(title, None, header_img);
    meta.layout.get_or_insert_with(|| defaults.layout.unwrap_or_default());
    meta.title.get_or_insert_with(|| defaults.title.unwrap_or_default());
    meta.description
        .get_or_insert_with(|| defaults.description.unwrap_or_default());
    meta.active.get_or_insert_with(|| defaults.active.unwrap_or_default());
    meta.header_img
        .get_or_insert_with(|| defaults.header_img.unwrap_or_default());
    meta.album_title
        .get_or_insert_with(|| defaults.album_title.unwrap_or_default());
    meta.images = Some(Vec::new());
    true
}

/// Trimmed caption, or the filename when blank.
pub fn caption_or_default(caption: Option<&str>, filename: &str) -> String {
    caption
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or(filename)
        .to_string()
}

/// `"© " + trimmed` copyright, or the default when blank.
///
/// Input that already starts with `©` is kept as is.
pub fn copyright_or_default(copyright: Option<&str>, default: &str) -> String {
    match copyright.map(str::trim).filter(|c| !c.is_empty()) {
        Some(c) if c.starts_with('©') => c.to_string(),
        Some(c) => format!("© {}", c),
        None => default.to_string(),
    }
}

/// Insert an entry, or replace the caption and copyright of the entry
/// with the same `image_path`. Returns `true` when a new entry was appended.
pub fn upsert_entry(meta: &mut IndexMetadata, entry: ImageEntry) -> bool {
    let images = meta.images.get_or_insert_with(Vec::new);
    match images.iter_mut().find(|e| e.image_path == entry.image_path) {
        Some(existing) => {
            existing.caption = entry.caption;
            existing.copyright = entry.copyright;
            false
        }
        None => {
            images.push(entry);
            true
        }
    }
}

/// Remove every entry whose `image_path` equals `image_path` exactly.
///
/// Returns the number removed.
pub fn remove_entries(meta: &mut IndexMetadata, image_path: &str) -> usize {
    let Some(images) = meta.images.as_mut() else {
        return 0;
    };
    let before = images.len();
    images.retain(|e| e.image_path != image_path);
    before - images.len()
}

/// Point every slider entry at `old_path` to `new_path` and its gallery.
///
/// Returns the number of rewritten entries.
pub fn rewrite_slider(
    meta: &mut IndexMetadata,
    old_path: &str,
    new_path: &str,
    gallery_folder: &str,
    gallery_name: &str,
) -> usize {
    let Some(images) = meta.images.as_mut() else {
        return 0;
    };
    let mut count = 0;
    for entry in images.iter_mut().filter(|e| e.image_path == old_path) {
        entry.image_path = new_path.to_string();
        entry.gallery_folder = Some(gallery_folder.to_string());
        entry.gallery_name = Some(gallery_name.to_string());
        count += 1;
    }
    count
}

/// Whether a registry already lists a gallery (display name, case-insensitive).
pub fn registry_contains(meta: &IndexMetadata, gallery_name: &str) -> bool {
    let wanted = gallery_name.trim().to_lowercase();
    meta.entries().any(|e| {
        e.gallery_name
            .as_deref()
            .is_some_and(|name| name.trim().to_lowercase() == wanted)
    })
}

/// Rewrite legacy `/albums/<segment>/` folders to `/albums/<gallery>/`.
///
/// Applies to every `image_path` and to `header-img`. Returns the number
/// of values changed.
pub fn normalize_album_paths(meta: &mut IndexMetadata, gallery: &str) -> usize {
    let mut changed = 0;
    if let Some(header) = meta.header_img.as_mut() {
        changed += usize::from(rewrite_album_segment(header, gallery));
    }
    if let Some(images) = meta.images.as_mut() {
        for entry in images.iter_mut() {
            changed += usize::from(rewrite_album_segment(&mut entry.image_path, gallery));
        }
    }
    changed
}

fn rewrite_album_segment(path: &mut String, gallery: &str) -> bool {
    let target = format!("/albums/{}/", gallery);
    let mut rewritten = path.clone();
    for segment in LEGACY_ALBUM_SEGMENTS {
        let legacy = format!("/albums/{}/", segment);
        if legacy != target {
            rewritten = rewritten.replace(&legacy, &target);
        }
    }
    if rewritten == *path {
        false
    } else {
        *path = rewritten;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gallery_meta(paths: &[&str]) -> IndexMetadata {
        IndexMetadata {
            images: Some(
                paths
                    .iter()
                    .map(|p| ImageEntry::gallery(*p, "c", "© x"))
                    .collect(),
            ),
            ..Default::default()
        }
    }

    mod skeleton {
        use super::*;

        #[test]
        fn fills_everything_for_new_gallery() {
            let meta = skeleton("Beach", None, "/images/albums/beach/header.jpg");
            assert_eq!(meta.layout.as_deref(), Some("page"));
            assert_eq!(meta.description.as_deref(), Some("Beach gallery"));
            assert_eq!(meta.active.as_deref(), Some("gallery"));
            assert_eq!(meta.album_title.as_deref(), Some("🎞️"));
            assert_eq!(meta.images, Some(vec![]));
        }

        #[test]
        fn blank_description_uses_default() {
            let meta = skeleton("Beach", Some("   "), "/h.jpg");
            assert_eq!(meta.description.as_deref(), Some("Beach gallery"));
            let meta = skeleton("Beach", Some(" Sand "), "/h.jpg");
            assert_eq!(meta.description.as_deref(), Some("Sand"));
        }

        #[test]
        fn ensure_keeps_present_fields() {
            let mut meta = IndexMetadata {
                title: Some("Custom".into()),
                ..Default::default()
            };
            assert!(ensure_skeleton(&mut meta, "Beach", "/h.jpg"));
            assert_eq!(meta.title.as_deref(), Some("Custom"));
            assert_eq!(meta.description.as_deref(), Some("Beach gallery"));
            assert_eq!(meta.header_img.as_deref(), Some("/h.jpg"));
            assert_eq!(meta.images, Some(vec![]));
        }

        #[test]
        fn ensure_is_noop_with_images() {
            let mut meta = gallery_meta(&[]);
            assert!(!ensure_skeleton(&mut meta, "Beach", "/h.jpg"));
            assert!(meta.title.is_none());
        }
    }

    mod defaults {
        use super::*;

        #[test]
        fn caption() {
            assert_eq!(caption_or_default(Some("  Dunes "), "a.jpg"), "Dunes");
            assert_eq!(caption_or_default(Some("   "), "a.jpg"), "a.jpg");
            assert_eq!(caption_or_default(None, "a.jpg"), "a.jpg");
        }

        #[test]
        fn copyright() {
            assert_eq!(copyright_or_default(Some(" Ann "), "© Brik"), "© Ann");
            assert_eq!(copyright_or_default(Some(""), "© Brik"), "© Brik");
            assert_eq!(copyright_or_default(None, "© Brik"), "© Brik");
            assert_eq!(copyright_or_default(Some("© Ann"), "© Brik"), "© Ann");
        }
    }

    mod edits {
        use super::*;

        #[test]
        fn upsert_appends_then_updates() {
            let mut meta = IndexMetadata::default();
            assert!(upsert_entry(&mut meta, ImageEntry::gallery("/a.jpg", "A", "© 1")));
            assert!(!upsert_entry(&mut meta, ImageEntry::gallery("/a.jpg", "B", "© 2")));

            assert_eq!(meta.image_count(), 1);
            let entry = meta.entries().next().unwrap();
            assert_eq!(entry.caption.as_deref(), Some("B"));
        }

        #[test]
        fn removal_is_exact() {
            let mut meta = gallery_meta(&["/images/albums/x/a.jpg", "/images/albums/x/ab.jpg"]);
            assert_eq!(remove_entries(&mut meta, "/images/albums/x/a.jpg"), 1);
            assert_eq!(meta.entries().next().unwrap().filename(), "ab.jpg");
        }

        #[test]
        fn removal_counts_duplicates_and_absence() {
            let mut meta = gallery_meta(&["/a.jpg", "/a.jpg", "/b.jpg"]);
            assert_eq!(remove_entries(&mut meta, "/a.jpg"), 2);
            assert_eq!(remove_entries(&mut meta, "/a.jpg"), 0);
            assert_eq!(remove_entries(&mut IndexMetadata::default(), "/a.jpg"), 0);
        }

        #[test]
        fn slider_rewrite() {
            let mut meta = IndexMetadata {
                images: Some(vec![
                    ImageEntry::slider("/old.jpg", "/images/a/", "A"),
                    ImageEntry::slider("/keep.jpg", "/images/a/", "A"),
                ]),
                ..Default::default()
            };
            let n = rewrite_slider(&mut meta, "/old.jpg", "/new.jpg", "/images/street/", "Street");
            assert_eq!(n, 1);

            let first = meta.entries().next().unwrap();
            assert_eq!(first.image_path, "/new.jpg");
            assert_eq!(first.gallery_folder.as_deref(), Some("/images/street/"));
            assert_eq!(first.gallery_name.as_deref(), Some("Street"));
            assert_eq!(rewrite_slider(&mut meta, "/missing.jpg", "/x", "/f/", "F"), 0);
        }

        #[test]
        fn registry_lookup_ignores_case() {
            let meta = IndexMetadata {
                images: Some(vec![ImageEntry::slider("/h.jpg", "/images/beach/", "Beach")]),
                ..Default::default()
            };
            assert!(registry_contains(&meta, "beach"));
            assert!(registry_contains(&meta, " BEACH "));
            assert!(!registry_contains(&meta, "street"));
        }
    }

    mod album_paths {
        use super::*;

        #[test]
        fn rewrites_legacy_segments() {
            let mut meta = gallery_meta(&[
                "/images/albums/landscapes/a.jpg",
                "/images/albums/portrait/b.jpg",
                "/images/albums/landscape/c.jpg",
            ]);
            meta.header_img = Some("/images/albums/portraits/header.jpg".into());

            assert_eq!(normalize_album_paths(&mut meta, "landscape"), 3);
            let paths: Vec<_> = meta.entries().map(|e| e.image_path.as_str()).collect();
            assert_eq!(
                paths,
                vec![
                    "/images/albums/landscape/a.jpg",
                    "/images/albums/landscape/b.jpg",
                    "/images/albums/landscape/c.jpg",
                ]
            );
            assert_eq!(
                meta.header_img.as_deref(),
                Some("/images/albums/landscape/header.jpg")
            );
        }

        #[test]
        fn other_galleries_untouched() {
            let mut meta = gallery_meta(&["/images/albums/beach/a.jpg"]);
            assert_eq!(normalize_album_paths(&mut meta, "beach"), 0);
        }
    }
}
