//! core::naming
//!
//! Album naming rules.
//!
//! # Features
//!
//! - Turn an operator-typed album name into a folder slug
//! - Titlecase a slug for display in front matter

/// Normalize an album name into a folder slug.
///
/// - Trims surrounding whitespace
/// - Lowercases
/// - Collapses each run of internal whitespace into a single hyphen
///
/// Other characters are kept as typed; validation of the result is left
/// to [`GalleryName`](crate::core::types::GalleryName).
///
/// # Example
///
/// ```
/// use gallerist::core::naming::album_slug;
///
/// assert_eq!(album_slug("  Summer   Trip "), "summer-trip");
/// assert_eq!(album_slug("Beach"), "beach");
/// ```
pub fn album_slug(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

/// Uppercase the first character, leaving the rest untouched.
///
/// ```
/// use gallerist::core::naming::titlecase;
///
/// assert_eq!(titlecase("beach"), "Beach");
/// assert_eq!(titlecase(""), "");
/// ```
pub fn titlecase(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
