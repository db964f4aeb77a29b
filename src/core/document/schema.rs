//! core::document::schema
//!
//! Typed front matter for gallery index, slider, and registry documents.
//!
//! # Fields
//!
//! Every recognized field is optional. Absent fields are not emitted on
//! serialization, and anything the schema does not name is kept in an
//! `extra` mapping so operator-added keys survive a rewrite.
//!
//! Scalar fields are decoded leniently: `title: 2024` reads as the string
//! `"2024"`. A mapping or sequence where a scalar is expected is an error.
//!
//! # Key Order
//!
//! Serialization order follows declaration order, then extra keys in the
//! order they were read:
//!
//! - document: `layout`, `title`, `description`, `active`, `header-img`,
//!   `album-title`, `images`
//! - entry: `image_path`, `caption`, `copyright`, `gallery-folder`,
//!   `gallery-name`

use serde::{Deserialize, Serialize};
use serde_yaml::Mapping;

/// Metadata block of an index document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexMetadata {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "scalar::optional"
    )]
    pub layout: Option<String>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "scalar::optional"
    )]
    pub title: Option<String>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "scalar::optional"
    )]
    pub description: Option<String>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "scalar::optional"
    )]
    pub active: Option<String>,

    /// Site path of the gallery header image.
    #[serde(
        rename = "header-img",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "scalar::optional"
    )]
    pub header_img: Option<String>,

    #[serde(
        rename = "album-title",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "scalar::optional"
    )]
    pub album_title: Option<String>,

    /// Ordered image list. `None` when the key is absent or null.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<ImageEntry>>,

    /// Unrecognized keys, preserved verbatim.
    #[serde(flatten)]
    pub extra: Mapping,
}

impl IndexMetadata {
    /// Number of entries in the image list (zero when absent).
    pub fn image_count(&self) -> usize {
        self.images.as_ref().map_or(0, Vec::len)
    }

    /// Iterate over image entries (empty when absent).
    pub fn entries(&self) -> impl Iterator<Item = &ImageEntry> {
        self.images.iter().flatten()
    }
}

/// One element of an `images` list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageEntry {
    /// Absolute site path; the identity key within a list.
    #[serde(deserialize_with = "scalar::required")]
    pub image_path: String,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "scalar::optional"
    )]
    pub caption: Option<String>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "scalar::optional"
    )]
    pub copyright: Option<String>,

    /// Slider and registry entries only.
    #[serde(
        rename = "gallery-folder",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "scalar::optional"
    )]
    pub gallery_folder: Option<String>,

    /// Slider and registry entries only.
    #[serde(
        rename = "gallery-name",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "scalar::optional"
    )]
    pub gallery_name: Option<String>,

    #[serde(flatten)]
    pub extra: Mapping,
}

impl ImageEntry {
    /// Create a gallery entry with caption and copyright.
    pub fn gallery(
        image_path: impl Into<String>,
        caption: impl Into<String>,
        copyright: impl Into<String>,
    ) -> Self {
        Self {
            image_path: image_path.into(),
            caption: Some(caption.into()),
            copyright: Some(copyright.into()),
            ..Default::default()
        }
    }

    /// Create a slider or registry entry.
    pub fn slider(
        image_path: impl Into<String>,
        gallery_folder: impl Into<String>,
        gallery_name: impl Into<String>,
    ) -> Self {
        Self {
            image_path: image_path.into(),
            gallery_folder: Some(gallery_folder.into()),
            gallery_name: Some(gallery_name.into()),
            ..Default::default()
        }
    }

    /// Last path segment of `image_path`.
    pub fn filename(&self) -> &str {
        self.image_path
            .rsplit('/')
            .next()
            .unwrap_or(self.image_path.as_str())
    }
}

/// Lenient scalar decoding shared by all string fields.
mod scalar {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer};
    use serde_yaml::Value;

    pub fn optional<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<Value>::deserialize(deserializer)? {
            None | Some(Value::Null) => Ok(None),
            Some(value) => to_text(value).map(Some).map_err(D::Error::custom),
        }
    }

    pub fn required<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::Null => Err(D::Error::custom("expected a value, found null")),
            value => to_text(value).map_err(D::Error::custom),
        }
    }

    fn to_text(value: Value) -> Result<String, String> {
        match value {
            Value::String(s) => Ok(s),
            Value::Number(n) => Ok(n.to_string()),
            Value::Bool(b) => Ok(b.to_string()),
            Value::Sequence(_) => Err("expected a scalar, found a sequence".into()),
            Value::Mapping(_) => Err("expected a scalar, found a mapping".into()),
            Value::Null => Err("expected a scalar, found null".into()),
            Value::Tagged(_) => Err("expected a scalar, found a tagged value".into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(yaml: &str) -> Result<IndexMetadata, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    #[test]
    fn decodes_known_fields() {
        let meta = decode(
            "layout: page\ntitle: Beach\nheader-img: /images/albums/beach/header.jpg\nimages:\n- image_path: /images/albums/beach/a.jpg\n  caption: A\n  copyright: © Me\n",
        )
        .unwrap();

        assert_eq!(meta.layout.as_deref(), Some("page"));
        assert_eq!(meta.title.as_deref(), Some("Beach"));
        assert_eq!(
            meta.header_img.as_deref(),
            Some("/images/albums/beach/header.jpg")
        );
        assert_eq!(meta.image_count(), 1);
        let entry = meta.entries().next().unwrap();
        assert_eq!(entry.filename(), "a.jpg");
        assert_eq!(entry.copyright.as_deref(), Some("© Me"));
        assert!(meta.extra.is_empty());
    }

    #[test]
    fn keeps_unknown_fields() {
        let meta = decode("title: X\npermalink: /x/\nimages:\n- image_path: /a.jpg\n  width: 300\n").unwrap();
        assert_eq!(
            meta.extra.get("permalink"),
            Some(&serde_yaml::Value::from("/x/"))
        );
        let entry = meta.entries().next().unwrap();
        assert_eq!(entry.extra.get("width"), Some(&serde_yaml::Value::from(300)));
    }

    #[test]
    fn scalars_are_read_as_text() {
        let meta = decode("title: 2024\nactive: true\n").unwrap();
        assert_eq!(meta.title.as_deref(), Some("2024"));
        assert_eq!(meta.active.as_deref(), Some("true"));
    }

    #[test]
    fn null_fields_are_absent() {
        let meta = decode("title:\nimages:\n").unwrap();
        assert!(meta.title.is_none());
        assert!(meta.images.is_none());
    }

    #[test]
    fn nested_value_in_scalar_field_is_rejected() {
        assert!(decode("title:\n  nested: true\n").is_err());
        assert!(decode("images:\n- image_path: [a, b]\n").is_err());
    }

    #[test]
    fn entry_requires_image_path() {
        assert!(decode("images:\n- caption: orphan\n").is_err());
    }

    #[test]
    fn serializes_in_declared_order() {
        let mut meta = IndexMetadata {
            title: Some("Beach".into()),
            layout: Some("page".into()),
            images: Some(vec![ImageEntry::gallery("/a.jpg", "A", "© Me")]),
            ..Default::default()
        };
        meta.extra
            .insert(serde_yaml::Value::from("permalink"), serde_yaml::Value::from("/b/"));

        let yaml = serde_yaml::to_string(&meta).unwrap();
        let layout = yaml.find("layout:").unwrap();
        let title = yaml.find("title:").unwrap();
        let images = yaml.find("images:").unwrap();
        let extra = yaml.find("permalink:").unwrap();
        assert!(layout < title && title < images && images < extra);

        let path = yaml.find("image_path:").unwrap();
        let caption = yaml.find("caption:").unwrap();
        let copyright = yaml.find("copyright:").unwrap();
        assert!(path < caption && caption < copyright);
        assert!(!yaml.contains("description"));
    }

    #[test]
    fn slider_entry_order() {
        let entry = ImageEntry::slider("/a.jpg", "/images/street/", "Street");
        let yaml = serde_yaml::to_string(&entry).unwrap();
        let folder = yaml.find("gallery-folder:").unwrap();
        let name = yaml.find("gallery-name:").unwrap();
        assert!(yaml.starts_with("image_path:"));
        assert!(folder < name);
    }
}
