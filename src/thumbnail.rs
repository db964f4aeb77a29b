//! thumbnail
//!
//! Thumbnail generation capability.
//!
//! # Design
//!
//! Callers depend on the [`ThumbnailGenerator`] trait, never on a codec.
//! [`ImageThumbnailer`] is the default implementation on top of the `image`
//! crate: it sniffs the format from the bytes, fits the picture inside a
//! `max_dim × max_dim` box (aspect ratio kept, never upscaled), and
//! re-encodes in the source format.
//!
//! # Example
//!
//! ```ignore
//! use gallerist::thumbnail::{ImageThumbnailer, ThumbnailGenerator};
//!
//! let thumb = ImageThumbnailer::new().resize(&original, 400)?;
//! ```

use std::io::Cursor;

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageFormat};
use thiserror::Error;
use tracing::debug;

/// Errors from thumbnail generation.
#[derive(Debug, Error)]
pub enum ThumbnailError {
    #[error("max dimension must be positive")]
    ZeroDimension,

    #[error("unrecognized image format")]
    UnknownFormat,

    #[error("failed to decode image: {0}")]
    Decode(String),

    #[error("failed to encode thumbnail: {0}")]
    Encode(String),
}

/// Produces a downscaled copy of an encoded image.
pub trait ThumbnailGenerator: Send + Sync {
    /// Fit `bytes` within `max_dim × max_dim`, keeping the source format.
    fn resize(&self, bytes: &[u8], max_dim: u32) -> Result<Vec<u8>, ThumbnailError>;
}

/// Default thumbnailer backed by the `image` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageThumbnailer;

impl ImageThumbnailer {
    pub fn new() -> Self {
        Self
    }
}

impl ThumbnailGenerator for ImageThumbnailer {
    fn resize(&self, bytes: &[u8], max_dim: u32) -> Result<Vec<u8>, ThumbnailError> {
        if max_dim == 0 {
            return Err(ThumbnailError::ZeroDimension);
        }

        let format = image::guess_format(bytes).map_err(|_| ThumbnailError::UnknownFormat)?;
        let img = image::load_from_memory_with_format(bytes, format)
            .map_err(|e| ThumbnailError::Decode(e.to_string()))?;

        let (width, height) = img.dimensions();
        let img = if width > max_dim || height > max_dim {
            img.resize(max_dim, max_dim, FilterType::Lanczos3)
        } else {
            img
        };
        debug!(
            ?format,
            from = %format!("{}x{}", width, height),
            to = %format!("{}x{}", img.width(), img.height()),
            "generated thumbnail"
        );

        encode(img, format)
    }
}

fn encode(img: DynamicImage, format: ImageFormat) -> Result<Vec<u8>, ThumbnailError> {
    // JPEG has no alpha channel.
    let img = if format == ImageFormat::Jpeg && img.color().has_alpha() {
        DynamicImage::ImageRgb8(img.to_rgb8())
    } else {
        img
    };

    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, format)
        .map_err(|e| ThumbnailError::Encode(e.to_string()))?;
    Ok(out.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageEncoder, RgbImage, RgbaImage};

    fn jpeg(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
        });
        let mut out = Vec::new();
        image::codecs::jpeg::JpegEncoder::new(&mut out)
            .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
            .unwrap();
        out
    }

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_fn(width, height, |x, _| image::Rgba([x as u8, 0, 0, 200]));
        let mut out = Vec::new();
        image::codecs::png::PngEncoder::new(&mut out)
            .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgba8)
            .unwrap();
        out
    }

    fn dims(bytes: &[u8]) -> (u32, u32) {
        image::load_from_memory(bytes).unwrap().dimensions()
    }

    #[test]
    fn landscape_fits_width() {
        let thumb = ImageThumbnailer::new().resize(&jpeg(800, 400), 200).unwrap();
        assert_eq!(image::guess_format(&thumb).unwrap(), ImageFormat::Jpeg);
        assert_eq!(dims(&thumb), (200, 100));
    }

    #[test]
    fn portrait_fits_height() {
        let thumb = ImageThumbnailer::new().resize(&png(100, 300), 150).unwrap();
        assert_eq!(image::guess_format(&thumb).unwrap(), ImageFormat::Png);
        assert_eq!(dims(&thumb), (50, 150));
    }

    #[test]
    fn small_images_are_not_upscaled() {
        let thumb = ImageThumbnailer::new().resize(&jpeg(64, 48), 400).unwrap();
        assert_eq!(dims(&thumb), (64, 48));
    }

    #[test]
    fn garbage_is_rejected() {
        let result = ImageThumbnailer::new().resize(b"definitely not an image", 100);
        assert!(matches!(result, Err(ThumbnailError::UnknownFormat)));
    }

    #[test]
    fn truncated_image_fails_to_decode() {
        let mut bytes = jpeg(32, 32);
        bytes.truncate(40);
        let result = ImageThumbnailer::new().resize(&bytes, 16);
        assert!(matches!(result, Err(ThumbnailError::Decode(_))));
    }

    #[test]
    fn zero_dimension_is_rejected() {
        let result = ImageThumbnailer::new().resize(&jpeg(8, 8), 0);
        assert!(matches!(result, Err(ThumbnailError::ZeroDimension)));
    }
}
