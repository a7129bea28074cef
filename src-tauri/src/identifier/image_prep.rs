//! Image loading, resizing, and base64 encoding for the vision call.
//!
//! Photos are downscaled to a bounded long edge before transmission so
//! arbitrary camera uploads do not blow up request size.

use std::io::Cursor;

use base64::{engine::general_purpose::STANDARD, Engine};
use image::{DynamicImage, ImageFormat};
use tracing::info;

use crate::error::IdentifyError;

/// Maximum dimension (width or height) for images sent to the vision API.
pub const MAX_IMAGE_DIMENSION: u32 = 1024;

/// Minimum dimension for a usable identification; tiny thumbnails produce
/// unreliable answers.
pub const MIN_IMAGE_DIMENSION: u32 = 100;

/// Media type of the payload produced by [`prepare_image`].
pub fn image_media_type() -> &'static str {
    "image/jpeg"
}

/// Prepare raw image bytes for the vision API: decode, validate, resize,
/// re-encode as JPEG, base64-encode.
pub fn prepare_image(image_bytes: &[u8]) -> Result<String, IdentifyError> {
    let img = image::load_from_memory(image_bytes).map_err(|e| {
        IdentifyError::InvalidImage(format!(
            "failed to decode: {e}. Expected JPEG/PNG/WebP"
        ))
    })?;

    let (width, height) = (img.width(), img.height());
    info!("Loaded image: {}x{}", width, height);

    if width.min(height) < MIN_IMAGE_DIMENSION {
        return Err(IdentifyError::InvalidImage(format!(
            "image too small for reliable identification: {width}x{height}, minimum edge is {MIN_IMAGE_DIMENSION}px"
        )));
    }

    let resized = resize_if_needed(img, MAX_IMAGE_DIMENSION);
    let jpeg_bytes = encode_to_jpeg(&resized)?;
    info!(
        "Prepared image: {}x{}, {} JPEG bytes",
        resized.width(),
        resized.height(),
        jpeg_bytes.len()
    );

    Ok(STANDARD.encode(jpeg_bytes))
}

/// Downscale so neither edge exceeds `max_dimension`, keeping aspect ratio.
fn resize_if_needed(img: DynamicImage, max_dimension: u32) -> DynamicImage {
    let (width, height) = (img.width(), img.height());
    if width <= max_dimension && height <= max_dimension {
        return img;
    }
    let scale = max_dimension as f32 / width.max(height) as f32;
    let new_width = (width as f32 * scale) as u32;
    let new_height = (height as f32 * scale) as u32;
    img.resize(new_width, new_height, image::imageops::FilterType::Lanczos3)
}

fn encode_to_jpeg(img: &DynamicImage) -> Result<Vec<u8>, IdentifyError> {
    let mut buffer = Cursor::new(Vec::new());
    img.write_to(&mut buffer, ImageFormat::Jpeg)
        .map_err(|e| IdentifyError::InvalidImage(format!("failed to encode JPEG: {e}")))?;
    Ok(buffer.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::new_rgb8(width, height);
        let mut buffer = Cursor::new(Vec::new());
        img.write_to(&mut buffer, ImageFormat::Png).unwrap();
        buffer.into_inner()
    }

    #[test]
    fn test_prepare_image_rejects_undecodable() {
        let err = prepare_image(b"definitely not an image").unwrap_err();
        assert!(err.to_string().contains("failed to decode"));
    }

    #[test]
    fn test_prepare_image_rejects_too_small() {
        let err = prepare_image(&png_bytes(50, 50)).unwrap_err();
        assert!(err.to_string().contains("too small"));
    }

    #[test]
    fn test_prepare_image_produces_base64_jpeg() {
        let base64_str = prepare_image(&png_bytes(300, 200)).unwrap();
        let jpeg = STANDARD.decode(base64_str).unwrap();
        assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_resize_if_needed_keeps_small_images() {
        let resized = resize_if_needed(DynamicImage::new_rgb8(640, 480), 1024);
        assert_eq!((resized.width(), resized.height()), (640, 480));
    }

    #[test]
    fn test_resize_if_needed_bounds_wide_image() {
        let resized = resize_if_needed(DynamicImage::new_rgb8(2048, 1024), 1024);
        assert_eq!((resized.width(), resized.height()), (1024, 512));
    }

    #[test]
    fn test_resize_if_needed_bounds_tall_image() {
        let resized = resize_if_needed(DynamicImage::new_rgb8(1000, 4000), 1024);
        assert_eq!((resized.width(), resized.height()), (256, 1024));
    }

    #[test]
    fn test_image_media_type() {
        assert_eq!(image_media_type(), "image/jpeg");
    }
}
