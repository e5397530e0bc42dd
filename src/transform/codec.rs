//! Decode/encode helpers over the `image` crate.

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat};

use super::TransformError;

pub const JPEG_CONTENT_TYPE: &str = "image/jpeg";
pub const OCTET_STREAM_CONTENT_TYPE: &str = "application/octet-stream";

/// Decode bytes that must be in `format`.
pub fn decode_as(bytes: &[u8], format: ImageFormat) -> Result<DynamicImage, TransformError> {
    image::load_from_memory_with_format(bytes, format).map_err(TransformError::Decode)
}

/// Decode bytes in any supported raster format, guessed from the content.
pub fn decode_any(bytes: &[u8]) -> Result<DynamicImage, TransformError> {
    image::load_from_memory(bytes).map_err(TransformError::Decode)
}

/// Encode as baseline JPEG.
///
/// JPEG carries no alpha and only 8-bit samples, so anything other than
/// 8-bit gray or RGB is converted to RGB first. Source metadata is never
/// copied into the output.
pub fn encode_jpeg(image: &DynamicImage, quality: u8) -> Result<Vec<u8>, TransformError> {
    let mut buf = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut buf, quality);

    match image {
        DynamicImage::ImageLuma8(_) | DynamicImage::ImageRgb8(_) => image.write_with_encoder(encoder),
        other => DynamicImage::ImageRgb8(other.to_rgb8()).write_with_encoder(encoder),
    }
    .map_err(TransformError::Encode)?;

    Ok(buf)
}
