//! Vertical flip of JPEG uploads.

use image::{DynamicImage, ImageFormat};

use super::codec::{decode_as, encode_jpeg, JPEG_CONTENT_TYPE};
use super::{Processed, Transform, TransformError};
use crate::config::FlipConfig;

/// Decode JPEG, mirror top-to-bottom, re-encode JPEG.
#[derive(Debug, Clone)]
pub struct VerticalFlip {
    quality: u8,
}

impl VerticalFlip {
    pub fn new(config: &FlipConfig) -> Self {
        Self {
            quality: config.quality,
        }
    }
}

/// Reverse row order. Pixel values are untouched.
pub fn flip_rows(image: &DynamicImage) -> DynamicImage {
    image.flipv()
}

impl Transform for VerticalFlip {
    fn name(&self) -> &'static str {
        "flip"
    }

    fn apply(&self, input: &[u8]) -> Result<Processed, TransformError> {
        let decoded = decode_as(input, ImageFormat::Jpeg)?;
        let flipped = flip_rows(&decoded);

        Ok(Processed {
            bytes: encode_jpeg(&flipped, self.quality)?,
            content_type: JPEG_CONTENT_TYPE,
        })
    }
}
