//! Fixed-size thumbnails.

use super::codec::{decode_any, encode_jpeg, JPEG_CONTENT_TYPE};
use super::passthrough::prepend_header;
use super::smartcrop::fill_crop;
use super::{Processed, Transform, TransformError};
use crate::config::ThumbnailConfig;

/// Decode, fill-crop to `width` x `height`, re-encode as JPEG.
#[derive(Debug, Clone)]
pub struct Thumbnail {
    width: u32,
    height: u32,
    quality: u8,
    /// Placeholder header prepended before decoding, when configured.
    header: Option<Vec<u8>>,
}

impl Thumbnail {
    pub fn new(config: &ThumbnailConfig, header: &[u8]) -> Self {
        Self {
            width: config.width,
            height: config.height,
            quality: config.quality,
            header: config.prepend_header.then(|| header.to_vec()),
        }
    }
}

impl Transform for Thumbnail {
    fn name(&self) -> &'static str {
        "thumbnail"
    }

    fn apply(&self, input: &[u8]) -> Result<Processed, TransformError> {
        let decoded = match &self.header {
            Some(header) => decode_any(&prepend_header(header, input))?,
            None => decode_any(input)?,
        };

        let thumb = fill_crop(&decoded, self.width, self.height);

        Ok(Processed {
            bytes: encode_jpeg(&thumb, self.quality)?,
            content_type: JPEG_CONTENT_TYPE,
        })
    }
}
