//! Upload transforms.
//!
//! # Data Flow
//! ```text
//! raw upload bytes
//!     → [passthrough.rs] header ++ bytes
//!     → [flip.rs]        decode JPEG → mirror rows → encode JPEG
//!     → [thumbnail.rs]   decode → smartcrop.rs fill-crop → encode JPEG
//!     → Processed { bytes, content_type }
//! ```
//!
//! # Design Decisions
//! - Exactly one transform per deployment, chosen from config at startup
//! - Transforms are pure and synchronous; callers move them off the async runtime
//! - Content type comes from the encoder actually used, never from the request

pub mod codec;
pub mod flip;
pub mod passthrough;
pub mod smartcrop;
pub mod thumbnail;

use std::sync::Arc;

use crate::config::{TransformConfig, TransformVariant};

pub use flip::VerticalFlip;
pub use passthrough::Passthrough;
pub use thumbnail::Thumbnail;

/// Output of a successful transform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Processed {
    /// Encoded output.
    pub bytes: Vec<u8>,
    /// MIME type of `bytes`.
    pub content_type: &'static str,
}

/// Failure inside a transform.
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    #[error("failed to decode image bytes: {0}")]
    Decode(#[source] image::ImageError),

    #[error("failed to encode image: {0}")]
    Encode(#[source] image::ImageError),
}

/// A stateless byte-to-byte operation applied to every upload.
pub trait Transform: Send + Sync {
    /// Short name used in logs and metrics.
    fn name(&self) -> &'static str;

    /// Transform one upload.
    fn apply(&self, input: &[u8]) -> Result<Processed, TransformError>;
}

/// Build the transform selected by the configuration.
pub fn build_transform(config: &TransformConfig) -> Arc<dyn Transform> {
    match config.variant {
        TransformVariant::Flip => Arc::new(VerticalFlip::new(&config.flip)),
        TransformVariant::Thumbnail => {
            Arc::new(Thumbnail::new(&config.thumbnail, config.header.as_bytes()))
        }
        TransformVariant::Passthrough => Arc::new(Passthrough::new(config.header.as_bytes())),
    }
}
