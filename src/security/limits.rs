//! Upload size ceiling.
//!
//! # Responsibilities
//! - Decide whether an upload of a given size is acceptable
//! - Size the framework body limit so the handler, not the framework,
//!   rejects oversize uploads
//! - Render the ceiling for client-facing error messages
//!
//! # Design Decisions
//! - Checked while streaming the field, so reading stops at the first byte
//!   past the ceiling and the transform never sees an oversize upload

/// Extra body bytes allowed on top of the ceiling for multipart framing
/// (boundaries, part headers, other small fields).
pub const MULTIPART_SLACK: usize = 64 * 1024;

const KIB: u64 = 1024;
const MIB: u64 = 1024 * KIB;

/// Maximum accepted upload size, or none.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadLimit {
    max_bytes: Option<u64>,
}

impl UploadLimit {
    pub fn new(max_bytes: Option<u64>) -> Self {
        Self { max_bytes }
    }

    /// True when `size` bytes would exceed the ceiling.
    pub fn is_exceeded_by(&self, size: u64) -> bool {
        self.max_bytes.is_some_and(|max| size > max)
    }

    /// Request body limit to hand to the framework.
    pub fn body_limit(&self) -> Option<usize> {
        self.max_bytes
            .map(|max| usize::try_from(max).unwrap_or(usize::MAX).saturating_add(MULTIPART_SLACK))
    }

    /// Human-readable ceiling, e.g. "10MB".
    pub fn describe(&self) -> String {
        match self.max_bytes {
            Some(max) => format_size(max),
            None => "unlimited".to_string(),
        }
    }
}

fn format_size(bytes: u64) -> String {
    if bytes >= MIB && bytes % MIB == 0 {
        format!("{}MB", bytes / MIB)
    } else if bytes >= KIB && bytes % KIB == 0 {
        format!("{}KB", bytes / KIB)
    } else {
        format!("{bytes} bytes")
    }
}
