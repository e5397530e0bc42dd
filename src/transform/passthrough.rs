//! Header prepend with no image interpretation.

use super::codec::OCTET_STREAM_CONTENT_TYPE;
use super::{Processed, Transform, TransformError};

/// Returns `header ++ input` for every upload.
#[derive(Debug, Clone)]
pub struct Passthrough {
    header: Vec<u8>,
}

impl Passthrough {
    pub fn new(header: &[u8]) -> Self {
        Self {
            header: header.to_vec(),
        }
    }
}

/// Concatenate the literal header and the input.
pub fn prepend_header(header: &[u8], input: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(header.len() + input.len());
    out.extend_from_slice(header);
    out.extend_from_slice(input);
    out
}

impl Transform for Passthrough {
    fn name(&self) -> &'static str {
        "passthrough"
    }

    fn apply(&self, input: &[u8]) -> Result<Processed, TransformError> {
        Ok(Processed {
            bytes: prepend_header(&self.header, input),
            content_type: OCTET_STREAM_CONTENT_TYPE,
        })
    }
}
