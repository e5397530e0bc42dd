//! Multipart upload extraction.
//!
//! # Responsibilities
//! - Find the configured file field in a `multipart/form-data` body
//! - Stream it into memory, enforcing the ceiling chunk by chunk
//! - Classify failures as missing input, oversize, or read errors

use axum::extract::multipart::{Field, MultipartError, MultipartRejection};
use axum::extract::Multipart;
use axum::http::StatusCode;

use crate::http::error::ApiError;
use crate::security::UploadLimit;

/// A file received in one request. Dropped once the response is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    /// Client-declared filename, echoed in the attachment name.
    pub filename: String,
    /// File contents.
    pub bytes: Vec<u8>,
}

impl UploadRequest {
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Extract the file part named `field_name`.
///
/// Parts with another name, or without a filename, are skipped. A body that
/// is not multipart at all counts as a missing file.
pub async fn read_upload(
    multipart: Result<Multipart, MultipartRejection>,
    field_name: &str,
    limit: &UploadLimit,
) -> Result<UploadRequest, ApiError> {
    let mut multipart = multipart.map_err(|rejection| {
        tracing::debug!(reason = %rejection, "Request is not a multipart upload");
        ApiError::MissingFile
    })?;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return Err(ApiError::MissingFile),
            Err(e) if is_length_limit(&e) => return Err(too_large(limit)),
            Err(e) => {
                tracing::debug!(reason = %e, "Malformed multipart body");
                return Err(ApiError::MissingFile);
            }
        };

        if field.name() != Some(field_name) {
            continue;
        }
        let Some(filename) = field.file_name().filter(|n| !n.is_empty()).map(str::to_owned) else {
            continue;
        };

        let bytes = read_field(field, limit).await?;
        return Ok(UploadRequest { filename, bytes });
    }
}

async fn read_field(mut field: Field<'_>, limit: &UploadLimit) -> Result<Vec<u8>, ApiError> {
    let mut bytes = Vec::new();

    loop {
        let chunk = match field.chunk().await {
            Ok(Some(chunk)) => chunk,
            Ok(None) => return Ok(bytes),
            Err(e) if is_length_limit(&e) => return Err(too_large(limit)),
            Err(e) => return Err(ApiError::Read(e.body_text())),
        };

        if limit.is_exceeded_by((bytes.len() + chunk.len()) as u64) {
            return Err(too_large(limit));
        }
        bytes.extend_from_slice(&chunk);
    }
}

fn is_length_limit(error: &MultipartError) -> bool {
    error.status() == StatusCode::PAYLOAD_TOO_LARGE
}

fn too_large(limit: &UploadLimit) -> ApiError {
    ApiError::TooLarge {
        limit: limit.describe(),
    }
}
