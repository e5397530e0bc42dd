//! Response composition for processed downloads.
//!
//! # Responsibilities
//! - Return transformed bytes as an attachment
//! - Declare the content type of the bytes actually produced
//!
//! # Design Decisions
//! - Body is the full in-memory buffer; uploads are bounded by the ceiling

use axum::body::Body;
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::StatusCode;
use axum::response::Response;

use crate::http::error::ApiError;
use crate::security::headers::content_disposition;
use crate::transform::Processed;

/// 200 response carrying `processed` as `processed_<original_filename>`.
pub fn attachment(original_filename: &str, processed: Processed) -> Result<Response, ApiError> {
    let disposition =
        content_disposition(original_filename).map_err(|e| ApiError::Response(e.to_string()))?;

    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, processed.content_type)
        .header(CONTENT_DISPOSITION, disposition)
        .body(Body::from(processed.bytes))
        .map_err(|e| ApiError::Response(e.to_string()))
}
