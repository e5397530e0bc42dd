//! Client-facing errors.
//!
//! Every failure is reported as `{"error": "<text>"}` with a 4xx/5xx status.

use std::any::Any;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::transform::TransformError;

/// Errors returned by the HTTP handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("No file uploaded")]
    MissingFile,

    #[error("File size exceeds {limit}")]
    TooLarge { limit: String },

    #[error("Failed to read file contents: {0}")]
    Read(String),

    #[error("Image process failed: {0}")]
    Transform(#[from] TransformError),

    #[error("Image process failed: worker stopped: {0}")]
    Worker(#[from] tokio::task::JoinError),

    #[error("Failed to build response: {0}")]
    Response(String),

    #[error("Internal server error")]
    Panic,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingFile | ApiError::TooLarge { .. } => StatusCode::BAD_REQUEST,
            ApiError::Read(_)
            | ApiError::Transform(_)
            | ApiError::Worker(_)
            | ApiError::Response(_)
            | ApiError::Panic => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// JSON error body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(ErrorBody { error: self.to_string() })).into_response()
    }
}

/// Response used by the panic-recovery middleware.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let message = panic
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    tracing::error!(panic = %message, "Handler panicked");

    ApiError::Panic.into_response()
}
