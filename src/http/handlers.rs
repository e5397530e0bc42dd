//! Route handlers.

use std::time::Instant;

use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use serde::Serialize;

use crate::http::error::ApiError;
use crate::http::response::attachment;
use crate::http::server::AppState;
use crate::http::upload::{read_upload, UploadRequest};
use crate::observability::metrics as upload_metrics;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct TestResponse {
    pub message: &'static str,
    pub status: u16,
}

/// GET `/health`: liveness probe.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// GET `/api/v1/test`: diagnostic ping.
pub async fn test_endpoint() -> Json<TestResponse> {
    Json(TestResponse {
        message: "Server is running",
        status: StatusCode::OK.as_u16(),
    })
}

/// POST upload route: read the file, transform it, return it as an attachment.
pub async fn process_upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, ApiError> {
    let started = Instant::now();
    let transform_name = state.transform.name();

    let result = handle_upload(&state, multipart).await;

    let status = match &result {
        Ok(response) => response.status(),
        Err(e) => e.status(),
    };
    upload_metrics::record_upload(transform_name, status.as_u16(), started);

    match &result {
        Err(e) if status.is_server_error() => {
            tracing::warn!(transform = transform_name, error = %e, "Upload failed");
        }
        Err(e) => {
            tracing::debug!(transform = transform_name, error = %e, "Upload rejected");
        }
        Ok(_) => {
            tracing::debug!(
                transform = transform_name,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Upload processed"
            );
        }
    }

    result
}

async fn handle_upload(
    state: &AppState,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, ApiError> {
    let upload = read_upload(multipart, &state.field, &state.limit).await?;
    upload_metrics::record_upload_size(state.transform.name(), upload.size());
    let UploadRequest { filename, bytes } = upload;

    let transform = state.transform.clone();
    let processed = tokio::task::spawn_blocking(move || transform.apply(&bytes)).await??;

    attachment(&filename, processed)
}
