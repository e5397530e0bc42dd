//! Request spans.
//!
//! # Responsibilities
//! - Create one span per HTTP request for the access log
//! - Tag the span with the request ID so handler events correlate
//!
//! # Design Decisions
//! - The request ID layer runs before the trace layer, so the ID is always set

use axum::http::Request;
use tracing::Span;

use crate::http::request::request_id;

/// Span factory for `TraceLayer::make_span_with`.
pub fn make_request_span<B>(request: &Request<B>) -> Span {
    tracing::info_span!(
        "request",
        method = %request.method(),
        uri = %request.uri(),
        request_id = %request_id(request.headers()),
    )
}
