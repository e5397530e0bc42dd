//! Response header composition and security headers.
//!
//! # Responsibilities
//! - Build the `Content-Disposition` value for processed downloads
//! - Provide the static security headers added to every response
//!
//! # Design Decisions
//! - The client filename is echoed, not rewritten: only control characters
//!   are removed and `"`/`\` are escaped as in an HTTP quoted-string
//! - Path separators and non-ASCII text pass through unchanged; consumers
//!   that write the name to disk must take the basename themselves

use axum::http::header::{InvalidHeaderValue, X_CONTENT_TYPE_OPTIONS, X_FRAME_OPTIONS};
use axum::http::{HeaderName, HeaderValue};

/// Prefix added to every processed filename.
pub const PROCESSED_PREFIX: &str = "processed_";

/// Name of the processed file: prefix plus the original with control characters removed.
pub fn processed_filename(original: &str) -> String {
    let mut name = String::with_capacity(PROCESSED_PREFIX.len() + original.len());
    name.push_str(PROCESSED_PREFIX);
    name.extend(original.chars().filter(|c| !c.is_control()));
    name
}

/// `attachment; filename="processed_<original>"`.
pub fn content_disposition(original: &str) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut value = String::from("attachment; filename=\"");
    for c in processed_filename(original).chars() {
        if c == '"' || c == '\\' {
            value.push('\\');
        }
        value.push(c);
    }
    value.push('"');

    // from_bytes accepts UTF-8 as obs-text; from_str would reject it.
    HeaderValue::from_bytes(value.as_bytes())
}

/// Static hardening headers.
pub fn security_headers() -> [(HeaderName, HeaderValue); 2] {
    [
        (X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff")),
        (X_FRAME_OPTIONS, HeaderValue::from_static("DENY")),
    ]
}
