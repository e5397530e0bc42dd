//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (quality, dimensions, ceiling)
//! - Detect routes that collide with the built-in endpoints
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServiceConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use crate::config::schema::{ServiceConfig, TransformVariant};

/// Largest thumbnail edge accepted.
pub const MAX_THUMBNAIL_EDGE: u32 = 8192;

/// Routes owned by the service itself.
const RESERVED_ROUTES: &[&str] = &["/health", "/api/v1/test"];

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("upload.route must start with '/' (got {0:?})")]
    RouteNotAbsolute(String),

    #[error("upload.route must be a literal path without '{{', '}}', or ':'/'*' segments (got {0:?})")]
    RouteNotLiteral(String),

    #[error("upload.route {0:?} collides with a built-in endpoint")]
    RouteReserved(String),

    #[error("upload.field must not be empty")]
    EmptyField,

    #[error("upload.max_bytes must be greater than zero")]
    ZeroCeiling,

    #[error("{section}.quality must be within 1..=100 (got {value})")]
    QualityOutOfRange { section: &'static str, value: u8 },

    #[error("transform.thumbnail dimensions must be within 1..={max} (got {width}x{height})")]
    ThumbnailDimensions { width: u32, height: u32, max: u32 },

    #[error("transform.header must not be empty for the {0} variant")]
    EmptyHeader(&'static str),

    #[error("observability.metrics_address is not a socket address (got {0:?})")]
    MetricsAddress(String),
}

/// Check a configuration for semantic errors.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let route = config.upload_route();
    if !route.starts_with('/') {
        errors.push(ValidationError::RouteNotAbsolute(route));
    } else if !is_literal_route(&route) {
        errors.push(ValidationError::RouteNotLiteral(route));
    } else if RESERVED_ROUTES.contains(&route.trim_end_matches('/')) {
        errors.push(ValidationError::RouteReserved(route));
    }

    if config.upload_field().trim().is_empty() {
        errors.push(ValidationError::EmptyField);
    }

    if config.upload.enforce_limit && config.upload.max_bytes == 0 {
        errors.push(ValidationError::ZeroCeiling);
    }

    let transform = &config.transform;
    match transform.variant {
        TransformVariant::Flip => {
            check_quality("transform.flip", transform.flip.quality, &mut errors);
        }
        TransformVariant::Thumbnail => {
            let thumb = &transform.thumbnail;
            check_quality("transform.thumbnail", thumb.quality, &mut errors);
            let in_range = |edge: u32| (1..=MAX_THUMBNAIL_EDGE).contains(&edge);
            if !in_range(thumb.width) || !in_range(thumb.height) {
                errors.push(ValidationError::ThumbnailDimensions {
                    width: thumb.width,
                    height: thumb.height,
                    max: MAX_THUMBNAIL_EDGE,
                });
            }
            if thumb.prepend_header && transform.header.is_empty() {
                errors.push(ValidationError::EmptyHeader("thumbnail"));
            }
        }
        TransformVariant::Passthrough => {
            if transform.header.is_empty() {
                errors.push(ValidationError::EmptyHeader("passthrough"));
            }
        }
    }

    let observability = &config.observability;
    if observability.metrics_enabled
        && observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// No captures, wildcards, or legacy `:`/`*` segments the router would reject.
fn is_literal_route(route: &str) -> bool {
    !route.contains(['{', '}'])
        && !route
            .split('/')
            .any(|segment| segment.starts_with(':') || segment.starts_with('*'))
}

fn check_quality(section: &'static str, value: u8, errors: &mut Vec<ValidationError>) {
    if !(1..=100).contains(&value) {
        errors.push(ValidationError::QualityOutOfRange { section, value });
    }
}
