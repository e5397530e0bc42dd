//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Default upload ceiling: 10 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// Literal header prepended by the passthrough transform.
pub const DEFAULT_PROCESSING_HEADER: &str = "processed by image-processor\n";

/// Root configuration for the image processing service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// Listener configuration (host, port).
    pub listener: ListenerConfig,

    /// Upload endpoint settings.
    pub upload: UploadConfig,

    /// Active transform and its parameters.
    pub transform: TransformConfig,

    /// Graceful shutdown settings.
    pub shutdown: ShutdownConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Response hardening.
    pub security: SecurityConfig,
}

impl ServiceConfig {
    /// Path the upload handler is mounted on.
    ///
    /// Falls back to the variant's conventional route when unset.
    pub fn upload_route(&self) -> String {
        match &self.upload.route {
            Some(route) => route.clone(),
            None => format!("/api/v1/{}", self.transform.variant.default_field()),
        }
    }

    /// Name of the multipart field carrying the file.
    pub fn upload_field(&self) -> String {
        match &self.upload.field {
            Some(field) => field.clone(),
            None => self.transform.variant.default_field().to_string(),
        }
    }

    /// Effective upload ceiling, `None` when not enforced.
    pub fn upload_limit(&self) -> Option<u64> {
        self.upload.enforce_limit.then_some(self.upload.max_bytes)
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Interface to bind (e.g., "0.0.0.0").
    pub host: String,

    /// TCP port. Overridden by the `PORT` environment variable.
    pub port: u16,
}

impl ListenerConfig {
    /// `host:port` string suitable for binding.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// Upload endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Route for the upload handler (default depends on the variant).
    pub route: Option<String>,

    /// Multipart field name (default depends on the variant).
    pub field: Option<String>,

    /// Maximum accepted file size in bytes.
    pub max_bytes: u64,

    /// Whether `max_bytes` is enforced at all.
    pub enforce_limit: bool,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            route: None,
            field: None,
            max_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            enforce_limit: true,
        }
    }
}

/// Which transform a deployment runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TransformVariant {
    /// JPEG vertical flip.
    #[default]
    Flip,
    /// Fill-cropped thumbnail.
    Thumbnail,
    /// Header prepend, no image interpretation.
    Passthrough,
}

impl TransformVariant {
    /// Conventional field name (and route suffix) for the variant.
    pub fn default_field(&self) -> &'static str {
        match self {
            TransformVariant::Flip | TransformVariant::Thumbnail => "image",
            TransformVariant::Passthrough => "file",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransformVariant::Flip => "flip",
            TransformVariant::Thumbnail => "thumbnail",
            TransformVariant::Passthrough => "passthrough",
        }
    }
}

/// Transform configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TransformConfig {
    /// Active variant.
    pub variant: TransformVariant,

    /// Literal bytes prepended by passthrough (and optionally thumbnail).
    pub header: String,

    /// Flip settings.
    pub flip: FlipConfig,

    /// Thumbnail settings.
    pub thumbnail: ThumbnailConfig,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            variant: TransformVariant::Flip,
            header: DEFAULT_PROCESSING_HEADER.to_string(),
            flip: FlipConfig::default(),
            thumbnail: ThumbnailConfig::default(),
        }
    }
}

/// Flip transform configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FlipConfig {
    /// JPEG quality (1-100).
    pub quality: u8,
}

impl Default for FlipConfig {
    fn default() -> Self {
        Self { quality: 90 }
    }
}

/// Thumbnail transform configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ThumbnailConfig {
    /// Output width in pixels.
    pub width: u32,

    /// Output height in pixels.
    pub height: u32,

    /// JPEG quality (1-100).
    pub quality: u8,

    /// Prepend `transform.header` before decoding.
    ///
    /// Off by default: a prepended header corrupts every real image payload.
    pub prepend_header: bool,
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            width: 256,
            height: 256,
            quality: 80,
            prepend_header: false,
        }
    }
}

/// Graceful shutdown configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ShutdownConfig {
    /// Time in-flight requests get to finish after a shutdown signal.
    pub grace_secs: u64,
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self { grace_secs: 10 }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable, for development.
    #[default]
    Pretty,
    /// One JSON object per line, for production.
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins when set.
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Security hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Add static security response headers.
    pub enable_headers: bool,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            enable_headers: true,
        }
    }
}
