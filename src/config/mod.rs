//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! built-in defaults
//!     → loader.rs (optional TOML file, then PORT from the environment)
//!     → validation.rs (semantic checks)
//!     → ServiceConfig (validated, immutable)
//!     → shared by value with the subsystems built at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    FlipConfig, ListenerConfig, LogFormat, ObservabilityConfig, SecurityConfig, ServiceConfig,
    ShutdownConfig, ThumbnailConfig, TransformConfig, TransformVariant, UploadConfig,
};
pub use validation::ValidationError;
