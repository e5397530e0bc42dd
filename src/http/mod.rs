//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, graceful drain)
//!     → request.rs (request ID)
//!     → handlers.rs
//!         → upload.rs (multipart field, ceiling)
//!         → transform (blocking pool)
//!         → response.rs (attachment)
//!     → error.rs on any failure (JSON body)
//! ```

pub mod error;
pub mod handlers;
pub mod request;
pub mod response;
pub mod server;
pub mod upload;

pub use error::ApiError;
pub use request::{UuidRequestId, X_REQUEST_ID};
pub use server::{AppState, HttpServer, ServerError};
