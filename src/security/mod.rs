//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming upload:
//!     → limits.rs (ceiling checked while the field streams in)
//!     → transform
//!     → headers.rs (attachment name, security headers)
//!     → response
//! ```
//!
//! # Design Decisions
//! - Fail closed: an upload past the ceiling is rejected, never truncated
//! - No trust in client input echoed into headers

pub mod headers;
pub mod limits;

pub use limits::UploadLimit;
