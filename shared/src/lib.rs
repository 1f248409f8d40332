//! Shared types for the booking core
//!
//! Data models, error codes and response-level error types, plus the id/time
//! utilities used by every crate that talks to the engine.

pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use error::{AppError, AppResult, ErrorCode};
pub use serde::{Deserialize, Serialize};
