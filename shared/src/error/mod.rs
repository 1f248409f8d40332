//! Error handling
//!
//! Stable machine-readable error codes plus the structured [`AppError`] the
//! engine returns to its callers. Errors are never used for normal control
//! flow; availability is answered as a boolean, not an exception path.

mod codes;
mod types;

pub use codes::ErrorCode;
pub use types::{AppError, AppResult};
