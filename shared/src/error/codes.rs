//! Unified error codes for the booking core
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 41xx: Reservation lifecycle errors
//! - 42xx: Loyalty ledger errors
//! - 9xxx: System errors

use http::StatusCode;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// Codes are represented as u16 values for efficient serialization and
/// cross-language compatibility (Rust, TypeScript, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Unknown error
    Unknown = 1,
    /// Validation failed (malformed or out-of-range input)
    ValidationFailed = 2,
    /// Entity not found
    NotFound = 3,
    /// A concurrent writer won, or the requested window is taken
    Conflict = 4,
    /// Invalid request
    InvalidRequest = 5,

    // ==================== 41xx: Reservation ====================
    /// Lifecycle rule violated (e.g. updating a cancelled reservation)
    BusinessRule = 4100,
    /// Reservation is already cancelled (idempotent rejection)
    AlreadyCancelled = 4102,

    // ==================== 42xx: Loyalty ====================
    /// Redemption exceeds the current balance
    InsufficientBalance = 4201,

    // ==================== 9xxx: System ====================
    /// Internal error
    InternalError = 9000,
    /// Database error
    DatabaseError = 9001,
}

impl ErrorCode {
    /// Default human-readable message for this code
    pub fn message(&self) -> &'static str {
        match self {
            Self::Unknown => "Unknown error",
            Self::ValidationFailed => "Validation failed",
            Self::NotFound => "Not found",
            Self::Conflict => "Conflict",
            Self::InvalidRequest => "Invalid request",
            Self::BusinessRule => "Business rule violated",
            Self::AlreadyCancelled => "Reservation is already cancelled",
            Self::InsufficientBalance => "Insufficient points balance",
            Self::InternalError => "Internal error",
            Self::DatabaseError => "Database error",
        }
    }

    /// HTTP status code a thin handler layer should answer with
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::ValidationFailed | Self::InvalidRequest => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Conflict | Self::AlreadyCancelled | Self::InsufficientBalance => {
                StatusCode::CONFLICT
            }
            Self::BusinessRule => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Unknown | Self::InternalError | Self::DatabaseError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", *self as u16)
    }
}

impl From<ErrorCode> for u16 {
    fn from(code: ErrorCode) -> Self {
        code as u16
    }
}

impl TryFrom<u16> for ErrorCode {
    type Error = String;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Unknown),
            2 => Ok(Self::ValidationFailed),
            3 => Ok(Self::NotFound),
            4 => Ok(Self::Conflict),
            5 => Ok(Self::InvalidRequest),
            4100 => Ok(Self::BusinessRule),
            4102 => Ok(Self::AlreadyCancelled),
            4201 => Ok(Self::InsufficientBalance),
            9000 => Ok(Self::InternalError),
            9001 => Ok(Self::DatabaseError),
            _ => Err(format!("unknown error code: {value}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_u16() {
        for code in [
            ErrorCode::Unknown,
            ErrorCode::ValidationFailed,
            ErrorCode::NotFound,
            ErrorCode::Conflict,
            ErrorCode::InvalidRequest,
            ErrorCode::BusinessRule,
            ErrorCode::AlreadyCancelled,
            ErrorCode::InsufficientBalance,
            ErrorCode::InternalError,
            ErrorCode::DatabaseError,
        ] {
            assert_eq!(ErrorCode::try_from(u16::from(code)), Ok(code));
        }
    }

    #[test]
    fn expected_failures_map_to_conflict_status() {
        assert_eq!(
            ErrorCode::InsufficientBalance.http_status(),
            StatusCode::CONFLICT
        );
        assert_eq!(ErrorCode::Conflict.http_status(), StatusCode::CONFLICT);
    }
}
