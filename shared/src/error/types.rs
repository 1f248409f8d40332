//! Structured application error

use super::codes::ErrorCode;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// Result alias used across the engine's public surface
pub type AppResult<T> = Result<T, AppError>;

/// Application error with structured error code and details
///
/// Carries a stable machine-readable [`ErrorCode`], a human-readable message
/// and optional structured details (field-level context, ids, limits).
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct AppError {
    /// The error code identifying the type of error
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details (field-level errors, context, etc.)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, Value>>,
}

impl AppError {
    /// Create a new error with the default message for the error code
    pub fn new(code: ErrorCode) -> Self {
        Self {
            message: code.message().to_string(),
            code,
            details: None,
        }
    }

    /// Create a new error with a custom message
    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Add a detail entry to this error
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Get the HTTP status code for this error
    pub fn http_status(&self) -> StatusCode {
        self.code.http_status()
    }

    // ==================== Convenience constructors ====================

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::ValidationFailed, msg)
    }

    /// Create a not found error
    pub fn not_found(entity: impl Into<String>) -> Self {
        let e = entity.into();
        Self::with_message(ErrorCode::NotFound, format!("{} not found", e)).with_detail("entity", e)
    }

    /// Create a conflict error (overlap detected or write race lost)
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::Conflict, msg)
    }

    /// Create a business rule error
    pub fn business_rule(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::BusinessRule, msg)
    }

    /// Create an already-cancelled error
    pub fn already_cancelled(reservation_id: i64) -> Self {
        Self::with_message(
            ErrorCode::AlreadyCancelled,
            format!("Reservation {reservation_id} is already cancelled"),
        )
        .with_detail("reservation_id", reservation_id)
    }

    /// Create an insufficient balance error
    pub fn insufficient_balance(requested: i64, balance: i64) -> Self {
        Self::with_message(
            ErrorCode::InsufficientBalance,
            format!("Cannot redeem {requested} points, balance is {balance}"),
        )
        .with_detail("requested", requested)
        .with_detail("balance", balance)
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::InternalError, msg)
    }

    /// Create a database error
    pub fn database(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::DatabaseError, msg)
    }

    /// Create an invalid request error
    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::InvalidRequest, msg)
    }
}
