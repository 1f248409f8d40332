//! Repository module
//!
//! Thin persistence functions over sqlx. Functions take any
//! `SqliteExecutor`, so a service can run the same query against the pool or
//! inside an open transaction — guard queries (overlap probe, balance read)
//! must always be given the transaction their dependent write runs in.

pub mod loyalty;
pub mod reservation;

use shared::AppError;
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Write lock contention: {0}")]
    Busy(String),

    #[error("Constraint violated: {0}")]
    Constraint(String),

    #[error("Database error: {0}")]
    Database(String),
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            // SQLITE_BUSY (5) and its extended codes (261 recovery,
            // 517 snapshot) mean we lost a write-lock race
            if matches!(db_err.code().as_deref(), Some("5" | "261" | "517")) {
                return RepoError::Busy(db_err.to_string());
            }
            if matches!(db_err.kind(), sqlx::error::ErrorKind::CheckViolation) {
                return RepoError::Constraint(db_err.to_string());
            }
        }
        RepoError::Database(err.to_string())
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => AppError::not_found(msg),
            RepoError::Busy(msg) => {
                AppError::conflict(format!("Concurrent write lost the lock race: {msg}"))
            }
            RepoError::Constraint(msg) => {
                AppError::database(format!("Constraint backstop triggered: {msg}"))
            }
            RepoError::Database(msg) => AppError::database(msg),
        }
    }
}
