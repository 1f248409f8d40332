//! Database module
//!
//! Handles the SQLite connection pool, migrations, and the immediate
//! (write-locking) transactions every mutating operation runs in.

pub mod repository;

use shared::AppError;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Sqlite, SqlitePool, Transaction};
use std::str::FromStr;

use repository::RepoError;

/// Database service — owns a SQLite connection pool
#[derive(Clone)]
pub struct DbService {
    pub pool: SqlitePool,
}

impl DbService {
    /// Create a new database service with WAL mode and run migrations
    pub async fn new(db_path: &str) -> Result<Self, AppError> {
        // Build connection options: WAL, foreign keys, normal sync
        let options = SqliteConnectOptions::from_str(&format!("sqlite:{db_path}"))
            .map_err(|e| AppError::database(format!("Invalid database path: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .pragma("foreign_keys", "ON");

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| AppError::database(format!("Failed to open database: {e}")))?;

        // busy_timeout: wait up to 5s for the write lock instead of failing
        // immediately; expiry surfaces as a Conflict to the caller
        sqlx::query("PRAGMA busy_timeout = 5000;")
            .execute(&pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to set busy_timeout: {e}")))?;

        tracing::info!("Database connection established (SQLite WAL, busy_timeout=5000ms)");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to apply migrations: {e}")))?;
        tracing::info!("Database migrations applied");

        Ok(Self { pool })
    }

    /// Begin a write-locking transaction.
    ///
    /// `BEGIN IMMEDIATE` takes SQLite's write lock before the first read, so
    /// a guard query (availability, balance) and the write depending on it
    /// cannot interleave with a concurrent writer: the loser of the lock race
    /// re-reads state the winner already committed.
    pub async fn begin_immediate(&self) -> Result<Transaction<'static, Sqlite>, RepoError> {
        Ok(self.pool.begin_with("BEGIN IMMEDIATE").await?)
    }
}
