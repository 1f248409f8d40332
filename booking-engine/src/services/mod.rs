//! Domain services
//!
//! Each service owns one concern: availability queries, the reservation
//! lifecycle, the loyalty ledger, and the orchestrator that composes the last
//! two into all-or-nothing operations.

pub mod availability;
pub mod loyalty;
pub mod orchestrator;
pub mod reservation;

pub use availability::AvailabilityService;
pub use loyalty::LoyaltyService;
pub use orchestrator::{BookingOrchestrator, BookingOutcome};
pub use reservation::ReservationService;

use crate::catalog::{SharedCatalog, SharedDirectory};
use crate::db::repository::RepoError;
use shared::models::{Resource, UserRecord};
use shared::{AppError, AppResult};
use sqlx::{Sqlite, Transaction};

/// Commit, mapping a commit-time lock race to a Conflict like any other
pub(crate) async fn commit(tx: Transaction<'static, Sqlite>) -> AppResult<()> {
    tx.commit()
        .await
        .map_err(|e| AppError::from(RepoError::from(e)))
}

pub(crate) async fn require_resource(catalog: &SharedCatalog, id: i64) -> AppResult<Resource> {
    catalog
        .resource(id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Resource {id}")))
}

pub(crate) async fn require_active_user(
    directory: &SharedDirectory,
    user_id: i64,
) -> AppResult<UserRecord> {
    let user = directory
        .user(user_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("User {user_id}")))?;
    if !user.active {
        return Err(AppError::business_rule(format!(
            "User {user_id} is not active"
        )));
    }
    Ok(user)
}
