//! Engine facade
//!
//! Bundles the database service and the four domain services behind one
//! initialization point, ready to be held in a request handler's state.

use crate::catalog::{SharedCatalog, SharedDirectory};
use crate::config::Config;
use crate::db::DbService;
use crate::services::{
    AvailabilityService, BookingOrchestrator, LoyaltyService, ReservationService,
};
use shared::AppResult;

/// Fully wired booking engine
#[derive(Clone)]
pub struct BookingEngine {
    pub db: DbService,
    pub availability: AvailabilityService,
    pub reservations: ReservationService,
    pub loyalty: LoyaltyService,
    pub orchestrator: BookingOrchestrator,
}

impl BookingEngine {
    /// Open the database, run migrations and wire the services to the given
    /// collaborators.
    pub async fn initialize(
        config: Config,
        catalog: SharedCatalog,
        directory: SharedDirectory,
    ) -> AppResult<Self> {
        let db = DbService::new(&config.db_path).await?;
        Ok(Self {
            availability: AvailabilityService::new(db.clone()),
            reservations: ReservationService::new(
                db.clone(),
                catalog.clone(),
                directory.clone(),
                config.clone(),
            ),
            loyalty: LoyaltyService::new(db.clone(), directory.clone(), config.clone()),
            orchestrator: BookingOrchestrator::new(db.clone(), catalog, directory, config),
            db,
        })
    }
}
