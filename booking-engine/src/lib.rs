//! Overlap-safe booking engine with a loyalty points ledger
//!
//! Two invariants drive everything here:
//!
//! 1. For any resource, CONFIRMED reservations are pairwise non-overlapping
//!    in `[check_in, check_out)` — enforced by running the availability check
//!    and the dependent write inside one write-locking transaction.
//! 2. A loyalty account's cached balance equals the signed sum of its
//!    append-only transaction log and can never go negative — enforced by
//!    re-checking the balance inside the same transaction as the append.
//!
//! The engine consumes a resource catalog and a user directory as read-only
//! collaborators ([`catalog`]) and exposes its operations through the
//! services in [`services`], bundled by [`engine::BookingEngine`].

pub mod catalog;
pub mod config;
pub mod db;
pub mod engine;
pub mod services;

// Re-exports
pub use catalog::{InMemoryCatalog, InMemoryDirectory, ResourceCatalog, UserDirectory};
pub use config::Config;
pub use db::DbService;
pub use engine::BookingEngine;
pub use services::{
    AvailabilityService, BookingOrchestrator, LoyaltyService, ReservationService,
};
