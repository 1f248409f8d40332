//! External collaborator records
//!
//! The engine reads these from a resource catalog and a user directory it
//! never mutates. Catalog edits mid-booking do not touch existing
//! reservations; prices are snapshotted into the reservation at creation.

use super::money::Money;
use serde::{Deserialize, Serialize};

/// A bookable unit (hotel room or event installation)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resource {
    pub id: i64,
    pub name: String,
    /// Maximum number of guests
    pub capacity: u32,
    /// Price per night of occupancy
    pub unit_price: Money,
}

/// Role of a directory user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Client,
    Staff,
    Admin,
}

/// A user as reported by the external directory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: i64,
    pub role: UserRole,
    pub active: bool,
}
