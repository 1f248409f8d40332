//! Reservation model
//!
//! A reservation occupies `[check_in, check_out)` — check-out day is free for
//! the next guest, so back-to-back stays never conflict. Rows are never
//! deleted: cancellation and reassignment only change the status, preserving
//! the ledger/audit linkage.

use super::money::Money;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Reservation lifecycle status (TEXT at rest)
///
/// `Pending` is reserved for a future hold/pre-payment flow; no creation path
/// currently produces it and nothing may depend on observing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    Cancelled,
    Reassigned,
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Confirmed => "CONFIRMED",
            Self::Cancelled => "CANCELLED",
            Self::Reassigned => "REASSIGNED",
        }
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReservationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "CONFIRMED" => Ok(Self::Confirmed),
            "CANCELLED" => Ok(Self::Cancelled),
            "REASSIGNED" => Ok(Self::Reassigned),
            other => Err(format!("unknown reservation status: {other}")),
        }
    }
}

/// Reservation entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reservation {
    pub id: i64,
    pub resource_id: i64,
    pub client_id: i64,
    pub check_in: NaiveDate,
    /// Exclusive; strictly after `check_in`
    pub check_out: NaiveDate,
    pub guests: u32,
    /// Price snapshotted at booking time, net of any points discount
    pub total: Money,
    pub status: ReservationStatus,
    /// Points spent to discount this reservation (0 if none)
    pub points_redeemed: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Reservation {
    /// Number of nights in the half-open stay
    pub fn nights(&self) -> i64 {
        (self.check_out - self.check_in).num_days()
    }
}

/// Create reservation payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationCreate {
    pub resource_id: i64,
    pub client_id: i64,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests: u32,
}

/// Update reservation payload (dates and/or guest count)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationUpdate {
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests: u32,
}
