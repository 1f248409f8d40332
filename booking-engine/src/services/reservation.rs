//! Reservation lifecycle
//!
//! State transitions go through one explicit table ([`transition`]) instead
//! of ad hoc status checks at each call site. Every mutating operation runs
//! its availability probe and its write inside a single immediate
//! transaction: two concurrent bookings for an overlapping window cannot both
//! observe "available" and both commit.

use super::{commit, loyalty, require_active_user, require_resource};
use crate::catalog::{SharedCatalog, SharedDirectory};
use crate::config::Config;
use crate::db::{repository, DbService};
use chrono::{NaiveDate, Utc};
use shared::models::{
    Money, Reservation, ReservationCreate, ReservationStatus, ReservationUpdate, Resource,
};
use shared::util::{now_millis, snowflake_id};
use shared::{AppError, AppResult};
use sqlx::{Sqlite, Transaction};
use std::fmt;

/// Lifecycle events a reservation can receive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReservationEvent {
    Confirm,
    Update,
    Cancel,
    Reassign,
}

impl fmt::Display for ReservationEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Confirm => "confirm",
            Self::Update => "update",
            Self::Cancel => "cancel",
            Self::Reassign => "reassign",
        })
    }
}

/// The transition table: state × event → new state, or a business-rule
/// rejection. CANCELLED and REASSIGNED are terminal.
pub fn transition(
    status: ReservationStatus,
    event: ReservationEvent,
) -> Result<ReservationStatus, AppError> {
    use ReservationEvent as E;
    use ReservationStatus as S;
    match (status, event) {
        (S::Pending, E::Confirm) => Ok(S::Confirmed),
        (S::Pending | S::Confirmed, E::Cancel) => Ok(S::Cancelled),
        (S::Confirmed, E::Update) => Ok(S::Confirmed),
        (S::Confirmed, E::Reassign) => Ok(S::Reassigned),
        (status, event) => Err(AppError::business_rule(format!(
            "Cannot {event} a {status} reservation"
        ))),
    }
}

pub(crate) fn validate_stay(check_in: NaiveDate, check_out: NaiveDate) -> AppResult<()> {
    if check_in >= check_out {
        return Err(AppError::validation(format!(
            "Check-out ({check_out}) must be after check-in ({check_in})"
        )));
    }
    let today = Utc::now().date_naive();
    if check_in < today {
        return Err(AppError::validation(format!(
            "Check-in ({check_in}) must not be in the past"
        )));
    }
    Ok(())
}

pub(crate) fn validate_guests(guests: u32, resource: &Resource) -> AppResult<()> {
    if guests == 0 {
        return Err(AppError::validation("At least one guest is required"));
    }
    if guests > resource.capacity {
        return Err(AppError::validation(format!(
            "{} guests exceed the capacity of {} ({})",
            guests, resource.name, resource.capacity
        ))
        .with_detail("capacity", resource.capacity)
        .with_detail("guests", guests));
    }
    Ok(())
}

/// Undiscounted stay price: unit price × nights (half-open, so Jan 10–12 is
/// two nights)
pub(crate) fn stay_total(resource: &Resource, check_in: NaiveDate, check_out: NaiveDate) -> Money {
    resource.unit_price.mul((check_out - check_in).num_days())
}

pub(crate) fn build_confirmed(
    req: &ReservationCreate,
    total: Money,
    points_redeemed: i64,
) -> Reservation {
    let now = now_millis();
    Reservation {
        id: snowflake_id(),
        resource_id: req.resource_id,
        client_id: req.client_id,
        check_in: req.check_in,
        check_out: req.check_out,
        guests: req.guests,
        total,
        status: ReservationStatus::Confirmed,
        points_redeemed,
        created_at: now,
        updated_at: now,
    }
}

/// Overlap probe + insert, on the caller's open transaction. The probe and
/// the write must share the transaction; running them separately is the
/// classic double-booking race.
pub(crate) async fn confirm_insert(
    tx: &mut Transaction<'static, Sqlite>,
    rsv: &Reservation,
    exclude: Option<i64>,
) -> AppResult<()> {
    let taken = repository::reservation::has_overlap(
        &mut **tx,
        rsv.resource_id,
        rsv.check_in,
        rsv.check_out,
        exclude,
    )
    .await?;
    if taken {
        return Err(AppError::conflict(format!(
            "Resource {} is already booked within {} to {}",
            rsv.resource_id, rsv.check_in, rsv.check_out
        ))
        .with_detail("resource_id", rsv.resource_id));
    }
    repository::reservation::insert(&mut **tx, rsv).await?;
    Ok(())
}

/// Reservation lifecycle operations
#[derive(Clone)]
pub struct ReservationService {
    db: DbService,
    catalog: SharedCatalog,
    directory: SharedDirectory,
    config: Config,
}

impl ReservationService {
    pub fn new(
        db: DbService,
        catalog: SharedCatalog,
        directory: SharedDirectory,
        config: Config,
    ) -> Self {
        Self {
            db,
            catalog,
            directory,
            config,
        }
    }

    /// Create a reservation, entering the lifecycle directly as CONFIRMED.
    /// A failed guard persists nothing.
    pub async fn create(&self, req: ReservationCreate) -> AppResult<Reservation> {
        require_active_user(&self.directory, req.client_id).await?;
        let resource = require_resource(&self.catalog, req.resource_id).await?;
        validate_stay(req.check_in, req.check_out)?;
        validate_guests(req.guests, &resource)?;

        let total = stay_total(&resource, req.check_in, req.check_out);
        let rsv = build_confirmed(&req, total, 0);

        let mut tx = self.db.begin_immediate().await?;
        confirm_insert(&mut tx, &rsv, None).await?;
        commit(tx).await?;

        tracing::info!(
            reservation_id = rsv.id,
            resource_id = rsv.resource_id,
            client_id = rsv.client_id,
            check_in = %rsv.check_in,
            check_out = %rsv.check_out,
            "reservation confirmed"
        );
        Ok(rsv)
    }

    /// Change dates and/or guest count, re-validated exactly like a create
    /// with the reservation's own row excluded from the overlap probe.
    pub async fn update(&self, id: i64, upd: ReservationUpdate) -> AppResult<Reservation> {
        let current = self.get(id).await?;
        let resource = require_resource(&self.catalog, current.resource_id).await?;
        validate_stay(upd.check_in, upd.check_out)?;
        validate_guests(upd.guests, &resource)?;
        let gross = stay_total(&resource, upd.check_in, upd.check_out);

        let mut tx = self.db.begin_immediate().await?;
        // re-read under the write lock; status may have moved since the
        // unlocked read above
        let mut rsv = repository::reservation::find_by_id(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Reservation {id}")))?;
        transition(rsv.status, ReservationEvent::Update)?;

        // any points discount carries over into the recomputed price
        let discount = loyalty::discount_for(
            rsv.points_redeemed,
            resource.unit_price.currency,
            &self.config,
        );
        let total = if discount.amount >= gross.amount {
            Money::zero(gross.currency)
        } else {
            gross.checked_sub(discount)?
        };

        let taken = repository::reservation::has_overlap(
            &mut *tx,
            rsv.resource_id,
            upd.check_in,
            upd.check_out,
            Some(id),
        )
        .await?;
        if taken {
            return Err(AppError::conflict(format!(
                "Resource {} is already booked within {} to {}",
                rsv.resource_id, upd.check_in, upd.check_out
            )));
        }

        let now = now_millis();
        repository::reservation::update_stay(
            &mut *tx,
            id,
            upd.check_in,
            upd.check_out,
            upd.guests,
            total,
            now,
        )
        .await?;
        commit(tx).await?;

        rsv.check_in = upd.check_in;
        rsv.check_out = upd.check_out;
        rsv.guests = upd.guests;
        rsv.total = total;
        rsv.updated_at = now;
        tracing::info!(reservation_id = id, "reservation updated");
        Ok(rsv)
    }

    /// Cancel a CONFIRMED (or future PENDING) reservation. The row is kept
    /// for the ledger/audit trail. Cancelling twice is an idempotent
    /// rejection, never a state change.
    pub async fn cancel(&self, id: i64) -> AppResult<()> {
        let mut tx = self.db.begin_immediate().await?;
        let rsv = repository::reservation::find_by_id(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Reservation {id}")))?;
        if rsv.status == ReservationStatus::Cancelled {
            return Err(AppError::already_cancelled(id));
        }
        let next = transition(rsv.status, ReservationEvent::Cancel)?;
        repository::reservation::set_status(&mut *tx, id, next, now_millis()).await?;
        commit(tx).await?;

        tracing::info!(reservation_id = id, "reservation cancelled");
        Ok(())
    }

    /// Move a reservation to a new resource and/or window: the old row
    /// becomes REASSIGNED and a fresh CONFIRMED row is inserted, atomically.
    /// If the new placement fails its availability probe the transaction
    /// rolls back and the original stays CONFIRMED and unmodified.
    pub async fn reassign(
        &self,
        id: i64,
        new_resource_id: i64,
        new_check_in: NaiveDate,
        new_check_out: NaiveDate,
    ) -> AppResult<Reservation> {
        let new_resource = require_resource(&self.catalog, new_resource_id).await?;
        validate_stay(new_check_in, new_check_out)?;

        let mut tx = self.db.begin_immediate().await?;
        let old = repository::reservation::find_by_id(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Reservation {id}")))?;
        transition(old.status, ReservationEvent::Reassign)?;
        validate_guests(old.guests, &new_resource)?;

        // the old row is excluded: it stops blocking the moment it flips to
        // REASSIGNED in this same transaction
        let taken = repository::reservation::has_overlap(
            &mut *tx,
            new_resource_id,
            new_check_in,
            new_check_out,
            Some(id),
        )
        .await?;
        if taken {
            return Err(AppError::conflict(format!(
                "Resource {new_resource_id} is already booked within {new_check_in} to {new_check_out}"
            )));
        }

        // any points discount travels with the booking
        let gross = stay_total(&new_resource, new_check_in, new_check_out);
        let discount = loyalty::discount_for(
            old.points_redeemed,
            new_resource.unit_price.currency,
            &self.config,
        );
        let total = if discount.amount >= gross.amount {
            Money::zero(gross.currency)
        } else {
            gross.checked_sub(discount)?
        };

        let now = now_millis();
        repository::reservation::set_status(&mut *tx, id, ReservationStatus::Reassigned, now)
            .await?;
        let req = ReservationCreate {
            resource_id: new_resource_id,
            client_id: old.client_id,
            check_in: new_check_in,
            check_out: new_check_out,
            guests: old.guests,
        };
        let new_rsv = build_confirmed(&req, total, old.points_redeemed);
        repository::reservation::insert(&mut *tx, &new_rsv).await?;
        commit(tx).await?;

        tracing::info!(
            old_reservation_id = id,
            new_reservation_id = new_rsv.id,
            resource_id = new_resource_id,
            "reservation reassigned"
        );
        Ok(new_rsv)
    }

    pub async fn get(&self, id: i64) -> AppResult<Reservation> {
        repository::reservation::find_by_id(&self.db.pool, id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Reservation {id}")))
    }

    pub async fn list_for_client(&self, client_id: i64) -> AppResult<Vec<Reservation>> {
        Ok(repository::reservation::list_for_client(&self.db.pool, client_id).await?)
    }

    pub async fn list_for_resource(&self, resource_id: i64) -> AppResult<Vec<Reservation>> {
        Ok(repository::reservation::list_for_resource(&self.db.pool, resource_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::{ReservationEvent as E, ReservationStatus as S};
    use shared::ErrorCode;

    #[test]
    fn confirmed_accepts_update_cancel_reassign() {
        assert_eq!(transition(S::Confirmed, E::Update).unwrap(), S::Confirmed);
        assert_eq!(transition(S::Confirmed, E::Cancel).unwrap(), S::Cancelled);
        assert_eq!(transition(S::Confirmed, E::Reassign).unwrap(), S::Reassigned);
    }

    #[test]
    fn pending_confirms_or_cancels_only() {
        assert_eq!(transition(S::Pending, E::Confirm).unwrap(), S::Confirmed);
        assert_eq!(transition(S::Pending, E::Cancel).unwrap(), S::Cancelled);
        assert!(transition(S::Pending, E::Update).is_err());
        assert!(transition(S::Pending, E::Reassign).is_err());
    }

    #[test]
    fn terminal_states_reject_everything() {
        for status in [S::Cancelled, S::Reassigned] {
            for event in [E::Confirm, E::Update, E::Cancel, E::Reassign] {
                let err = transition(status, event).unwrap_err();
                assert_eq!(err.code, ErrorCode::BusinessRule, "{status} + {event}");
            }
        }
    }

    #[test]
    fn confirming_a_confirmed_reservation_is_rejected() {
        assert!(transition(S::Confirmed, E::Confirm).is_err());
    }

    #[test]
    fn nightly_price_uses_half_open_nights() {
        use rust_decimal::Decimal;
        use shared::models::Currency;
        let resource = Resource {
            id: 1,
            name: "Room 1".into(),
            capacity: 2,
            unit_price: Money::new(Decimal::new(8050, 2), Currency::Eur),
        };
        let total = stay_total(
            &resource,
            "2026-01-10".parse().unwrap(),
            "2026-01-12".parse().unwrap(),
        );
        // two nights at 80.50
        assert_eq!(total, Money::new(Decimal::new(16100, 2), Currency::Eur));
    }
}
