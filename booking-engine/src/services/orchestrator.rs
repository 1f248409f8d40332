//! Booking orchestrator
//!
//! Multi-entity operations that must be all-or-nothing: a reservation write
//! and its ledger counterpart share one immediate transaction, so the
//! no-overlap and non-negative-balance invariants both hold after every
//! commit — or nothing committed at all.

use super::{commit, loyalty, require_active_user, require_resource, reservation};
use crate::catalog::{SharedCatalog, SharedDirectory};
use crate::config::Config;
use crate::db::{repository, DbService};
use serde::{Deserialize, Serialize};
use shared::models::{
    LoyaltyTransaction, Money, Reservation, ReservationCreate, ReservationStatus, TransactionKind,
};
use shared::util::now_millis;
use shared::{AppError, AppResult};

/// Result of a combined booking: the confirmed reservation plus the REDEEM
/// entry when points were spent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingOutcome {
    pub reservation: Reservation,
    pub redeemed: Option<LoyaltyTransaction>,
}

/// Composes the reservation state machine with the loyalty ledger
#[derive(Clone)]
pub struct BookingOrchestrator {
    db: DbService,
    catalog: SharedCatalog,
    directory: SharedDirectory,
    config: Config,
}

impl BookingOrchestrator {
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

    /// Create a reservation and redeem points against its price in one
    /// atomic step. If the window is taken OR the balance is short, neither
    /// the reservation nor the redemption is committed.
    /// `points_to_redeem == 0` degrades to a plain creation.
    pub async fn book_with_points(
        &self,
        req: ReservationCreate,
        points_to_redeem: i64,
    ) -> AppResult<BookingOutcome> {
        require_active_user(&self.directory, req.client_id).await?;
        let resource = require_resource(&self.catalog, req.resource_id).await?;
        reservation::validate_stay(req.check_in, req.check_out)?;
        reservation::validate_guests(req.guests, &resource)?;

        let gross = reservation::stay_total(&resource, req.check_in, req.check_out);
        let total = self.discounted_total(gross, points_to_redeem)?;
        let rsv = reservation::build_confirmed(&req, total, points_to_redeem);

        let mut tx = self.db.begin_immediate().await?;
        reservation::confirm_insert(&mut tx, &rsv, None).await?;
        let redeemed = if points_to_redeem > 0 {
            Some(
                loyalty::redeem_in_tx(
                    &mut *tx,
                    req.client_id,
                    points_to_redeem,
                    format!("Points redeemed against reservation {}", rsv.id),
                    Some(rsv.id),
                )
                .await?,
            )
        } else {
            None
        };
        commit(tx).await?;

        tracing::info!(
            reservation_id = rsv.id,
            resource_id = rsv.resource_id,
            client_id = rsv.client_id,
            points_redeemed = points_to_redeem,
            total = %rsv.total,
            "booking confirmed"
        );
        Ok(BookingOutcome {
            reservation: rsv,
            redeemed,
        })
    }

    /// Cancel a reservation and reverse its ledger footprint atomically:
    /// points redeemed into it are refunded (EARN), points earned from it are
    /// clawed back (REDEEM). The clawback never drives the balance negative —
    /// if the client already spent those points, only what the balance covers
    /// is reclaimed, and the entry's reason says so.
    pub async fn cancel_with_reversal(&self, reservation_id: i64) -> AppResult<()> {
        let mut tx = self.db.begin_immediate().await?;
        let rsv = repository::reservation::find_by_id(&mut *tx, reservation_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Reservation {reservation_id}")))?;
        if rsv.status == ReservationStatus::Cancelled {
            return Err(AppError::already_cancelled(reservation_id));
        }
        let next = reservation::transition(rsv.status, reservation::ReservationEvent::Cancel)?;
        repository::reservation::set_status(&mut *tx, reservation_id, next, now_millis()).await?;

        // earned total is read before the refund below so the refund's EARN
        // entry (linked to this same reservation) cannot inflate it
        let account = repository::loyalty::find_account_by_user(&mut *tx, rsv.client_id).await?;
        let earned = match &account {
            Some(account) => {
                repository::loyalty::sum_for_reservation(
                    &mut *tx,
                    account.id,
                    reservation_id,
                    TransactionKind::Earn,
                )
                .await?
            }
            None => 0,
        };

        // refund first: it restores balance the clawback may need
        if rsv.points_redeemed > 0 {
            let account = loyalty::get_or_create_account(&mut *tx, rsv.client_id).await?;
            loyalty::append_entry(
                &mut *tx,
                account.id,
                TransactionKind::Earn,
                rsv.points_redeemed,
                format!("Refund of points redeemed on cancelled reservation {reservation_id}"),
                Some(reservation_id),
            )
            .await?;
        }

        if earned > 0 {
            // account exists if anything was earned
            let account = repository::loyalty::find_account_by_user(&mut *tx, rsv.client_id)
                .await?
                .ok_or_else(|| {
                    AppError::not_found(format!("Loyalty account for user {}", rsv.client_id))
                })?;
            let clawback = earned.min(account.balance);
            if clawback > 0 {
                let reason = if clawback < earned {
                    format!(
                        "Reversal of points earned on cancelled reservation {reservation_id} (partial, limited by balance)"
                    )
                } else {
                    format!("Reversal of points earned on cancelled reservation {reservation_id}")
                };
                loyalty::append_entry(
                    &mut *tx,
                    account.id,
                    TransactionKind::Redeem,
                    clawback,
                    reason,
                    Some(reservation_id),
                )
                .await?;
            }
        }
        commit(tx).await?;

        tracing::info!(
            reservation_id,
            refunded = rsv.points_redeemed,
            reversed = earned,
            "reservation cancelled with ledger reversal"
        );
        Ok(())
    }

    fn discounted_total(&self, gross: Money, points_to_redeem: i64) -> AppResult<Money> {
        if points_to_redeem < 0 {
            return Err(AppError::validation("Redeemed points must not be negative"));
        }
        if points_to_redeem == 0 {
            return Ok(gross);
        }
        if points_to_redeem < self.config.min_redeem_points {
            return Err(AppError::validation(format!(
                "Minimum redemption is {} points",
                self.config.min_redeem_points
            ))
            .with_detail("min_redeem_points", self.config.min_redeem_points));
        }
        let quote = loyalty::calculate_points(&gross, &self.config)?;
        if points_to_redeem > quote.max_redeemable_points {
            return Err(AppError::validation(format!(
                "Redeeming {points_to_redeem} points exceeds what this booking can absorb ({})",
                quote.max_redeemable_points
            ))
            .with_detail("max_redeemable_points", quote.max_redeemable_points));
        }
        let discount = loyalty::discount_for(points_to_redeem, gross.currency, &self.config);
        gross.checked_sub(discount)
    }
}
