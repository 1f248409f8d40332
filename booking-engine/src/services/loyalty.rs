//! Loyalty ledger
//!
//! Append-only transaction log per account with a cached balance. The
//! balance check and the append always share one immediate transaction, so
//! two concurrent redemptions cannot both pass `points <= balance` against a
//! stale snapshot and jointly overdraw the account.

use super::{commit, require_active_user};
use crate::catalog::SharedDirectory;
use crate::config::Config;
use crate::db::{repository, DbService};
use rust_decimal::prelude::*;
use shared::models::{
    Currency, LoyaltyAccount, LoyaltyTransaction, Money, PointsQuote, TransactionKind,
};
use shared::util::{now_millis, snowflake_id};
use shared::{AppError, AppResult};
use sqlx::SqliteConnection;

// ==================== Pure conversion ====================

/// Points an EARN on `amount` appends: floor(amount × rate)
pub fn points_for_amount(amount: &Money, config: &Config) -> i64 {
    (amount.amount * Decimal::from(config.earn_points_per_unit))
        .floor()
        .to_i64()
        .unwrap_or(0)
}

/// Monetary value of `points` at the configured redemption rate
pub fn discount_for(points: i64, currency: Currency, config: &Config) -> Money {
    Money::new(
        Decimal::from(points) * Decimal::new(config.point_value_cents, 2),
        currency,
    )
}

/// Quote earn/redeem numbers for an amount. Pure: no I/O, no balance — a
/// quote can be stale by the time the redeem call lands.
pub fn calculate_points(amount: &Money, config: &Config) -> AppResult<PointsQuote> {
    if amount.is_negative() {
        return Err(AppError::validation(format!("Amount must not be negative: {amount}")));
    }
    let point_value = Decimal::new(config.point_value_cents, 2);
    let max_redeemable_points = (amount.amount / point_value).floor().to_i64().unwrap_or(0);
    Ok(PointsQuote {
        points_earned: points_for_amount(amount, config),
        discount: discount_for(max_redeemable_points, amount.currency, config),
        max_redeemable_points,
    })
}

// ==================== In-transaction ledger ops ====================

pub(crate) async fn get_or_create_account(
    conn: &mut SqliteConnection,
    user_id: i64,
) -> AppResult<LoyaltyAccount> {
    if let Some(account) = repository::loyalty::find_account_by_user(&mut *conn, user_id).await? {
        return Ok(account);
    }
    let now = now_millis();
    let account = LoyaltyAccount {
        id: snowflake_id(),
        user_id,
        balance: 0,
        created_at: now,
        updated_at: now,
    };
    repository::loyalty::insert_account(&mut *conn, &account).await?;
    tracing::debug!(user_id, account_id = account.id, "loyalty account created");
    Ok(account)
}

pub(crate) async fn append_entry(
    conn: &mut SqliteConnection,
    account_id: i64,
    kind: TransactionKind,
    points: i64,
    reason: String,
    reservation_id: Option<i64>,
) -> AppResult<LoyaltyTransaction> {
    let entry = LoyaltyTransaction {
        id: snowflake_id(),
        account_id,
        kind,
        points,
        reason,
        reservation_id,
        created_at: now_millis(),
    };
    repository::loyalty::insert_transaction(&mut *conn, &entry).await?;
    repository::loyalty::adjust_balance(&mut *conn, account_id, entry.signed_points(), entry.created_at)
        .await?;
    Ok(entry)
}

/// Balance check + REDEEM append on the caller's transaction. The caller
/// holds the write lock, so the balance read here cannot go stale before the
/// append commits.
pub(crate) async fn redeem_in_tx(
    conn: &mut SqliteConnection,
    user_id: i64,
    points: i64,
    reason: String,
    reservation_id: Option<i64>,
) -> AppResult<LoyaltyTransaction> {
    let account = repository::loyalty::find_account_by_user(&mut *conn, user_id).await?;
    let balance = account.as_ref().map_or(0, |a| a.balance);
    if points > balance {
        return Err(AppError::insufficient_balance(points, balance));
    }
    // points > 0 and points <= balance, so the account exists
    let account = account
        .ok_or_else(|| AppError::not_found(format!("Loyalty account for user {user_id}")))?;
    append_entry(
        conn,
        account.id,
        TransactionKind::Redeem,
        points,
        reason,
        reservation_id,
    )
    .await
}

// ==================== Service ====================

/// Earn/redeem operations and balance queries
#[derive(Clone)]
pub struct LoyaltyService {
    db: DbService,
    directory: SharedDirectory,
    config: Config,
}

impl LoyaltyService {
    pub fn new(db: DbService, directory: SharedDirectory, config: Config) -> Self {
        Self {
            db,
            directory,
            config,
        }
    }

    /// Convert a monetary amount to points and append an EARN entry,
    /// creating the account on first use.
    pub async fn earn(
        &self,
        user_id: i64,
        amount: Money,
        reason: impl Into<String>,
        reservation_id: Option<i64>,
    ) -> AppResult<LoyaltyTransaction> {
        require_active_user(&self.directory, user_id).await?;
        if amount.is_negative() || amount.is_zero() {
            return Err(AppError::validation(format!(
                "Earn amount must be positive: {amount}"
            )));
        }
        let points = points_for_amount(&amount, &self.config);
        if points == 0 {
            return Err(AppError::validation(format!(
                "Amount {amount} is too small to earn points"
            )));
        }

        let mut tx = self.db.begin_immediate().await?;
        let account = get_or_create_account(&mut *tx, user_id).await?;
        let entry = append_entry(
            &mut *tx,
            account.id,
            TransactionKind::Earn,
            points,
            reason.into(),
            reservation_id,
        )
        .await?;
        commit(tx).await?;

        tracing::info!(user_id, points, transaction_id = entry.id, "points earned");
        Ok(entry)
    }

    /// Redeem points. Rejected with `InsufficientBalance` when the balance —
    /// re-read under the write lock — does not cover the request.
    pub async fn redeem(
        &self,
        user_id: i64,
        points: i64,
        reason: impl Into<String>,
        reservation_id: Option<i64>,
    ) -> AppResult<LoyaltyTransaction> {
        require_active_user(&self.directory, user_id).await?;
        if points <= 0 {
            return Err(AppError::validation("Redeemed points must be positive"));
        }
        if points < self.config.min_redeem_points {
            return Err(AppError::validation(format!(
                "Minimum redemption is {} points",
                self.config.min_redeem_points
            ))
            .with_detail("min_redeem_points", self.config.min_redeem_points));
        }

        let mut tx = self.db.begin_immediate().await?;
        let entry = redeem_in_tx(&mut *tx, user_id, points, reason.into(), reservation_id).await?;
        commit(tx).await?;

        tracing::info!(user_id, points, transaction_id = entry.id, "points redeemed");
        Ok(entry)
    }

    /// Cached balance; 0 for a user who never touched the ledger
    pub async fn balance(&self, user_id: i64) -> AppResult<i64> {
        require_active_user(&self.directory, user_id).await?;
        let account = repository::loyalty::find_account_by_user(&self.db.pool, user_id).await?;
        Ok(account.map_or(0, |a| a.balance))
    }

    /// The account's full transaction history, oldest first
    pub async fn history(&self, user_id: i64) -> AppResult<Vec<LoyaltyTransaction>> {
        require_active_user(&self.directory, user_id).await?;
        match repository::loyalty::find_account_by_user(&self.db.pool, user_id).await? {
            Some(account) => {
                Ok(repository::loyalty::list_transactions(&self.db.pool, account.id).await?)
            }
            None => Ok(Vec::new()),
        }
    }

    /// Quote earn/redeem numbers for an amount without touching state
    pub fn calculate_points(&self, amount: &Money) -> AppResult<PointsQuote> {
        calculate_points(amount, &self.config)
    }

    /// Fold the transaction log and verify the cached balance matches,
    /// repairing it when it drifted. Returns the authoritative balance.
    pub async fn reconcile(&self, user_id: i64) -> AppResult<i64> {
        require_active_user(&self.directory, user_id).await?;
        let mut tx = self.db.begin_immediate().await?;
        let Some(account) = repository::loyalty::find_account_by_user(&mut *tx, user_id).await?
        else {
            return Ok(0);
        };
        let folded = repository::loyalty::fold_balance(&mut *tx, account.id).await?;
        if folded != account.balance {
            tracing::warn!(
                user_id,
                account_id = account.id,
                cached = account.balance,
                folded,
                "cached balance drifted from transaction log, repairing"
            );
            repository::loyalty::set_balance(&mut *tx, account.id, folded, now_millis()).await?;
        }
        commit(tx).await?;
        Ok(folded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config {
            db_path: ":memory:".into(),
            earn_points_per_unit: 1,
            point_value_cents: 1,
            min_redeem_points: 100,
        }
    }

    fn eur(cents: i64) -> Money {
        Money::new(Decimal::new(cents, 2), Currency::Eur)
    }

    #[test]
    fn earn_conversion_floors() {
        let cfg = config();
        assert_eq!(points_for_amount(&eur(100_00), &cfg), 100);
        assert_eq!(points_for_amount(&eur(99_99), &cfg), 99);
        assert_eq!(points_for_amount(&eur(99), &cfg), 0);
    }

    #[test]
    fn earn_rate_scales() {
        let mut cfg = config();
        cfg.earn_points_per_unit = 3;
        assert_eq!(points_for_amount(&eur(10_50), &cfg), 31);
    }

    #[test]
    fn quote_clamps_redeemable_to_amount() {
        let cfg = config();
        let quote = calculate_points(&eur(25_50), &cfg).unwrap();
        assert_eq!(quote.points_earned, 25);
        // one point is worth €0.01, so €25.50 absorbs at most 2550 points
        assert_eq!(quote.max_redeemable_points, 2550);
        assert_eq!(quote.discount, eur(25_50));
    }

    #[test]
    fn quote_rejects_negative_amount() {
        let cfg = config();
        let negative = Money {
            amount: Decimal::new(-100, 2),
            currency: Currency::Eur,
        };
        assert!(calculate_points(&negative, &cfg).is_err());
    }

    #[test]
    fn discount_value_follows_point_value() {
        let mut cfg = config();
        cfg.point_value_cents = 5;
        assert_eq!(discount_for(100, Currency::Eur, &cfg), eur(5_00));
    }
}
