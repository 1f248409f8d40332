//! Loyalty ledger repository
//!
//! `loyalty_transaction` is append-only: there is no UPDATE or DELETE path
//! for it anywhere in this module. The cached `loyalty_account.balance` moves
//! only together with an append, inside the caller's transaction.

use super::{RepoError, RepoResult};
use shared::models::{LoyaltyAccount, LoyaltyTransaction, TransactionKind};
use sqlx::SqliteExecutor;

pub async fn find_account_by_user(
    ex: impl SqliteExecutor<'_>,
    user_id: i64,
) -> RepoResult<Option<LoyaltyAccount>> {
    let account = sqlx::query_as::<_, LoyaltyAccount>(
        "SELECT id, user_id, balance, created_at, updated_at FROM loyalty_account WHERE user_id = ?",
    )
    .bind(user_id)
    .fetch_optional(ex)
    .await?;
    Ok(account)
}

pub async fn insert_account(
    ex: impl SqliteExecutor<'_>,
    account: &LoyaltyAccount,
) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO loyalty_account (id, user_id, balance, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5)",
    )
    .bind(account.id)
    .bind(account.user_id)
    .bind(account.balance)
    .bind(account.created_at)
    .bind(account.updated_at)
    .execute(ex)
    .await?;
    Ok(())
}

/// Shift the cached balance by `delta` (negative for redemptions). The
/// `balance >= 0` CHECK is a backstop; callers verify the balance first in
/// the same transaction.
pub async fn adjust_balance(
    ex: impl SqliteExecutor<'_>,
    account_id: i64,
    delta: i64,
    updated_at: i64,
) -> RepoResult<()> {
    let rows = sqlx::query(
        "UPDATE loyalty_account SET balance = balance + ?1, updated_at = ?2 WHERE id = ?3",
    )
    .bind(delta)
    .bind(updated_at)
    .bind(account_id)
    .execute(ex)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Loyalty account {account_id}")));
    }
    Ok(())
}

/// Overwrite the cached balance (reconciliation repair only)
pub async fn set_balance(
    ex: impl SqliteExecutor<'_>,
    account_id: i64,
    balance: i64,
    updated_at: i64,
) -> RepoResult<()> {
    sqlx::query("UPDATE loyalty_account SET balance = ?1, updated_at = ?2 WHERE id = ?3")
        .bind(balance)
        .bind(updated_at)
        .bind(account_id)
        .execute(ex)
        .await?;
    Ok(())
}

pub async fn insert_transaction(
    ex: impl SqliteExecutor<'_>,
    tx: &LoyaltyTransaction,
) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO loyalty_transaction (id, account_id, kind, points, reason, reservation_id, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    )
    .bind(tx.id)
    .bind(tx.account_id)
    .bind(tx.kind)
    .bind(tx.points)
    .bind(&tx.reason)
    .bind(tx.reservation_id)
    .bind(tx.created_at)
    .execute(ex)
    .await?;
    Ok(())
}

pub async fn list_transactions(
    ex: impl SqliteExecutor<'_>,
    account_id: i64,
) -> RepoResult<Vec<LoyaltyTransaction>> {
    let rows = sqlx::query_as::<_, LoyaltyTransaction>(
        "SELECT id, account_id, kind, points, reason, reservation_id, created_at FROM loyalty_transaction WHERE account_id = ? ORDER BY created_at, id",
    )
    .bind(account_id)
    .fetch_all(ex)
    .await?;
    Ok(rows)
}

/// Signed sum of the account's transaction log — the authoritative balance
pub async fn fold_balance(ex: impl SqliteExecutor<'_>, account_id: i64) -> RepoResult<i64> {
    let sum: i64 = sqlx::query_scalar(
        "SELECT COALESCE(SUM(CASE kind WHEN 'EARN' THEN points ELSE -points END), 0) FROM loyalty_transaction WHERE account_id = ?",
    )
    .bind(account_id)
    .fetch_one(ex)
    .await?;
    Ok(sum)
}

/// Total points of `kind` linked to one reservation (used by reversals)
pub async fn sum_for_reservation(
    ex: impl SqliteExecutor<'_>,
    account_id: i64,
    reservation_id: i64,
    kind: TransactionKind,
) -> RepoResult<i64> {
    let sum: i64 = sqlx::query_scalar(
        "SELECT COALESCE(SUM(points), 0) FROM loyalty_transaction WHERE account_id = ?1 AND reservation_id = ?2 AND kind = ?3",
    )
    .bind(account_id)
    .bind(reservation_id)
    .bind(kind)
    .fetch_one(ex)
    .await?;
    Ok(sum)
}
