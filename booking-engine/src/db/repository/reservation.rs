//! Reservation repository
//!
//! Money is stored as a canonical decimal string plus a currency column, so
//! rows are mapped by hand instead of through `FromRow`.

use super::{RepoError, RepoResult};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use shared::models::{Currency, Money, Reservation, ReservationStatus};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteExecutor};
use std::str::FromStr;

const RESERVATION_SELECT: &str = "SELECT id, resource_id, client_id, check_in, check_out, guests, total_amount, currency, status, points_redeemed, created_at, updated_at FROM reservation";

fn from_row(row: &SqliteRow) -> RepoResult<Reservation> {
    let raw_amount: String = row.try_get("total_amount")?;
    let amount = Decimal::from_str(&raw_amount)
        .map_err(|e| RepoError::Database(format!("Bad stored amount {raw_amount:?}: {e}")))?;
    let currency: Currency = row.try_get("currency")?;
    Ok(Reservation {
        id: row.try_get("id")?,
        resource_id: row.try_get("resource_id")?,
        client_id: row.try_get("client_id")?,
        check_in: row.try_get("check_in")?,
        check_out: row.try_get("check_out")?,
        guests: row.try_get("guests")?,
        total: Money::new(amount, currency),
        status: row.try_get("status")?,
        points_redeemed: row.try_get("points_redeemed")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

pub async fn insert(ex: impl SqliteExecutor<'_>, rsv: &Reservation) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO reservation (id, resource_id, client_id, check_in, check_out, guests, total_amount, currency, status, points_redeemed, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
    )
    .bind(rsv.id)
    .bind(rsv.resource_id)
    .bind(rsv.client_id)
    .bind(rsv.check_in)
    .bind(rsv.check_out)
    .bind(rsv.guests)
    .bind(rsv.total.amount.to_string())
    .bind(rsv.total.currency)
    .bind(rsv.status)
    .bind(rsv.points_redeemed)
    .bind(rsv.created_at)
    .bind(rsv.updated_at)
    .execute(ex)
    .await?;
    Ok(())
}

pub async fn find_by_id(ex: impl SqliteExecutor<'_>, id: i64) -> RepoResult<Option<Reservation>> {
    let sql = format!("{RESERVATION_SELECT} WHERE id = ?");
    let row = sqlx::query(&sql).bind(id).fetch_optional(ex).await?;
    row.as_ref().map(from_row).transpose()
}

/// Does any CONFIRMED reservation on `resource_id` overlap
/// `[check_in, check_out)`?
///
/// Half-open semantics: rows with `check_out == check_in` of the probe (or
/// vice versa) do not overlap, so back-to-back stays pass. Must run on the
/// same transaction as the write that depends on the answer.
pub async fn has_overlap(
    ex: impl SqliteExecutor<'_>,
    resource_id: i64,
    check_in: NaiveDate,
    check_out: NaiveDate,
    exclude: Option<i64>,
) -> RepoResult<bool> {
    let overlapping: i64 = sqlx::query_scalar(
        "SELECT EXISTS (SELECT 1 FROM reservation WHERE resource_id = ?1 AND status = 'CONFIRMED' AND check_in < ?3 AND ?2 < check_out AND (?4 IS NULL OR id <> ?4))",
    )
    .bind(resource_id)
    .bind(check_in)
    .bind(check_out)
    .bind(exclude)
    .fetch_one(ex)
    .await?;
    Ok(overlapping != 0)
}

pub async fn update_stay(
    ex: impl SqliteExecutor<'_>,
    id: i64,
    check_in: NaiveDate,
    check_out: NaiveDate,
    guests: u32,
    total: Money,
    updated_at: i64,
) -> RepoResult<()> {
    let rows = sqlx::query(
        "UPDATE reservation SET check_in = ?1, check_out = ?2, guests = ?3, total_amount = ?4, currency = ?5, updated_at = ?6 WHERE id = ?7",
    )
    .bind(check_in)
    .bind(check_out)
    .bind(guests)
    .bind(total.amount.to_string())
    .bind(total.currency)
    .bind(updated_at)
    .bind(id)
    .execute(ex)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Reservation {id}")));
    }
    Ok(())
}

pub async fn set_status(
    ex: impl SqliteExecutor<'_>,
    id: i64,
    status: ReservationStatus,
    updated_at: i64,
) -> RepoResult<()> {
    let rows = sqlx::query("UPDATE reservation SET status = ?1, updated_at = ?2 WHERE id = ?3")
        .bind(status)
        .bind(updated_at)
        .bind(id)
        .execute(ex)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Reservation {id}")));
    }
    Ok(())
}

pub async fn list_for_client(
    ex: impl SqliteExecutor<'_>,
    client_id: i64,
) -> RepoResult<Vec<Reservation>> {
    let sql = format!("{RESERVATION_SELECT} WHERE client_id = ? ORDER BY check_in, id");
    let rows = sqlx::query(&sql).bind(client_id).fetch_all(ex).await?;
    rows.iter().map(from_row).collect()
}

pub async fn list_for_resource(
    ex: impl SqliteExecutor<'_>,
    resource_id: i64,
) -> RepoResult<Vec<Reservation>> {
    let sql = format!("{RESERVATION_SELECT} WHERE resource_id = ? ORDER BY check_in, id");
    let rows = sqlx::query(&sql).bind(resource_id).fetch_all(ex).await?;
    rows.iter().map(from_row).collect()
}
