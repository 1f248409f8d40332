//! Availability index
//!
//! Pure query logic over persisted reservations. Only CONFIRMED rows block a
//! window; PENDING, CANCELLED and REASSIGNED never do.

use crate::db::{repository, DbService};
use chrono::NaiveDate;
use shared::{AppError, AppResult};

/// Half-open interval overlap: `[a_start, a_end)` and `[b_start, b_end)`
/// share at least one day iff `a_start < b_end && b_start < a_end`.
/// Touching endpoints (`a_end == b_start`) do not overlap.
pub fn overlaps(
    a_start: NaiveDate,
    a_end: NaiveDate,
    b_start: NaiveDate,
    b_end: NaiveDate,
) -> bool {
    a_start < b_end && b_start < a_end
}

/// Read-only availability queries
///
/// The public query is advisory: it takes no lock, so a positive answer is
/// not a hold. Writes re-run the same probe inside their own transaction.
#[derive(Clone)]
pub struct AvailabilityService {
    db: DbService,
}

impl AvailabilityService {
    pub fn new(db: DbService) -> Self {
        Self { db }
    }

    /// Is `[check_in, check_out)` free of CONFIRMED reservations on this
    /// resource?
    pub async fn is_available(
        &self,
        resource_id: i64,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> AppResult<bool> {
        if check_in >= check_out {
            return Err(AppError::validation(format!(
                "Check-out ({check_out}) must be after check-in ({check_in})"
            )));
        }
        let taken = repository::reservation::has_overlap(
            &self.db.pool,
            resource_id,
            check_in,
            check_out,
            None,
        )
        .await?;
        Ok(!taken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn plain_overlap() {
        assert!(overlaps(d("2026-01-10"), d("2026-01-12"), d("2026-01-11"), d("2026-01-13")));
    }

    #[test]
    fn containment_overlaps() {
        assert!(overlaps(d("2026-01-10"), d("2026-01-20"), d("2026-01-12"), d("2026-01-14")));
        assert!(overlaps(d("2026-01-12"), d("2026-01-14"), d("2026-01-10"), d("2026-01-20")));
    }

    #[test]
    fn identical_intervals_overlap() {
        assert!(overlaps(d("2026-01-10"), d("2026-01-12"), d("2026-01-10"), d("2026-01-12")));
    }

    #[test]
    fn back_to_back_does_not_overlap() {
        // one ends exactly when the other begins
        assert!(!overlaps(d("2026-01-10"), d("2026-01-12"), d("2026-01-12"), d("2026-01-14")));
        assert!(!overlaps(d("2026-01-12"), d("2026-01-14"), d("2026-01-10"), d("2026-01-12")));
    }

    #[test]
    fn disjoint_intervals_do_not_overlap() {
        assert!(!overlaps(d("2026-01-10"), d("2026-01-12"), d("2026-02-01"), d("2026-02-03")));
    }
}
