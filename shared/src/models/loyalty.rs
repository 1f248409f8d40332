//! Loyalty ledger models
//!
//! The transaction log is the source of truth; `LoyaltyAccount.balance` is a
//! materialized view maintained in the same transaction as every append and
//! re-derivable at any time by folding the log.

use super::money::Money;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One loyalty account per user, created on first use
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct LoyaltyAccount {
    pub id: i64,
    pub user_id: i64,
    /// Cached signed sum of the account's transactions; never negative
    pub balance: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Direction of a ledger entry (TEXT at rest)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum TransactionKind {
    Earn,
    Redeem,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Earn => "EARN",
            Self::Redeem => "REDEEM",
        }
    }

    /// +1 for EARN, -1 for REDEEM
    pub fn sign(&self) -> i64 {
        match self {
            Self::Earn => 1,
            Self::Redeem => -1,
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable ledger entry; corrections append offsetting entries, history is
/// never edited
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct LoyaltyTransaction {
    pub id: i64,
    pub account_id: i64,
    pub kind: TransactionKind,
    /// Always positive; the kind carries the sign
    pub points: i64,
    pub reason: String,
    /// Reservation this entry is tied to, if any
    pub reservation_id: Option<i64>,
    pub created_at: i64,
}

impl LoyaltyTransaction {
    /// Signed contribution of this entry to the balance
    pub fn signed_points(&self) -> i64 {
        self.kind.sign() * self.points
    }
}

/// Advisory quote from the pure points calculator
///
/// Balances can move between a quote and the redeem call that follows it;
/// callers must treat these numbers as estimates, not holds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointsQuote {
    /// Points an EARN on this amount would append
    pub points_earned: i64,
    /// Discount if `max_redeemable_points` were redeemed
    pub discount: Money,
    /// Largest redemption this amount can absorb (a discount never exceeds
    /// the amount itself)
    pub max_redeemable_points: i64,
}
