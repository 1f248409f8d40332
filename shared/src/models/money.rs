//! Currency-tagged money
//!
//! All monetary arithmetic runs on `rust_decimal::Decimal`; `f64` never
//! touches a price. Amounts are rounded to 2 decimal places, half-up.
//! At rest the amount is stored as a canonical decimal string next to its
//! currency column.

use crate::error::AppError;
use rust_decimal::prelude::*;
use rust_decimal::RoundingStrategy;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Rounding scale for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Supported currencies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "UPPERCASE"))]
pub enum Currency {
    Eur,
    Usd,
    Gbp,
}

impl Currency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eur => "EUR",
            Self::Usd => "USD",
            Self::Gbp => "GBP",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Currency {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "EUR" => Ok(Self::Eur),
            "USD" => Ok(Self::Usd),
            "GBP" => Ok(Self::Gbp),
            other => Err(AppError::validation(format!("Unknown currency: {other}"))),
        }
    }
}

/// A fixed-point monetary amount tagged with its currency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    pub amount: Decimal,
    pub currency: Currency,
}

impl Money {
    /// Create a money value, rounding the amount to 2 decimal places
    pub fn new(amount: Decimal, currency: Currency) -> Self {
        Self {
            amount: round(amount),
            currency,
        }
    }

    pub fn zero(currency: Currency) -> Self {
        Self {
            amount: Decimal::ZERO,
            currency,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.amount.is_sign_negative() && !self.amount.is_zero()
    }

    /// Add two amounts; mixed currencies are a validation error
    pub fn checked_add(self, other: Money) -> Result<Money, AppError> {
        self.require_same_currency(other)?;
        Ok(Money::new(self.amount + other.amount, self.currency))
    }

    /// Subtract `other`; mixed currencies or a negative result are rejected
    pub fn checked_sub(self, other: Money) -> Result<Money, AppError> {
        self.require_same_currency(other)?;
        let amount = self.amount - other.amount;
        if amount.is_sign_negative() {
            return Err(AppError::validation(format!(
                "Amount would be negative: {} - {}",
                self, other
            )));
        }
        Ok(Money::new(amount, self.currency))
    }

    /// Multiply by a unit count (e.g. nights)
    pub fn mul(self, factor: i64) -> Money {
        Money::new(self.amount * Decimal::from(factor), self.currency)
    }

    fn require_same_currency(&self, other: Money) -> Result<(), AppError> {
        if self.currency != other.currency {
            return Err(AppError::validation(format!(
                "Currency mismatch: {} vs {}",
                self.currency, other.currency
            )));
        }
        Ok(())
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", round(self.amount), self.currency)
    }
}

fn round(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eur(s: &str) -> Money {
        Money::new(Decimal::from_str_exact(s).unwrap(), Currency::Eur)
    }

    #[test]
    fn addition_keeps_precision() {
        // Classic floating point problem: 0.1 + 0.2 != 0.3
        let sum = eur("0.10").checked_add(eur("0.20")).unwrap();
        assert_eq!(sum, eur("0.30"));
    }

    #[test]
    fn subtraction_rejects_negative_result() {
        let err = eur("10.00").checked_sub(eur("10.01")).unwrap_err();
        assert_eq!(err.code, crate::ErrorCode::ValidationFailed);
    }

    #[test]
    fn mixed_currency_is_rejected() {
        let gbp = Money::new(Decimal::ONE, Currency::Gbp);
        assert!(eur("1.00").checked_add(gbp).is_err());
    }

    #[test]
    fn multiplication_rounds_half_up() {
        let nightly = eur("33.335");
        // constructor already rounds to 2dp (33.34), then multiplies
        assert_eq!(nightly.mul(3), eur("100.02"));
    }
}
