//! Engine configuration
//!
//! # Environment variables
//!
//! All configuration can be overridden through environment variables:
//!
//! | env var | default | meaning |
//! |---------|---------|---------|
//! | BOOKING_DB_PATH | booking.db | SQLite database file |
//! | EARN_POINTS_PER_UNIT | 1 | points earned per whole currency unit spent |
//! | POINT_VALUE_CENTS | 1 | redemption value of one point, in cents |
//! | MIN_REDEEM_POINTS | 100 | smallest redemption the ledger admits |

/// Engine configuration with the loyalty conversion rates
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite database file path
    pub db_path: String,
    /// Points earned per whole currency unit spent (floor conversion)
    pub earn_points_per_unit: i64,
    /// Redemption value of a single point, in cents of the booking currency
    pub point_value_cents: i64,
    /// Minimum points per redemption
    pub min_redeem_points: i64,
}

impl Config {
    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        Self {
            db_path: std::env::var("BOOKING_DB_PATH").unwrap_or_else(|_| "booking.db".into()),
            earn_points_per_unit: std::env::var("EARN_POINTS_PER_UNIT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1),
            point_value_cents: std::env::var("POINT_VALUE_CENTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1),
            min_redeem_points: std::env::var("MIN_REDEEM_POINTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(100),
        }
    }

    /// Override the database path, keeping everything else from the
    /// environment. Common in test setups.
    pub fn with_db_path(db_path: impl Into<String>) -> Self {
        let mut config = Self::from_env();
        config.db_path = db_path.into();
        config
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
