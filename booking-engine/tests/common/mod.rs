//! Shared test fixture: a fully initialized engine on a throwaway database
//! with a small in-memory catalog and directory.
#![allow(dead_code)]

use booking_engine::{BookingEngine, Config, InMemoryCatalog, InMemoryDirectory};
use chrono::{Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use shared::models::{Currency, Money, Reservation, ReservationCreate, Resource, UserRecord, UserRole};
use std::sync::Arc;
use tempfile::TempDir;

pub const ROOM_SINGLE: i64 = 1;
pub const ROOM_DOUBLE: i64 = 2;
pub const EVENT_HALL: i64 = 3;

pub const ALICE: i64 = 101;
pub const BOB: i64 = 102;
pub const CLOSED_ACCOUNT: i64 = 103;

pub struct TestEngine {
    pub engine: BookingEngine,
    // keeps the database directory alive for the test's duration
    _dir: TempDir,
}

pub async fn setup() -> TestEngine {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("booking_engine=debug")
        .with_test_writer()
        .try_init();

    let dir = TempDir::new().expect("temp dir");
    let config = Config {
        db_path: dir.path().join("booking.db").to_string_lossy().into_owned(),
        earn_points_per_unit: 1,
        point_value_cents: 1,
        min_redeem_points: 100,
    };

    let catalog = Arc::new(InMemoryCatalog::new([
        resource(ROOM_SINGLE, "Room 1", 2, 80_50),
        resource(ROOM_DOUBLE, "Room 2", 4, 120_00),
        resource(EVENT_HALL, "Main hall", 200, 1500_00),
    ]));
    let directory = Arc::new(InMemoryDirectory::new([
        user(ALICE, true),
        user(BOB, true),
        user(CLOSED_ACCOUNT, false),
    ]));

    let engine = BookingEngine::initialize(config, catalog, directory)
        .await
        .expect("engine init");
    TestEngine { engine, _dir: dir }
}

pub fn resource(id: i64, name: &str, capacity: u32, price_cents: i64) -> Resource {
    Resource {
        id,
        name: name.to_string(),
        capacity,
        unit_price: eur(price_cents),
    }
}

pub fn user(id: i64, active: bool) -> UserRecord {
    UserRecord {
        id,
        role: UserRole::Client,
        active,
    }
}

pub fn eur(cents: i64) -> Money {
    Money::new(Decimal::new(cents, 2), Currency::Eur)
}

/// `n` days from today; validation requires stays not to start in the past
pub fn day(n: i64) -> NaiveDate {
    Utc::now().date_naive() + Duration::days(n)
}

pub fn stay(resource_id: i64, client_id: i64, check_in: i64, check_out: i64) -> ReservationCreate {
    ReservationCreate {
        resource_id,
        client_id,
        check_in: day(check_in),
        check_out: day(check_out),
        guests: 2,
    }
}

pub fn confirmed_intervals(reservations: &[Reservation]) -> Vec<(NaiveDate, NaiveDate)> {
    reservations
        .iter()
        .filter(|r| r.status == shared::models::ReservationStatus::Confirmed)
        .map(|r| (r.check_in, r.check_out))
        .collect()
}
