//! Race tests: the invariants must hold under concurrent writers, not just
//! sequential calls. Tasks run on a multi-thread runtime against one shared
//! database file.

mod common;

use common::*;
use booking_engine::services::availability::overlaps;
use rand::Rng;
use shared::models::ReservationStatus;
use shared::ErrorCode;

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn only_one_of_many_overlapping_bookings_commits() {
    let t = setup().await;

    let mut handles = Vec::new();
    for i in 0..8 {
        let engine = t.engine.clone();
        handles.push(tokio::spawn(async move {
            let client = if i % 2 == 0 { ALICE } else { BOB };
            engine.reservations.create(stay(ROOM_SINGLE, client, 10, 12)).await
        }));
    }

    let mut confirmed = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(rsv) => {
                confirmed += 1;
                assert_eq!(rsv.status, ReservationStatus::Confirmed);
            }
            Err(err) => assert_eq!(err.code, ErrorCode::Conflict),
        }
    }
    assert_eq!(confirmed, 1, "exactly one of the racers may commit");

    let rows = t.engine.reservations.list_for_resource(ROOM_SINGLE).await.unwrap();
    assert_eq!(confirmed_intervals(&rows).len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn random_interval_storm_leaves_a_maximal_disjoint_set() {
    let t = setup().await;

    // random windows in a 30-day horizon, booked concurrently on one resource
    let windows: Vec<(i64, i64)> = {
        let mut rng = rand::thread_rng();
        (0..60)
            .map(|_| {
                let start = rng.gen_range(5..35);
                let len = rng.gen_range(1..5);
                (start, start + len)
            })
            .collect()
    };

    let mut handles = Vec::new();
    for &(start, end) in &windows {
        let engine = t.engine.clone();
        handles.push(tokio::spawn(async move {
            let result = engine.reservations.create(stay(EVENT_HALL, ALICE, start, end)).await;
            (start, end, result)
        }));
    }

    let mut rejected = Vec::new();
    for handle in handles {
        let (start, end, result) = handle.await.unwrap();
        match result {
            Ok(_) => {}
            Err(err) => {
                assert_eq!(err.code, ErrorCode::Conflict);
                rejected.push((day(start), day(end)));
            }
        }
    }

    let rows = t.engine.reservations.list_for_resource(EVENT_HALL).await.unwrap();
    let confirmed = confirmed_intervals(&rows);

    // pairwise disjoint
    for (i, &(a_start, a_end)) in confirmed.iter().enumerate() {
        for &(b_start, b_end) in confirmed.iter().skip(i + 1) {
            assert!(
                !overlaps(a_start, a_end, b_start, b_end),
                "confirmed reservations overlap: [{a_start},{a_end}) vs [{b_start},{b_end})"
            );
        }
    }

    // maximal: every rejected window collides with something that committed
    for &(start, end) in &rejected {
        assert!(
            confirmed
                .iter()
                .any(|&(c_start, c_end)| overlaps(start, end, c_start, c_end)),
            "[{start},{end}) was rejected but conflicts with nothing"
        );
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_redeems_cannot_overdraw() {
    let t = setup().await;

    t.engine
        .loyalty
        .earn(ALICE, eur(1000_00), "Stays", None)
        .await
        .unwrap();

    // two redeems of 80% of the balance; each pre-check alone would pass
    let mut handles = Vec::new();
    for _ in 0..2 {
        let engine = t.engine.clone();
        handles.push(tokio::spawn(async move {
            engine.loyalty.redeem(ALICE, 800, "Discount", None).await
        }));
    }

    let mut succeeded = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => succeeded += 1,
            Err(err) => assert_eq!(err.code, ErrorCode::InsufficientBalance),
        }
    }
    assert_eq!(succeeded, 1, "exactly one redemption may pass");

    let balance = t.engine.loyalty.balance(ALICE).await.unwrap();
    assert_eq!(balance, 200);
    assert_eq!(t.engine.loyalty.reconcile(ALICE).await.unwrap(), 200);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_combined_bookings_share_one_balance() {
    let t = setup().await;

    t.engine
        .loyalty
        .earn(ALICE, eur(300_00), "Stays", None)
        .await
        .unwrap();

    // three disjoint windows, each trying to redeem 150 of a 300 balance
    let mut handles = Vec::new();
    for i in 0..3i64 {
        let engine = t.engine.clone();
        handles.push(tokio::spawn(async move {
            let start = 10 + i * 4;
            engine
                .orchestrator
                .book_with_points(stay(ROOM_SINGLE, ALICE, start, start + 2), 150)
                .await
        }));
    }

    let mut succeeded = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(outcome) => {
                succeeded += 1;
                assert_eq!(outcome.reservation.points_redeemed, 150);
            }
            Err(err) => assert_eq!(err.code, ErrorCode::InsufficientBalance),
        }
    }
    // windows are disjoint, so only the ledger arbitrates: 300 covers two
    assert_eq!(succeeded, 2);
    assert_eq!(t.engine.loyalty.balance(ALICE).await.unwrap(), 0);

    let rows = t.engine.reservations.list_for_resource(ROOM_SINGLE).await.unwrap();
    assert_eq!(confirmed_intervals(&rows).len(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn different_resources_do_not_contend() {
    let t = setup().await;

    // same window on three different resources: all must commit
    let mut handles = Vec::new();
    for resource_id in [ROOM_SINGLE, ROOM_DOUBLE, EVENT_HALL] {
        let engine = t.engine.clone();
        handles.push(tokio::spawn(async move {
            engine.reservations.create(stay(resource_id, ALICE, 10, 12)).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }
}
