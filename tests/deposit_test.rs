//! Deposit and transition trail tests.
//!
//! Requires a migrated PostgreSQL database; run with `cargo test -- --ignored`.

mod common;

use chrono::{Datelike, Utc};
use serial_test::serial;
use uuid::Uuid;

use common::{cleanup_test_store, get_test_pool, setup_test_store, store_balance};
use pettycash_rs::contracts::deposit_v1::AddCashRequest;
use pettycash_rs::services::deposit_service::{self, DepositServiceError};

fn deposit(store_id: Uuid, amount_minor: i64) -> AddCashRequest {
    AddCashRequest {
        store_id,
        depositor_id: Uuid::new_v4(),
        company_id: None,
        payment_mode: "Cash".to_string(),
        cheque_date: None,
        cheque_number: None,
        bank_name: None,
        upi_reference: None,
        amount_minor,
    }
}

#[tokio::test]
#[serial]
#[ignore]
async fn deposits_sequence_their_transition_ids() {
    let pool = get_test_pool().await;
    let cost_code = "DEP1";
    let store_id = setup_test_store(&pool, cost_code, "Deposit Store").await;
    let year = Utc::now().year();

    // First deposit creates the balance row
    let first = deposit_service::add_cash(&pool, &deposit(store_id, 40_000))
        .await
        .expect("first deposit failed");
    assert_eq!(first.transition_id, format!("{cost_code}-CR-{year}-001"));
    assert_eq!(first.balance_minor, 40_000);

    let second = deposit_service::add_cash(&pool, &deposit(store_id, 10_000))
        .await
        .expect("second deposit failed");
    assert_eq!(second.transition_id, format!("{cost_code}-CR-{year}-002"));
    assert_eq!(second.balance_minor, 50_000);

    assert_eq!(store_balance(&pool, store_id).await, 50_000);

    cleanup_test_store(&pool, cost_code, store_id).await;
}

#[tokio::test]
#[serial]
#[ignore]
async fn non_positive_deposits_are_rejected() {
    let pool = get_test_pool().await;
    let cost_code = "DEP2";
    let store_id = setup_test_store(&pool, cost_code, "Zero Deposit Store").await;

    let err = deposit_service::add_cash(&pool, &deposit(store_id, 0))
        .await
        .unwrap_err();
    assert!(matches!(err, DepositServiceError::NonPositiveAmount(0)));

    let err = deposit_service::add_cash(&pool, &deposit(store_id, -500))
        .await
        .unwrap_err();
    assert!(matches!(err, DepositServiceError::NonPositiveAmount(-500)));

    cleanup_test_store(&pool, cost_code, store_id).await;
}

#[tokio::test]
#[serial]
#[ignore]
async fn unknown_store_is_rejected() {
    let pool = get_test_pool().await;

    let err = deposit_service::add_cash(&pool, &deposit(Uuid::new_v4(), 1_000))
        .await
        .unwrap_err();
    assert!(matches!(err, DepositServiceError::StoreNotFound(_)));
}

#[tokio::test]
#[serial]
#[ignore]
async fn transition_trail_lists_credits_most_recent_first() {
    let pool = get_test_pool().await;
    let cost_code = "DEP3";
    let store_id = setup_test_store(&pool, cost_code, "Trail Store").await;

    deposit_service::add_cash(&pool, &deposit(store_id, 20_000))
        .await
        .expect("first deposit failed");
    deposit_service::add_cash(&pool, &deposit(store_id, 5_000))
        .await
        .expect("second deposit failed");

    let trail = deposit_service::store_transitions(&pool, store_id)
        .await
        .expect("trail read failed");

    assert_eq!(trail.transitions.len(), 2);
    assert_eq!(trail.transitions[0].amount_minor, 5_000);
    assert_eq!(trail.transitions[0].balance_minor, 25_000);
    assert_eq!(trail.transitions[1].amount_minor, 20_000);
    assert!(trail
        .transitions
        .iter()
        .all(|t| t.transition_type == "Credit"));

    cleanup_test_store(&pool, cost_code, store_id).await;
}
