//! End-to-end voucher lifecycle tests: create, approve, OTP-gated cancel.
//!
//! Requires a migrated PostgreSQL database; run with `cargo test -- --ignored`.

mod common;

use serial_test::serial;
use uuid::Uuid;

use common::{
    cleanup_test_store, get_test_pool, seed_store_balance, setup_test_company,
    setup_test_department, setup_test_store, store_balance,
};
use pettycash_rs::contracts::bill_batch_v1::{BillBatchRequest, BillItem, BillType};
use pettycash_rs::contracts::cancel_v1::{
    ApproveBillRequest, CancelBillRequest, CancelByUserRequest,
};
use pettycash_rs::services::{
    approval_service::{self, ApprovalError},
    bill_service,
    cancellation_service::{self, CancellationError},
};

fn item(supplier: &str, amount_minor: i64) -> BillItem {
    BillItem {
        supplier_name: supplier.to_string(),
        nature_of_expense: "Stationery".to_string(),
        head_of_accounts: "Office Expenses".to_string(),
        instructed_by: "Manager".to_string(),
        amount_minor,
        remarks: None,
        invoice_date: None,
        invoice_reference_number: None,
        supplier_gst: None,
        taxable_amount_minor: None,
        igst_rate_bp: None,
        cgst_rate_bp: None,
        sgst_rate_bp: None,
        igst_minor: None,
        cgst_minor: None,
        sgst_minor: None,
        rounding_off_minor: None,
    }
}

fn batch(cost_code: &str, store_id: Uuid, items: Vec<BillItem>) -> BillBatchRequest {
    BillBatchRequest {
        billtype: BillType::NonGst,
        user_id: Uuid::new_v4(),
        company_id: None,
        department_id: None,
        store_id: Some(store_id),
        cost_code: cost_code.to_string(),
        voucher_date: None,
        narration: None,
        items,
    }
}

#[tokio::test]
#[serial]
#[ignore]
async fn full_lifecycle_create_approve_cancel() {
    let pool = get_test_pool().await;
    let cost_code = "LIFE1";
    let store_id = setup_test_store(&pool, cost_code, "Lifecycle Store").await;
    seed_store_balance(&pool, store_id, 100_000).await;

    // Create a two-line voucher totalling 15,050 minor units
    let created = bill_service::create_batch(
        &pool,
        &batch(cost_code, store_id, vec![item("Acme Traders", 10_000), item("Beta Supplies", 5_050)]),
    )
    .await
    .expect("batch creation failed");
    assert_eq!(created.total_amount_minor, 15_050);

    let voucher = created.voucher_reference_number.clone();

    // Approve: debits the line total, not the request amount
    let approved = approval_service::approve_voucher(
        &pool,
        &voucher,
        &ApproveBillRequest {
            approved_by: Uuid::new_v4(),
            store_id,
            amount_minor: 15_050,
        },
    )
    .await
    .expect("approval failed");
    assert_eq!(approved.balance_minor, 84_950);
    assert_eq!(store_balance(&pool, store_id).await, 84_950);

    // Double approval is rejected and the ledger is untouched
    let err = approval_service::approve_voucher(
        &pool,
        &voucher,
        &ApproveBillRequest {
            approved_by: Uuid::new_v4(),
            store_id,
            amount_minor: 15_050,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApprovalError::AlreadyApproved(_)));
    assert_eq!(store_balance(&pool, store_id).await, 84_950);

    // Cancel with a freshly issued OTP; the full debit comes back
    let otp = cancellation_service::generate_cancel_otp(&pool, &voucher)
        .await
        .expect("OTP issue failed");

    let cancelled = cancellation_service::cancel_voucher(
        &pool,
        &voucher,
        &CancelBillRequest {
            otp: otp.otp_code.clone(),
            store_id,
            cancelled_by: Uuid::new_v4(),
            reason_for_reject: Some("duplicate entry".to_string()),
        },
    )
    .await
    .expect("cancellation failed");
    assert_eq!(cancelled.refunded_minor, 15_050);
    assert_eq!(cancelled.balance_minor, 100_000);
    assert_eq!(store_balance(&pool, store_id).await, 100_000);

    // The consumed OTP cannot be replayed
    let replay = cancellation_service::cancel_voucher(
        &pool,
        &voucher,
        &CancelBillRequest {
            otp: otp.otp_code,
            store_id,
            cancelled_by: Uuid::new_v4(),
            reason_for_reject: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(replay, CancellationError::AlreadyCancelled(_)));

    cleanup_test_store(&pool, cost_code, store_id).await;
}

#[tokio::test]
#[serial]
#[ignore]
async fn concurrent_approvals_debit_exactly_once() {
    let pool = get_test_pool().await;
    let cost_code = "LIFE6";
    let store_id = setup_test_store(&pool, cost_code, "Race Approve Store").await;
    seed_store_balance(&pool, store_id, 100_000).await;

    let created = bill_service::create_batch(
        &pool,
        &batch(cost_code, store_id, vec![item("Acme Traders", 10_000)]),
    )
    .await
    .expect("batch creation failed");
    let voucher = created.voucher_reference_number;

    let request = ApproveBillRequest {
        approved_by: Uuid::new_v4(),
        store_id,
        amount_minor: 10_000,
    };

    let (a, b) = tokio::join!(
        approval_service::approve_voucher(&pool, &voucher, &request),
        approval_service::approve_voucher(&pool, &voucher, &request),
    );

    // Exactly one wins; the loser rolls its debit back
    let ok_count = [a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count();
    assert_eq!(ok_count, 1);
    assert_eq!(store_balance(&pool, store_id).await, 90_000);

    cleanup_test_store(&pool, cost_code, store_id).await;
}

#[tokio::test]
#[serial]
#[ignore]
async fn concurrent_cancels_refund_exactly_once() {
    let pool = get_test_pool().await;
    let cost_code = "LIFE7";
    let store_id = setup_test_store(&pool, cost_code, "Race Cancel Store").await;
    seed_store_balance(&pool, store_id, 100_000).await;

    let created = bill_service::create_batch(
        &pool,
        &batch(cost_code, store_id, vec![item("Acme Traders", 10_000)]),
    )
    .await
    .expect("batch creation failed");
    let voucher = created.voucher_reference_number;

    approval_service::approve_voucher(
        &pool,
        &voucher,
        &ApproveBillRequest {
            approved_by: Uuid::new_v4(),
            store_id,
            amount_minor: 10_000,
        },
    )
    .await
    .expect("approval failed");
    assert_eq!(store_balance(&pool, store_id).await, 90_000);

    let otp = cancellation_service::generate_cancel_otp(&pool, &voucher)
        .await
        .expect("OTP issue failed");

    let request = CancelBillRequest {
        otp: otp.otp_code,
        store_id,
        cancelled_by: Uuid::new_v4(),
        reason_for_reject: None,
    };

    let (a, b) = tokio::join!(
        cancellation_service::cancel_voucher(&pool, &voucher, &request),
        cancellation_service::cancel_voucher(&pool, &voucher, &request),
    );

    // The OTP is consumed once and the refund lands once; the ledger must
    // come back to its starting balance, never above it
    let ok_count = [a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count();
    assert_eq!(ok_count, 1);
    assert_eq!(store_balance(&pool, store_id).await, 100_000);

    cleanup_test_store(&pool, cost_code, store_id).await;
}

#[tokio::test]
#[serial]
#[ignore]
async fn batch_response_resolves_org_display_names() {
    let pool = get_test_pool().await;
    let cost_code = "LIFE5";
    let store_id = setup_test_store(&pool, cost_code, "Org Store").await;
    let company_id = setup_test_company(&pool, "Sunrise Retail Pvt Ltd").await;
    let department_id = setup_test_department(&pool, "Housekeeping").await;

    let mut request = batch(cost_code, store_id, vec![item("Acme Traders", 1_000)]);
    request.company_id = Some(company_id);
    request.department_id = Some(department_id);

    let created = bill_service::create_batch(&pool, &request)
        .await
        .expect("batch creation failed");

    assert_eq!(created.company.as_deref(), Some("Sunrise Retail Pvt Ltd"));
    assert_eq!(created.department.as_deref(), Some("Housekeeping"));

    cleanup_test_store(&pool, cost_code, store_id).await;
    sqlx::query("DELETE FROM companies WHERE id = $1")
        .bind(company_id)
        .execute(&pool)
        .await
        .ok();
    sqlx::query("DELETE FROM departments WHERE id = $1")
        .bind(department_id)
        .execute(&pool)
        .await
        .ok();
}

#[tokio::test]
#[serial]
#[ignore]
async fn approval_fails_on_insufficient_funds() {
    let pool = get_test_pool().await;
    let cost_code = "LIFE2";
    let store_id = setup_test_store(&pool, cost_code, "Low Balance Store").await;
    seed_store_balance(&pool, store_id, 5_000).await;

    let created = bill_service::create_batch(
        &pool,
        &batch(cost_code, store_id, vec![item("Acme Traders", 10_000)]),
    )
    .await
    .expect("batch creation failed");

    let err = approval_service::approve_voucher(
        &pool,
        &created.voucher_reference_number,
        &ApproveBillRequest {
            approved_by: Uuid::new_v4(),
            store_id,
            amount_minor: 10_000,
        },
    )
    .await
    .unwrap_err();

    assert!(matches!(
        err,
        ApprovalError::InsufficientFunds {
            available_minor: 5_000,
            requested_minor: 10_000
        }
    ));
    // Failed approval leaves the ledger untouched
    assert_eq!(store_balance(&pool, store_id).await, 5_000);

    cleanup_test_store(&pool, cost_code, store_id).await;
}

#[tokio::test]
#[serial]
#[ignore]
async fn otp_requires_an_approved_voucher() {
    let pool = get_test_pool().await;
    let cost_code = "LIFE3";
    let store_id = setup_test_store(&pool, cost_code, "OTP Store").await;

    let created = bill_service::create_batch(
        &pool,
        &batch(cost_code, store_id, vec![item("Acme Traders", 2_000)]),
    )
    .await
    .expect("batch creation failed");

    let err = cancellation_service::generate_cancel_otp(&pool, &created.voucher_reference_number)
        .await
        .unwrap_err();
    assert!(matches!(err, CancellationError::NotApproved(_)));

    cleanup_test_store(&pool, cost_code, store_id).await;
}

#[tokio::test]
#[serial]
#[ignore]
async fn self_cancel_is_owner_only_and_never_touches_the_ledger() {
    let pool = get_test_pool().await;
    let cost_code = "LIFE4";
    let store_id = setup_test_store(&pool, cost_code, "Self Cancel Store").await;
    seed_store_balance(&pool, store_id, 50_000).await;

    let owner = Uuid::new_v4();
    let mut request = batch(cost_code, store_id, vec![item("Acme Traders", 3_000)]);
    request.user_id = owner;

    let created = bill_service::create_batch(&pool, &request)
        .await
        .expect("batch creation failed");
    let voucher = created.voucher_reference_number;

    // A stranger cannot self-cancel someone else's voucher
    let err = cancellation_service::cancel_by_user(
        &pool,
        &voucher,
        &CancelByUserRequest {
            user_id: Uuid::new_v4(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, CancellationError::NotOwner(_, _)));

    let response =
        cancellation_service::cancel_by_user(&pool, &voucher, &CancelByUserRequest { user_id: owner })
            .await
            .expect("self-cancel failed");
    assert_eq!(response.cancelled_lines, 1);
    assert_eq!(store_balance(&pool, store_id).await, 50_000);

    cleanup_test_store(&pool, cost_code, store_id).await;
}
