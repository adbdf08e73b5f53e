//! Voucher numbering tests: per-scope sequences and caller-supplied numbers.
//!
//! Requires a migrated PostgreSQL database; run with `cargo test -- --ignored`.

mod common;

use chrono::{Datelike, Utc};
use serial_test::serial;
use uuid::Uuid;

use common::{cleanup_test_store, get_test_pool, setup_test_store};
use pettycash_rs::contracts::bill_batch_v1::{BillBatchRequest, BillItem, BillType};
use pettycash_rs::services::bill_service::{self, BillServiceError};

fn item(amount_minor: i64) -> BillItem {
    BillItem {
        supplier_name: "Acme Traders".to_string(),
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

fn batch(billtype: BillType, cost_code: &str, store_id: Option<Uuid>) -> BillBatchRequest {
    BillBatchRequest {
        billtype,
        user_id: Uuid::new_v4(),
        company_id: None,
        department_id: None,
        store_id,
        cost_code: cost_code.to_string(),
        voucher_date: None,
        narration: None,
        items: vec![item(1_000)],
    }
}

#[tokio::test]
#[serial]
#[ignore]
async fn standard_sequence_increments_per_cost_code() {
    let pool = get_test_pool().await;
    let cost_code = "NUM1";
    let store_id = setup_test_store(&pool, cost_code, "Numbering Store").await;
    let year = Utc::now().year();

    let first = bill_service::create_batch(&pool, &batch(BillType::NonGst, cost_code, None))
        .await
        .expect("first batch failed");
    let second = bill_service::create_batch(&pool, &batch(BillType::NonGst, cost_code, None))
        .await
        .expect("second batch failed");

    assert_eq!(first.voucher_reference_number, format!("{cost_code}-{year}-001"));
    assert_eq!(second.voucher_reference_number, format!("{cost_code}-{year}-002"));

    cleanup_test_store(&pool, cost_code, store_id).await;
}

#[tokio::test]
#[serial]
#[ignore]
async fn advance_sequence_is_scoped_per_store() {
    let pool = get_test_pool().await;
    let cost_code = "NUM2";
    let store_a = setup_test_store(&pool, cost_code, "Advance Store A").await;
    let store_b = setup_test_store(&pool, &format!("{cost_code}B"), "Advance Store B").await;
    let year = Utc::now().year();

    let a1 = bill_service::create_batch(&pool, &batch(BillType::Advance, cost_code, Some(store_a)))
        .await
        .expect("store A advance failed");
    let a2 = bill_service::create_batch(&pool, &batch(BillType::Advance, cost_code, Some(store_a)))
        .await
        .expect("store A second advance failed");
    // Same cost code, different store: the sequence restarts
    let b1 = bill_service::create_batch(&pool, &batch(BillType::Advance, cost_code, Some(store_b)))
        .await
        .expect("store B advance failed");

    assert_eq!(a1.voucher_reference_number, format!("{cost_code}-ADV-{year}-001"));
    assert_eq!(a2.voucher_reference_number, format!("{cost_code}-ADV-{year}-002"));
    assert_eq!(b1.voucher_reference_number, format!("{cost_code}-ADV-{year}-001"));

    cleanup_test_store(&pool, cost_code, store_a).await;
    cleanup_test_store(&pool, &format!("{cost_code}B"), store_b).await;
}

#[tokio::test]
#[serial]
#[ignore]
async fn advance_and_standard_sequences_are_independent() {
    let pool = get_test_pool().await;
    let cost_code = "NUM3";
    let store_id = setup_test_store(&pool, cost_code, "Mixed Store").await;
    let year = Utc::now().year();

    bill_service::create_batch(&pool, &batch(BillType::NonGst, cost_code, None))
        .await
        .expect("standard batch failed");
    let adv = bill_service::create_batch(&pool, &batch(BillType::Advance, cost_code, Some(store_id)))
        .await
        .expect("advance batch failed");

    // The standard voucher does not advance the ADV sequence
    assert_eq!(adv.voucher_reference_number, format!("{cost_code}-ADV-{year}-001"));

    cleanup_test_store(&pool, cost_code, store_id).await;
}

#[tokio::test]
#[serial]
#[ignore]
async fn supplied_voucher_number_cannot_be_reused() {
    let pool = get_test_pool().await;
    let cost_code = "NUM4";
    let store_id = setup_test_store(&pool, cost_code, "Addbill Store").await;

    let request = batch(BillType::NonGst, cost_code, None);
    let voucher = format!("{cost_code}-2099-001");

    bill_service::create_with_voucher(&pool, &voucher, &request)
        .await
        .expect("addbill failed");

    let err = bill_service::create_with_voucher(&pool, &voucher, &request)
        .await
        .unwrap_err();
    assert!(matches!(err, BillServiceError::VoucherExists(_)));

    cleanup_test_store(&pool, cost_code, store_id).await;
}
