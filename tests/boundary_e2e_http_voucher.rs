//! Boundary E2E Test: HTTP → Router → Service → DB (voucher read path)
//!
//! Crosses the real HTTP ingress instead of calling services directly:
//! creates a voucher through the service layer, then reads it back via
//! `GET /api/bills/voucher/{voucher}` and checks shape and status codes.
//!
//! ## Prerequisites
//! - The petty-cash HTTP server running at localhost:8094
//! - PostgreSQL reachable via DATABASE_URL
//!
//! Run with `cargo test -- --ignored`.

mod common;

use serial_test::serial;
use uuid::Uuid;

use common::{cleanup_test_store, get_test_pool, setup_test_store};
use pettycash_rs::contracts::bill_batch_v1::{BillBatchRequest, BillItem, BillType};
use pettycash_rs::contracts::voucher_v1::VoucherResponse;
use pettycash_rs::services::bill_service;

fn base_url() -> String {
    std::env::var("PETTYCASH_BASE_URL").unwrap_or_else(|_| "http://localhost:8094".to_string())
}

fn batch(cost_code: &str, store_id: Uuid) -> BillBatchRequest {
    BillBatchRequest {
        billtype: BillType::NonGst,
        user_id: Uuid::new_v4(),
        company_id: None,
        department_id: None,
        store_id: Some(store_id),
        cost_code: cost_code.to_string(),
        voucher_date: None,
        narration: None,
        items: vec![
            BillItem {
                supplier_name: "Acme Traders".to_string(),
                nature_of_expense: "Stationery".to_string(),
                head_of_accounts: "Office Expenses".to_string(),
                instructed_by: "Manager".to_string(),
                amount_minor: 10_000,
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
            },
            BillItem {
                supplier_name: "Beta Supplies".to_string(),
                nature_of_expense: "Cleaning".to_string(),
                head_of_accounts: "Maintenance".to_string(),
                instructed_by: "Manager".to_string(),
                amount_minor: 5_050,
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
            },
        ],
    }
}

#[tokio::test]
#[serial]
#[ignore]
async fn health_endpoint_reports_healthy() {
    let response = reqwest::get(format!("{}/api/health", base_url()))
        .await
        .expect("health request failed");
    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await.expect("invalid health body");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[serial]
#[ignore]
async fn voucher_read_returns_lines_and_aggregate_over_http() {
    let pool = get_test_pool().await;
    let cost_code = "HTTP1";
    let store_id = setup_test_store(&pool, cost_code, "Boundary Store").await;

    let created = bill_service::create_batch(&pool, &batch(cost_code, store_id))
        .await
        .expect("batch creation failed");
    let voucher = created.voucher_reference_number.clone();

    let response = reqwest::get(format!("{}/api/bills/voucher/{voucher}", base_url()))
        .await
        .expect("voucher request failed");
    assert_eq!(response.status(), 200);

    let body: VoucherResponse = response.json().await.expect("invalid voucher body");
    assert_eq!(body.voucher_reference_number, voucher);
    assert_eq!(body.aggregate.line_count, 2);
    assert_eq!(body.aggregate.total_amount_minor, 15_050);
    assert!(!body.aggregate.is_approved);
    assert_eq!(body.lines.len(), 2);

    cleanup_test_store(&pool, cost_code, store_id).await;
}

#[tokio::test]
#[serial]
#[ignore]
async fn unknown_voucher_is_a_404_with_an_error_body() {
    let response = reqwest::get(format!("{}/api/bills/voucher/MISSING-2025-001", base_url()))
        .await
        .expect("voucher request failed");
    assert_eq!(response.status(), 404);

    let body: serde_json::Value = response.json().await.expect("invalid error body");
    assert!(body["error"].as_str().unwrap().contains("MISSING-2025-001"));
}
