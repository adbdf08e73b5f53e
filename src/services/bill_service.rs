//! Bill Batch Service
//!
//! Creates vouchers as line-item batches. Every batch runs in one
//! transaction: the reference number is derived and the lines inserted under
//! the same snapshot, so a failed insert never leaves a consumed number
//! behind. Either every line of the batch commits or none does.

use chrono::{Datelike, NaiveDate, Utc};
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::contracts::bill_batch_v1::{BillBatchRequest, BillBatchResponse, BillType};
use crate::repos::{bill_repo, org_repo};
use crate::services::numbering_service::{self, NumberingError};
use crate::validation::{self, ValidationError};

/// Errors that can occur during batch creation
#[derive(Debug, Error)]
pub enum BillServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Voucher already exists: {0}")]
    VoucherExists(String),

    #[error(transparent)]
    Numbering(#[from] NumberingError),

    #[error(transparent)]
    Bill(#[from] bill_repo::BillError),

    #[error(transparent)]
    Org(#[from] org_repo::OrgError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Create a bill batch under a freshly derived voucher reference
pub async fn create_batch(
    pool: &PgPool,
    request: &BillBatchRequest,
) -> Result<BillBatchResponse, BillServiceError> {
    validation::validate_bill_batch(
        request.billtype,
        &request.cost_code,
        request.store_id.is_some(),
        &request.items,
    )?;

    let mut tx = pool.begin().await?;

    let voucher_date = request
        .voucher_date
        .unwrap_or_else(|| Utc::now().date_naive());
    let year = voucher_date.year();

    let voucher_ref = match request.billtype {
        BillType::Advance => {
            // Validation guarantees store_id is present for advances
            let store_id = request.store_id.ok_or(ValidationError::AdvanceRequiresStore)?;
            numbering_service::next_advance_number(&mut tx, &request.cost_code, year, store_id)
                .await?
        }
        _ => numbering_service::next_standard_number(&mut tx, &request.cost_code, year).await?,
    };

    let response = insert_batch(&mut tx, &voucher_ref, voucher_date, request).await?;

    tx.commit().await?;

    tracing::info!(
        voucher = %response.voucher_reference_number,
        lines = request.items.len(),
        total_minor = response.total_amount_minor,
        "bill batch created"
    );

    Ok(response)
}

/// Create a bill batch under a caller-supplied voucher reference
///
/// Rejected when any line already carries the reference; numbers are never
/// shared across batches.
pub async fn create_with_voucher(
    pool: &PgPool,
    voucher_ref: &str,
    request: &BillBatchRequest,
) -> Result<BillBatchResponse, BillServiceError> {
    validation::validate_bill_batch(
        request.billtype,
        &request.cost_code,
        request.store_id.is_some(),
        &request.items,
    )?;

    let mut tx = pool.begin().await?;

    if bill_repo::fetch_voucher_summary_tx(&mut tx, voucher_ref)
        .await?
        .is_some()
    {
        return Err(BillServiceError::VoucherExists(voucher_ref.to_string()));
    }

    let voucher_date = request
        .voucher_date
        .unwrap_or_else(|| Utc::now().date_naive());

    let response = insert_batch(&mut tx, voucher_ref, voucher_date, request).await?;

    tx.commit().await?;

    tracing::info!(
        voucher = %response.voucher_reference_number,
        lines = request.items.len(),
        "bill batch created under supplied reference"
    );

    Ok(response)
}

/// Insert the lines of a batch and resolve the org display names
async fn insert_batch(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    voucher_ref: &str,
    voucher_date: NaiveDate,
    request: &BillBatchRequest,
) -> Result<BillBatchResponse, BillServiceError> {
    let company = match request.company_id {
        Some(id) => org_repo::company_name_tx(tx, id).await?,
        None => None,
    };
    let department = match request.department_id {
        Some(id) => org_repo::department_name_tx(tx, id).await?,
        None => None,
    };

    let lines: Vec<bill_repo::BillLineInsert> = request
        .items
        .iter()
        .map(|item| bill_repo::BillLineInsert {
            id: Uuid::new_v4(),
            voucher_reference_number: voucher_ref.to_string(),
            billtype: request.billtype,
            user_id: request.user_id,
            company_id: request.company_id,
            department_id: request.department_id,
            store_id: request.store_id,
            cost_code: request.cost_code.clone(),
            voucher_date,
            supplier_name: item.supplier_name.clone(),
            supplier_gst: item.supplier_gst.clone(),
            nature_of_expense: item.nature_of_expense.clone(),
            head_of_accounts: item.head_of_accounts.clone(),
            instructed_by: item.instructed_by.clone(),
            invoice_date: item.invoice_date,
            invoice_reference_number: item.invoice_reference_number.clone(),
            taxable_amount_minor: item.taxable_amount_minor,
            cgst_rate_bp: item.cgst_rate_bp,
            sgst_rate_bp: item.sgst_rate_bp,
            igst_rate_bp: item.igst_rate_bp,
            cgst_minor: item.cgst_minor,
            sgst_minor: item.sgst_minor,
            igst_minor: item.igst_minor,
            rounding_off_minor: item.rounding_off_minor,
            total_amount_minor: item.amount_minor,
            narration: request.narration.clone(),
            remarks: item.remarks.clone(),
        })
        .collect();

    bill_repo::insert_lines_tx(tx, &lines).await?;

    let total_amount_minor = request.items.iter().map(|i| i.amount_minor).sum();

    Ok(BillBatchResponse {
        voucher_reference_number: voucher_ref.to_string(),
        billtype: request.billtype,
        total_amount_minor,
        company,
        department,
    })
}
