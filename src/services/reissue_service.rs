//! Re-issue Service
//!
//! Re-issues an edited, cancelled voucher under a `BASE/N` reference. The
//! original rows are retired in place (never deleted) and the replacement
//! lines start with a clean status slate, so the lineage stays auditable
//! through the shared base reference.

use chrono::Utc;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::contracts::bill_batch_v1::{ReissueVoucherRequest, ReissueVoucherResponse};
use crate::repos::bill_repo;
use crate::services::numbering_service::{self, NumberingError};
use crate::validation::{self, ValidationError};

/// Errors that can occur during voucher re-issue
#[derive(Debug, Error)]
pub enum ReissueError {
    #[error("Voucher not found: {0}")]
    VoucherNotFound(String),

    #[error("Voucher is not cancelled: {0}")]
    NotCancelled(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Numbering(#[from] NumberingError),

    #[error(transparent)]
    Bill(#[from] bill_repo::BillError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Re-issue a cancelled voucher with edited line items
pub async fn reissue_voucher(
    pool: &PgPool,
    voucher_ref: &str,
    request: &ReissueVoucherRequest,
) -> Result<ReissueVoucherResponse, ReissueError> {
    let mut tx = pool.begin().await?;

    let summary = bill_repo::fetch_voucher_summary_tx(&mut tx, voucher_ref)
        .await?
        .ok_or_else(|| ReissueError::VoucherNotFound(voucher_ref.to_string()))?;

    if !summary.is_cancelled {
        return Err(ReissueError::NotCancelled(voucher_ref.to_string()));
    }

    // Org scoping and cost code carry over from the cancelled lines
    let head = bill_repo::fetch_voucher_head_tx(&mut tx, voucher_ref)
        .await?
        .ok_or_else(|| ReissueError::VoucherNotFound(voucher_ref.to_string()))?;
    let cost_code = bill_repo::fetch_cost_code_tx(&mut tx, voucher_ref)
        .await?
        .ok_or_else(|| ReissueError::VoucherNotFound(voucher_ref.to_string()))?;

    validation::validate_bill_batch(
        request.billtype,
        &cost_code,
        head.store_id.is_some(),
        &request.items,
    )?;

    let new_ref = numbering_service::next_reissue_number(&mut tx, voucher_ref).await?;

    bill_repo::close_lines_tx(&mut tx, voucher_ref).await?;

    let voucher_date = Utc::now().date_naive();
    let lines: Vec<bill_repo::BillLineInsert> = request
        .items
        .iter()
        .map(|item| bill_repo::BillLineInsert {
            id: Uuid::new_v4(),
            voucher_reference_number: new_ref.clone(),
            billtype: request.billtype,
            user_id: request.user_id,
            company_id: head.company_id,
            department_id: head.department_id,
            store_id: head.store_id,
            cost_code: cost_code.clone(),
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
            narration: None,
            remarks: item.remarks.clone(),
        })
        .collect();

    bill_repo::insert_lines_tx(&mut tx, &lines).await?;

    tx.commit().await?;

    let total_amount_minor = request.items.iter().map(|i| i.amount_minor).sum();

    tracing::info!(
        closed = %voucher_ref,
        reissued = %new_ref,
        lines = request.items.len(),
        "voucher re-issued"
    );

    Ok(ReissueVoucherResponse {
        closed_voucher_reference_number: voucher_ref.to_string(),
        voucher_reference_number: new_ref,
        total_amount_minor,
    })
}
