//! Approval Service
//!
//! Approving a voucher debits its store's cash ledger and stamps every line
//! approved, in one transaction. The balance row is locked before the
//! sufficiency check and the debit itself is conditional on funds, so two
//! concurrent approvals against the same store can never both draw down the
//! same cash.

use chrono::Utc;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::contracts::cancel_v1::{ApproveBillRequest, ApproveBillResponse};
use crate::repos::{bill_repo, ledger_repo, transition_repo};

/// Errors that can occur during voucher approval
#[derive(Debug, Error)]
pub enum ApprovalError {
    #[error("Voucher not found: {0}")]
    VoucherNotFound(String),

    #[error("Voucher already approved: {0}")]
    AlreadyApproved(String),

    #[error("Voucher is cancelled: {0}")]
    Cancelled(String),

    #[error("Store not found: {0}")]
    StoreNotFound(Uuid),

    #[error("Insufficient funds: available {available_minor}, requested {requested_minor}")]
    InsufficientFunds {
        available_minor: i64,
        requested_minor: i64,
    },

    #[error(transparent)]
    Bill(#[from] bill_repo::BillError),

    #[error(transparent)]
    Ledger(#[from] ledger_repo::LedgerError),

    #[error(transparent)]
    Transition(#[from] transition_repo::TransitionError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Approve a voucher, debiting the store ledger by its line total
///
/// The debited amount is the sum over the voucher's lines; the amount in the
/// request is advisory and never trusted for the ledger movement.
pub async fn approve_voucher(
    pool: &PgPool,
    voucher_ref: &str,
    request: &ApproveBillRequest,
) -> Result<ApproveBillResponse, ApprovalError> {
    let mut tx = pool.begin().await?;

    let summary = bill_repo::fetch_voucher_summary_tx(&mut tx, voucher_ref)
        .await?
        .ok_or_else(|| ApprovalError::VoucherNotFound(voucher_ref.to_string()))?;

    if summary.is_cancelled {
        return Err(ApprovalError::Cancelled(voucher_ref.to_string()));
    }
    if summary.is_approved {
        return Err(ApprovalError::AlreadyApproved(voucher_ref.to_string()));
    }

    let amount_minor = summary.total_amount_minor;

    // Lock the balance row first so the sufficiency report is stable
    let balance = ledger_repo::find_for_update_tx(&mut tx, request.store_id)
        .await?
        .ok_or(ApprovalError::StoreNotFound(request.store_id))?;

    let new_balance = ledger_repo::try_debit_tx(&mut tx, request.store_id, amount_minor)
        .await?
        .ok_or(ApprovalError::InsufficientFunds {
            available_minor: balance.available_cash_minor,
            requested_minor: amount_minor,
        })?;

    // The stamp only touches unapproved, uncancelled lines. A concurrent
    // approval that committed while we waited on the balance lock leaves
    // nothing to stamp; aborting here rolls the debit back.
    let stamped =
        bill_repo::mark_approved_tx(&mut tx, voucher_ref, request.approved_by, new_balance).await?;
    if stamped != summary.line_count as u64 {
        return Err(ApprovalError::AlreadyApproved(voucher_ref.to_string()));
    }

    let head = bill_repo::fetch_voucher_head_tx(&mut tx, voucher_ref)
        .await?
        .ok_or_else(|| ApprovalError::VoucherNotFound(voucher_ref.to_string()))?;

    transition_repo::insert_tx(
        &mut tx,
        &transition_repo::TransitionInsert {
            company_id: head.company_id,
            store_id: request.store_id,
            department_id: head.department_id,
            tnx_id: voucher_ref.to_string(),
            user_id: request.approved_by,
            supplier: supplier_label(&head.supplier_name, summary.line_count),
            supplier_gst: head.supplier_gst.clone(),
            transition_type: transition_repo::TYPE_DEBIT,
            amount_minor,
            balance_minor: new_balance,
        },
    )
    .await?;

    tx.commit().await?;

    tracing::info!(
        voucher = %voucher_ref,
        store = %request.store_id,
        amount_minor,
        balance_minor = new_balance,
        "voucher approved"
    );

    Ok(ApproveBillResponse {
        voucher_reference_number: voucher_ref.to_string(),
        balance_minor: new_balance,
        approved_at: Utc::now(),
    })
}

/// Transition supplier label: the first supplier, with a `+N` tail for
/// multi-line vouchers (e.g. "Acme Traders+2")
pub(crate) fn supplier_label(first_supplier: &str, line_count: i64) -> String {
    if line_count > 1 {
        format!("{first_supplier}+{}", line_count - 1)
    } else {
        first_supplier.to_string()
    }
}
