//! Cancellation Service
//!
//! Two cancellation paths share this module:
//!
//! - OTP-gated cancellation of an approved voucher. A six-digit code is
//!   issued against the voucher with a five-minute validity; consuming it
//!   credits the debited amount back to the store ledger, clears the
//!   approval stamps and appends a refund transition, all in one
//!   transaction. Each code is single-use.
//! - Self-cancellation by the submitting user, allowed only while the
//!   voucher is unapproved. It touches no ledger.

use chrono::{Duration, Utc};
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::contracts::cancel_v1::{
    CancelBillRequest, CancelBillResponse, CancelByUserRequest, CancelByUserResponse,
    GenerateCancelOtpResponse,
};
use crate::repos::{bill_repo, ledger_repo, otp_repo, transition_repo};
use crate::services::approval_service::supplier_label;

/// OTP validity window
const OTP_TTL_MINUTES: i64 = 5;

/// Errors that can occur during cancellation flows
#[derive(Debug, Error)]
pub enum CancellationError {
    #[error("Voucher not found: {0}")]
    VoucherNotFound(String),

    #[error("Voucher is not approved: {0}")]
    NotApproved(String),

    #[error("Voucher already cancelled: {0}")]
    AlreadyCancelled(String),

    #[error("Voucher already approved: {0}")]
    AlreadyApproved(String),

    #[error("Invalid or expired OTP for voucher {0}")]
    InvalidOtp(String),

    #[error("Store not found: {0}")]
    StoreNotFound(Uuid),

    #[error("Voucher {0} does not belong to user {1}")]
    NotOwner(String, Uuid),

    #[error(transparent)]
    Bill(#[from] bill_repo::BillError),

    #[error(transparent)]
    Ledger(#[from] ledger_repo::LedgerError),

    #[error(transparent)]
    Otp(#[from] otp_repo::OtpError),

    #[error(transparent)]
    Transition(#[from] transition_repo::TransitionError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Derive a six-digit code without an extra RNG dependency; v4 UUIDs carry
/// 122 random bits
fn generate_otp_code() -> String {
    format!("{:06}", Uuid::new_v4().as_u128() % 1_000_000)
}

/// Issue a cancellation OTP for an approved voucher
pub async fn generate_cancel_otp(
    pool: &PgPool,
    voucher_ref: &str,
) -> Result<GenerateCancelOtpResponse, CancellationError> {
    let mut tx = pool.begin().await?;

    let summary = bill_repo::fetch_voucher_summary_tx(&mut tx, voucher_ref)
        .await?
        .ok_or_else(|| CancellationError::VoucherNotFound(voucher_ref.to_string()))?;

    if summary.is_cancelled {
        return Err(CancellationError::AlreadyCancelled(voucher_ref.to_string()));
    }
    if !summary.is_approved {
        return Err(CancellationError::NotApproved(voucher_ref.to_string()));
    }

    let otp_code = generate_otp_code();
    let expires_at = Utc::now() + Duration::minutes(OTP_TTL_MINUTES);

    otp_repo::insert_tx(&mut tx, voucher_ref, &otp_code, expires_at).await?;

    tx.commit().await?;

    tracing::info!(voucher = %voucher_ref, "cancellation OTP issued");

    Ok(GenerateCancelOtpResponse {
        voucher_reference_number: voucher_ref.to_string(),
        otp_code,
        expires_at,
    })
}

/// Cancel an approved voucher, refunding the debit to the store ledger
///
/// The refunded amount is the sum over the voucher's lines, matching what
/// approval debited; the request never dictates the ledger movement.
pub async fn cancel_voucher(
    pool: &PgPool,
    voucher_ref: &str,
    request: &CancelBillRequest,
) -> Result<CancelBillResponse, CancellationError> {
    let mut tx = pool.begin().await?;

    let summary = bill_repo::fetch_voucher_summary_tx(&mut tx, voucher_ref)
        .await?
        .ok_or_else(|| CancellationError::VoucherNotFound(voucher_ref.to_string()))?;

    if summary.is_cancelled {
        return Err(CancellationError::AlreadyCancelled(voucher_ref.to_string()));
    }
    if !summary.is_approved {
        return Err(CancellationError::NotApproved(voucher_ref.to_string()));
    }

    let otp = otp_repo::find_valid_tx(&mut tx, voucher_ref, &request.otp)
        .await?
        .ok_or_else(|| CancellationError::InvalidOtp(voucher_ref.to_string()))?;

    // First-writer-wins: a concurrent cancellation holding this row's lock
    // consumes the OTP on commit, and our conditional update then affects
    // nothing.
    if !otp_repo::mark_used_tx(&mut tx, otp.id).await? {
        return Err(CancellationError::InvalidOtp(voucher_ref.to_string()));
    }

    let refund_minor = summary.total_amount_minor;

    // Lock before crediting so the refund serializes with concurrent approvals
    ledger_repo::find_for_update_tx(&mut tx, request.store_id)
        .await?
        .ok_or(CancellationError::StoreNotFound(request.store_id))?;

    let new_balance = ledger_repo::credit_tx(&mut tx, request.store_id, refund_minor)
        .await?
        .ok_or(CancellationError::StoreNotFound(request.store_id))?;

    // Only approved, uncancelled lines are flipped; if another cancellation
    // got there first, aborting rolls the credit back.
    let cancelled = bill_repo::mark_cancelled_tx(
        &mut tx,
        voucher_ref,
        request.cancelled_by,
        request.reason_for_reject.as_deref(),
    )
    .await?;
    if cancelled != summary.line_count as u64 {
        return Err(CancellationError::AlreadyCancelled(voucher_ref.to_string()));
    }

    let head = bill_repo::fetch_voucher_head_tx(&mut tx, voucher_ref)
        .await?
        .ok_or_else(|| CancellationError::VoucherNotFound(voucher_ref.to_string()))?;

    transition_repo::insert_tx(
        &mut tx,
        &transition_repo::TransitionInsert {
            company_id: head.company_id,
            store_id: request.store_id,
            department_id: head.department_id,
            tnx_id: voucher_ref.to_string(),
            user_id: request.cancelled_by,
            supplier: supplier_label(&head.supplier_name, summary.line_count),
            supplier_gst: head.supplier_gst.clone(),
            transition_type: transition_repo::TYPE_REFUND,
            amount_minor: refund_minor,
            balance_minor: new_balance,
        },
    )
    .await?;

    tx.commit().await?;

    tracing::info!(
        voucher = %voucher_ref,
        store = %request.store_id,
        refunded_minor = refund_minor,
        balance_minor = new_balance,
        "voucher cancelled"
    );

    Ok(CancelBillResponse {
        voucher_reference_number: voucher_ref.to_string(),
        refunded_minor: refund_minor,
        balance_minor: new_balance,
    })
}

/// Self-cancel an unapproved voucher; the ledger is never touched
pub async fn cancel_by_user(
    pool: &PgPool,
    voucher_ref: &str,
    request: &CancelByUserRequest,
) -> Result<CancelByUserResponse, CancellationError> {
    let mut tx = pool.begin().await?;

    let summary = bill_repo::fetch_voucher_summary_tx(&mut tx, voucher_ref)
        .await?
        .ok_or_else(|| CancellationError::VoucherNotFound(voucher_ref.to_string()))?;

    if summary.is_cancelled {
        return Err(CancellationError::AlreadyCancelled(voucher_ref.to_string()));
    }
    if summary.is_approved {
        return Err(CancellationError::AlreadyApproved(voucher_ref.to_string()));
    }

    let head = bill_repo::fetch_voucher_head_tx(&mut tx, voucher_ref)
        .await?
        .ok_or_else(|| CancellationError::VoucherNotFound(voucher_ref.to_string()))?;

    if head.user_id != request.user_id {
        return Err(CancellationError::NotOwner(
            voucher_ref.to_string(),
            request.user_id,
        ));
    }

    let cancelled_lines =
        bill_repo::mark_self_closed_tx(&mut tx, voucher_ref, request.user_id).await?;
    if cancelled_lines != summary.line_count as u64 {
        return Err(CancellationError::AlreadyCancelled(voucher_ref.to_string()));
    }

    tx.commit().await?;

    tracing::info!(voucher = %voucher_ref, cancelled_lines, "voucher self-cancelled");

    Ok(CancelByUserResponse {
        voucher_reference_number: voucher_ref.to_string(),
        cancelled_lines,
    })
}
