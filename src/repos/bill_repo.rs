//! Repository for bill line operations
//!
//! A voucher is a virtual aggregate: one or more bill lines sharing a
//! `voucher_reference_number`. Voucher status is always derived by
//! aggregation over the lines, and every status-changing statement here is
//! scoped by voucher reference, never by individual line id, so the lines of
//! a voucher cannot drift apart.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use thiserror::Error;
use uuid::Uuid;

use crate::contracts::bill_batch_v1::BillType;

/// Errors that can occur during bill repository operations
#[derive(Debug, Error)]
pub enum BillError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Struct for inserting a bill line
#[derive(Debug, Clone)]
pub struct BillLineInsert {
    pub id: Uuid,
    pub voucher_reference_number: String,
    pub billtype: BillType,
    pub user_id: Uuid,
    pub company_id: Option<Uuid>,
    pub department_id: Option<Uuid>,
    pub store_id: Option<Uuid>,
    pub cost_code: String,
    pub voucher_date: NaiveDate,
    pub supplier_name: String,
    pub supplier_gst: Option<String>,
    pub nature_of_expense: String,
    pub head_of_accounts: String,
    pub instructed_by: String,
    pub invoice_date: Option<NaiveDate>,
    pub invoice_reference_number: Option<String>,
    pub taxable_amount_minor: Option<i64>,
    pub cgst_rate_bp: Option<i32>,
    pub sgst_rate_bp: Option<i32>,
    pub igst_rate_bp: Option<i32>,
    pub cgst_minor: Option<i64>,
    pub sgst_minor: Option<i64>,
    pub igst_minor: Option<i64>,
    pub rounding_off_minor: Option<i64>,
    pub total_amount_minor: i64,
    pub narration: Option<String>,
    pub remarks: Option<String>,
}

/// A persisted bill line (read model)
#[derive(Debug, Clone, FromRow)]
pub struct BillLine {
    pub id: Uuid,
    pub voucher_reference_number: String,
    pub billtype: BillType,
    pub user_id: Uuid,
    pub supplier_name: String,
    pub nature_of_expense: String,
    pub head_of_accounts: String,
    pub instructed_by: String,
    pub total_amount_minor: i64,
    pub is_approved: bool,
    pub is_cancelled: bool,
    pub is_self_closed: bool,
    pub is_bill_closed: bool,
    pub sent_to_admin: bool,
    pub sent_to_tally: bool,
    pub voucher_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// Aggregate status of a voucher, derived over its lines
#[derive(Debug, Clone, FromRow)]
pub struct VoucherSummary {
    pub line_count: i64,
    pub total_amount_minor: i64,
    /// True only when every line is approved
    pub is_approved: bool,
    pub is_cancelled: bool,
    pub sent_to_admin: bool,
    pub sent_to_tally: bool,
}

/// Ownership fields of a voucher, taken from its first line
/// (used when appending transition rows)
#[derive(Debug, Clone, FromRow)]
pub struct VoucherHead {
    pub user_id: Uuid,
    pub company_id: Option<Uuid>,
    pub department_id: Option<Uuid>,
    pub store_id: Option<Uuid>,
    pub supplier_name: String,
    pub supplier_gst: Option<String>,
}

/// Per-voucher status flags for forwarding eligibility checks
#[derive(Debug, Clone, FromRow)]
pub struct VoucherFlags {
    pub voucher_reference_number: String,
    pub is_approved: bool,
    pub sent_to_admin: bool,
    pub sent_to_tally: bool,
}

/// Insert one row per line item, all under the same voucher reference
pub async fn insert_lines_tx(
    tx: &mut Transaction<'_, Postgres>,
    lines: &[BillLineInsert],
) -> Result<(), BillError> {
    for line in lines {
        sqlx::query(
            r#"
            INSERT INTO bills (
                id, voucher_reference_number, billtype, user_id,
                company_id, department_id, store_id, cost_code, voucher_date,
                supplier_name, supplier_gst, nature_of_expense, head_of_accounts,
                instructed_by, invoice_date, invoice_reference_number,
                taxable_amount_minor, cgst_rate_bp, sgst_rate_bp, igst_rate_bp,
                cgst_minor, sgst_minor, igst_minor, rounding_off_minor,
                total_amount_minor, narration, remarks
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13,
                    $14, $15, $16, $17, $18, $19, $20, $21, $22, $23, $24,
                    $25, $26, $27)
            "#,
        )
        .bind(line.id)
        .bind(&line.voucher_reference_number)
        .bind(line.billtype)
        .bind(line.user_id)
        .bind(line.company_id)
        .bind(line.department_id)
        .bind(line.store_id)
        .bind(&line.cost_code)
        .bind(line.voucher_date)
        .bind(&line.supplier_name)
        .bind(&line.supplier_gst)
        .bind(&line.nature_of_expense)
        .bind(&line.head_of_accounts)
        .bind(&line.instructed_by)
        .bind(line.invoice_date)
        .bind(&line.invoice_reference_number)
        .bind(line.taxable_amount_minor)
        .bind(line.cgst_rate_bp)
        .bind(line.sgst_rate_bp)
        .bind(line.igst_rate_bp)
        .bind(line.cgst_minor)
        .bind(line.sgst_minor)
        .bind(line.igst_minor)
        .bind(line.rounding_off_minor)
        .bind(line.total_amount_minor)
        .bind(&line.narration)
        .bind(&line.remarks)
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}

/// Fetch all lines of a voucher, in insertion order
pub async fn fetch_lines_by_voucher(
    pool: &PgPool,
    voucher_ref: &str,
) -> Result<Vec<BillLine>, BillError> {
    let lines = sqlx::query_as::<_, BillLine>(
        r#"
        SELECT id, voucher_reference_number, billtype, user_id,
               supplier_name, nature_of_expense, head_of_accounts, instructed_by,
               total_amount_minor, is_approved, is_cancelled, is_self_closed,
               is_bill_closed, sent_to_admin, sent_to_tally, voucher_date, created_at
        FROM bills
        WHERE voucher_reference_number = $1
        ORDER BY created_at, id
        "#,
    )
    .bind(voucher_ref)
    .fetch_all(pool)
    .await?;

    Ok(lines)
}

/// Derive a voucher's aggregate status within a transaction
///
/// Returns None when no line carries the reference. `is_approved` uses
/// BOOL_AND (every line), the remaining flags BOOL_OR (any line).
pub async fn fetch_voucher_summary_tx(
    tx: &mut Transaction<'_, Postgres>,
    voucher_ref: &str,
) -> Result<Option<VoucherSummary>, BillError> {
    let summary = sqlx::query_as::<_, VoucherSummary>(
        r#"
        SELECT COUNT(*) AS line_count,
               COALESCE(SUM(total_amount_minor), 0)::BIGINT AS total_amount_minor,
               COALESCE(BOOL_AND(is_approved), FALSE) AS is_approved,
               COALESCE(BOOL_OR(is_cancelled), FALSE) AS is_cancelled,
               COALESCE(BOOL_OR(sent_to_admin), FALSE) AS sent_to_admin,
               COALESCE(BOOL_OR(sent_to_tally), FALSE) AS sent_to_tally
        FROM bills
        WHERE voucher_reference_number = $1
        "#,
    )
    .bind(voucher_ref)
    .fetch_one(&mut **tx)
    .await?;

    if summary.line_count == 0 {
        return Ok(None);
    }

    Ok(Some(summary))
}

/// Fetch a voucher's ownership fields from its first line
pub async fn fetch_voucher_head_tx(
    tx: &mut Transaction<'_, Postgres>,
    voucher_ref: &str,
) -> Result<Option<VoucherHead>, BillError> {
    let head = sqlx::query_as::<_, VoucherHead>(
        r#"
        SELECT user_id, company_id, department_id, store_id, supplier_name, supplier_gst
        FROM bills
        WHERE voucher_reference_number = $1
        ORDER BY created_at, id
        LIMIT 1
        "#,
    )
    .bind(voucher_ref)
    .fetch_optional(&mut **tx)
    .await?;

    Ok(head)
}

/// Fetch the cost code shared by a voucher's lines
pub async fn fetch_cost_code_tx(
    tx: &mut Transaction<'_, Postgres>,
    voucher_ref: &str,
) -> Result<Option<String>, BillError> {
    let cost_code = sqlx::query_scalar::<_, String>(
        r#"
        SELECT cost_code
        FROM bills
        WHERE voucher_reference_number = $1
        LIMIT 1
        "#,
    )
    .bind(voucher_ref)
    .fetch_optional(&mut **tx)
    .await?;

    Ok(cost_code)
}

/// Stamp every line of a voucher approved
///
/// Conditional on the lines still being unapproved and uncancelled; the
/// caller must compare the affected-row count against the line count and
/// abort the transaction on a mismatch, so a concurrent approval that
/// committed first cannot be stamped (and debited) a second time.
pub async fn mark_approved_tx(
    tx: &mut Transaction<'_, Postgres>,
    voucher_ref: &str,
    approved_by: Uuid,
    balance_after_minor: i64,
) -> Result<u64, BillError> {
    let result = sqlx::query(
        r#"
        UPDATE bills
        SET is_approved = TRUE,
            approved_by = $2,
            approved_at = NOW(),
            balance_after_approval_minor = $3
        WHERE voucher_reference_number = $1
          AND is_approved = FALSE
          AND is_cancelled = FALSE
        "#,
    )
    .bind(voucher_ref)
    .bind(approved_by)
    .bind(balance_after_minor)
    .execute(&mut **tx)
    .await?;

    Ok(result.rows_affected())
}

/// Flip every line of a voucher to cancelled, clearing the approval fields
///
/// Conditional on the lines still being approved and uncancelled; the
/// caller must compare the affected-row count against the line count and
/// abort the transaction on a mismatch, so a concurrent cancellation that
/// committed first cannot be refunded a second time.
pub async fn mark_cancelled_tx(
    tx: &mut Transaction<'_, Postgres>,
    voucher_ref: &str,
    cancelled_by: Uuid,
    reason: Option<&str>,
) -> Result<u64, BillError> {
    let result = sqlx::query(
        r#"
        UPDATE bills
        SET is_approved = FALSE,
            approved_by = NULL,
            approved_at = NULL,
            balance_after_approval_minor = NULL,
            is_cancelled = TRUE,
            cancelled_by = $2,
            cancelled_at = NOW(),
            reason_for_reject = $3
        WHERE voucher_reference_number = $1
          AND is_approved = TRUE
          AND is_cancelled = FALSE
        "#,
    )
    .bind(voucher_ref)
    .bind(cancelled_by)
    .bind(reason)
    .execute(&mut **tx)
    .await?;

    Ok(result.rows_affected())
}

/// Self-close a voucher: cancelled + self-closed + bill-closed, no ledger effect
///
/// Conditional on the lines still being unapproved and uncancelled, on the
/// same affected-row-count contract as `mark_approved_tx`.
pub async fn mark_self_closed_tx(
    tx: &mut Transaction<'_, Postgres>,
    voucher_ref: &str,
    cancelled_by: Uuid,
) -> Result<u64, BillError> {
    let result = sqlx::query(
        r#"
        UPDATE bills
        SET is_cancelled = TRUE,
            is_self_closed = TRUE,
            is_bill_closed = TRUE,
            cancelled_by = $2,
            cancelled_at = NOW()
        WHERE voucher_reference_number = $1
          AND is_approved = FALSE
          AND is_cancelled = FALSE
        "#,
    )
    .bind(voucher_ref)
    .bind(cancelled_by)
    .execute(&mut **tx)
    .await?;

    Ok(result.rows_affected())
}

/// Retire every line of a voucher before re-issue (rows are never hard-deleted)
pub async fn close_lines_tx(
    tx: &mut Transaction<'_, Postgres>,
    voucher_ref: &str,
) -> Result<u64, BillError> {
    let result = sqlx::query(
        r#"
        UPDATE bills
        SET is_bill_closed = TRUE
        WHERE voucher_reference_number = $1
        "#,
    )
    .bind(voucher_ref)
    .execute(&mut **tx)
    .await?;

    Ok(result.rows_affected())
}

/// Fetch per-voucher status flags for a set of voucher references
///
/// One row per voucher; `is_approved` requires every line approved, the
/// sent flags are true if any line carries them.
pub async fn fetch_voucher_flags_tx(
    tx: &mut Transaction<'_, Postgres>,
    voucher_refs: &[String],
) -> Result<Vec<VoucherFlags>, BillError> {
    let flags = sqlx::query_as::<_, VoucherFlags>(
        r#"
        SELECT voucher_reference_number,
               BOOL_AND(is_approved) AS is_approved,
               BOOL_OR(sent_to_admin) AS sent_to_admin,
               BOOL_OR(sent_to_tally) AS sent_to_tally
        FROM bills
        WHERE voucher_reference_number = ANY($1)
        GROUP BY voucher_reference_number
        ORDER BY voucher_reference_number
        "#,
    )
    .bind(voucher_refs)
    .fetch_all(&mut **tx)
    .await?;

    Ok(flags)
}

/// Stamp a set of vouchers admin-forwarded with a shared batch pdf id
pub async fn mark_sent_to_admin_tx(
    tx: &mut Transaction<'_, Postgres>,
    voucher_refs: &[String],
    pdf_id: &str,
    sent_at: DateTime<Utc>,
) -> Result<u64, BillError> {
    let result = sqlx::query(
        r#"
        UPDATE bills
        SET sent_to_admin = TRUE,
            sent_to_admin_at = $3,
            pdf_id = $2
        WHERE voucher_reference_number = ANY($1)
        "#,
    )
    .bind(voucher_refs)
    .bind(pdf_id)
    .bind(sent_at)
    .execute(&mut **tx)
    .await?;

    Ok(result.rows_affected())
}

/// Flip a set of vouchers to tally-forwarded
pub async fn mark_sent_to_tally_tx(
    tx: &mut Transaction<'_, Postgres>,
    voucher_refs: &[String],
) -> Result<u64, BillError> {
    let result = sqlx::query(
        r#"
        UPDATE bills
        SET sent_to_tally = TRUE
        WHERE voucher_reference_number = ANY($1)
        "#,
    )
    .bind(voucher_refs)
    .execute(&mut **tx)
    .await?;

    Ok(result.rows_affected())
}
