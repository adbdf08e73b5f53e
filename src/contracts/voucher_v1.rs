//! Voucher Read Contract Types
//!
//! `GET /api/bills/voucher/{voucher}` — all lines of a voucher plus the
//! aggregate derived over them. A voucher is never stored directly; its
//! status is always MIN/MAX/SUM over its lines.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::bill_batch_v1::BillType;

/// One persisted bill line as returned to clients
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BillLineView {
    pub id: Uuid,
    pub voucher_reference_number: String,
    pub billtype: BillType,
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

/// Aggregate status derived over a voucher's lines
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VoucherAggregate {
    pub line_count: i64,
    pub total_amount_minor: i64,
    /// True only when every line is approved
    pub is_approved: bool,
    /// True when any line is cancelled
    pub is_cancelled: bool,
    pub sent_to_admin: bool,
    pub sent_to_tally: bool,
}

/// Full voucher response: derived aggregate plus constituent lines
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VoucherResponse {
    pub voucher_reference_number: String,
    pub aggregate: VoucherAggregate,
    pub lines: Vec<BillLineView>,
}
