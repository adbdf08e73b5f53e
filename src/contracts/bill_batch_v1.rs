//! Bill Batch Contract Types
//!
//! Payloads for voucher creation:
//! - `POST /api/bills` — create a line-item batch under a freshly numbered voucher
//! - `POST /api/bills/addbill` — create a batch under a caller-supplied voucher number
//! - `PUT /api/bills/update-batch/{voucher}` — re-issue an edited cancelled voucher

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Voucher subtype. `Advance` vouchers are cash advances and must not carry
/// invoice or GST fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "bill_type", rename_all = "snake_case")]
pub enum BillType {
    Gst,
    NonGst,
    Advance,
}

impl std::fmt::Display for BillType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Gst => write!(f, "gst"),
            Self::NonGst => write!(f, "non_gst"),
            Self::Advance => write!(f, "advance"),
        }
    }
}

/// A single expense line item within a voucher
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BillItem {
    pub supplier_name: String,
    pub nature_of_expense: String,
    pub head_of_accounts: String,
    pub instructed_by: String,

    /// Line amount in minor units (must be > 0)
    pub amount_minor: i64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,

    // Invoice/GST fields: required for gst items, forbidden for advance items
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_reference_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplier_gst: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub taxable_amount_minor: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub igst_rate_bp: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cgst_rate_bp: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sgst_rate_bp: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub igst_minor: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cgst_minor: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sgst_minor: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rounding_off_minor: Option<i64>,
}

/// Request to create a line-item batch under a new voucher number
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BillBatchRequest {
    pub billtype: BillType,
    pub user_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department_id: Option<Uuid>,
    /// Required for advance vouchers (advance sequences are per store)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_id: Option<Uuid>,
    pub cost_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voucher_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub narration: Option<String>,
    pub items: Vec<BillItem>,
}

/// Request to create a batch under a caller-supplied voucher number
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AddBillRequest {
    pub voucher_reference_number: String,
    #[serde(flatten)]
    pub batch: BillBatchRequest,
}

/// Response for both batch-creation endpoints
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BillBatchResponse {
    pub voucher_reference_number: String,
    pub billtype: BillType,
    /// Sum of committed line amounts in minor units
    pub total_amount_minor: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
}

/// Request to re-issue an edited cancelled voucher under a `BASE/N` reference
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReissueVoucherRequest {
    pub billtype: BillType,
    pub user_id: Uuid,
    pub items: Vec<BillItem>,
}

/// Response for a re-issue: the derived reference of the replacement voucher
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReissueVoucherResponse {
    pub closed_voucher_reference_number: String,
    pub voucher_reference_number: String,
    pub total_amount_minor: i64,
}
