//! Approval and Cancellation Contract Types
//!
//! - `PUT /api/bills/approve/{voucher}` — debit the store ledger, stamp approval
//! - `POST /api/bills/generateCancelOtp/{voucher}` — issue a cancellation OTP
//! - `PUT /api/bills/cancel/{voucher}` — consume OTP, credit the ledger back
//! - `PUT /api/bills/cancel-by-user/{voucher}` — self-cancel, no ledger effect

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request to approve a voucher against a store's ledger
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApproveBillRequest {
    pub approved_by: Uuid,
    pub store_id: Uuid,
    /// Amount to debit in minor units
    pub amount_minor: i64,
}

/// Response after a successful approval
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApproveBillResponse {
    pub voucher_reference_number: String,
    /// Ledger balance after the debit, in minor units
    pub balance_minor: i64,
    pub approved_at: DateTime<Utc>,
}

/// Response carrying the issued OTP
///
/// Outbound SMS delivery is an external collaborator; the code is returned
/// to the caller directly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenerateCancelOtpResponse {
    pub voucher_reference_number: String,
    pub otp_code: String,
    pub expires_at: DateTime<Utc>,
}

/// Request to cancel an approved voucher with a previously issued OTP
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CancelBillRequest {
    pub otp: String,
    pub store_id: Uuid,
    pub cancelled_by: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason_for_reject: Option<String>,
}

/// Response after a successful cancellation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CancelBillResponse {
    pub voucher_reference_number: String,
    /// Amount credited back to the ledger, in minor units
    pub refunded_minor: i64,
    /// Ledger balance after the credit, in minor units
    pub balance_minor: i64,
}

/// Request for a user self-cancelling their own unapproved voucher
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CancelByUserRequest {
    pub user_id: Uuid,
}

/// Response after a self-cancellation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CancelByUserResponse {
    pub voucher_reference_number: String,
    pub cancelled_lines: u64,
}
