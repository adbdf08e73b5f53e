//! Deposit (Passbook) Contract Types
//!
//! - `POST /api/passbook` — record a deposit, credit the store ledger
//! - `GET /api/passbook/store/{store_id}` — a store's transition history

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request to record a cash deposit against a store
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AddCashRequest {
    pub store_id: Uuid,
    pub depositor_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_id: Option<Uuid>,
    /// How the money arrived, e.g. "Cash", "Cheque", "UPI"
    pub payment_mode: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cheque_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cheque_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upi_reference: Option<String>,
    /// Deposit amount in minor units (must be > 0)
    pub amount_minor: i64,
}

/// Response after a successful deposit
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AddCashResponse {
    /// Sequenced deposit reference, e.g. "C1-CR-2025-001"
    pub transition_id: String,
    /// Ledger balance after the credit, in minor units
    pub balance_minor: i64,
}

/// One row of a store's transition history
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransitionView {
    pub tnx_id: String,
    pub transition_type: String,
    pub supplier: String,
    pub amount_minor: i64,
    pub balance_minor: i64,
    pub created_at: DateTime<Utc>,
}

/// Response listing a store's transitions, most recent first
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoreTransitionsResponse {
    pub store_id: Uuid,
    pub transitions: Vec<TransitionView>,
}
