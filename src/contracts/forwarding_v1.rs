//! Admin/Tally Forwarding Contract Types
//!
//! - `POST /api/bills/send-to-admin` — forward approved vouchers (one-way)
//! - `POST /api/bills/send-to-tally` — forward admin-sent vouchers (one-way)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Request naming the vouchers to forward
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForwardBillsRequest {
    pub voucher_refs: Vec<String>,
}

/// Response after forwarding to admin
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SendToAdminResponse {
    pub updated_lines: u64,
    pub sent_to_admin_at: DateTime<Utc>,
    /// Shared batch id stamped on every forwarded line, e.g. "FRI001122"
    pub pdf_id: String,
}

/// Response after forwarding to Tally
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SendToTallyResponse {
    pub updated_lines: u64,
}
