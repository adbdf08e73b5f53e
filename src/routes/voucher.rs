//! Voucher Read API Route
//!
//! `GET /api/bills/voucher/{voucher}` — every line of a voucher plus the
//! aggregate status derived over them.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sqlx::PgPool;
use std::sync::Arc;

use crate::contracts::voucher_v1::{BillLineView, VoucherAggregate, VoucherResponse};
use crate::repos::bill_repo::{self, BillLine};

use super::bills::ErrorResponse;

/// Voucher read error HTTP response
#[derive(Debug)]
pub struct VoucherHttpError {
    pub status: StatusCode,
    pub message: String,
}

impl IntoResponse for VoucherHttpError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            error: self.message,
        });
        (self.status, body).into_response()
    }
}

/// Derive the aggregate status from a voucher's lines
fn aggregate_lines(lines: &[BillLine]) -> VoucherAggregate {
    VoucherAggregate {
        line_count: lines.len() as i64,
        total_amount_minor: lines.iter().map(|l| l.total_amount_minor).sum(),
        is_approved: lines.iter().all(|l| l.is_approved),
        is_cancelled: lines.iter().any(|l| l.is_cancelled),
        sent_to_admin: lines.iter().any(|l| l.sent_to_admin),
        sent_to_tally: lines.iter().any(|l| l.sent_to_tally),
    }
}

/// Handler for GET /api/bills/voucher/{voucher}
pub async fn get_voucher(
    State(pool): State<Arc<PgPool>>,
    Path(voucher): Path<String>,
) -> Result<Json<VoucherResponse>, VoucherHttpError> {
    let lines = bill_repo::fetch_lines_by_voucher(&pool, &voucher)
        .await
        .map_err(|_| VoucherHttpError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "Database error".to_string(),
        })?;

    if lines.is_empty() {
        return Err(VoucherHttpError {
            status: StatusCode::NOT_FOUND,
            message: format!("Voucher not found: {voucher}"),
        });
    }

    let aggregate = aggregate_lines(&lines);

    let line_views = lines
        .into_iter()
        .map(|l| BillLineView {
            id: l.id,
            voucher_reference_number: l.voucher_reference_number,
            billtype: l.billtype,
            supplier_name: l.supplier_name,
            nature_of_expense: l.nature_of_expense,
            head_of_accounts: l.head_of_accounts,
            instructed_by: l.instructed_by,
            total_amount_minor: l.total_amount_minor,
            is_approved: l.is_approved,
            is_cancelled: l.is_cancelled,
            is_self_closed: l.is_self_closed,
            is_bill_closed: l.is_bill_closed,
            sent_to_admin: l.sent_to_admin,
            sent_to_tally: l.sent_to_tally,
            voucher_date: l.voucher_date,
            created_at: l.created_at,
        })
        .collect();

    Ok(Json(VoucherResponse {
        voucher_reference_number: voucher,
        aggregate,
        lines: line_views,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contracts::bill_batch_v1::BillType;
    use chrono::Utc;
    use uuid::Uuid;

    fn line(amount_minor: i64, is_approved: bool) -> BillLine {
        BillLine {
            id: Uuid::new_v4(),
            voucher_reference_number: "C1-2025-001".to_string(),
            billtype: BillType::NonGst,
            user_id: Uuid::new_v4(),
            supplier_name: "Acme Traders".to_string(),
            nature_of_expense: "Stationery".to_string(),
            head_of_accounts: "Office Expenses".to_string(),
            instructed_by: "Manager".to_string(),
            total_amount_minor: amount_minor,
            is_approved,
            is_cancelled: false,
            is_self_closed: false,
            is_bill_closed: false,
            sent_to_admin: false,
            sent_to_tally: false,
            voucher_date: Utc::now().date_naive(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn aggregate_sums_amounts() {
        let agg = aggregate_lines(&[line(10_000, true), line(5_050, true)]);
        assert_eq!(agg.line_count, 2);
        assert_eq!(agg.total_amount_minor, 15_050);
        assert!(agg.is_approved);
    }

    #[test]
    fn voucher_is_approved_only_when_every_line_is() {
        let agg = aggregate_lines(&[line(10_000, true), line(5_050, false)]);
        assert!(!agg.is_approved);
    }
}
