//! Approval API Route
//!
//! `PUT /api/bills/approve/{voucher}` — debit the store ledger and stamp
//! every line of the voucher approved.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sqlx::PgPool;
use std::sync::Arc;

use crate::contracts::cancel_v1::{ApproveBillRequest, ApproveBillResponse};
use crate::services::approval_service::{self, ApprovalError};

use super::bills::ErrorResponse;

/// Approval error HTTP response
#[derive(Debug)]
pub struct ApproveHttpError {
    pub status: StatusCode,
    pub message: String,
}

impl IntoResponse for ApproveHttpError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            error: self.message,
        });
        (self.status, body).into_response()
    }
}

/// Map service errors to HTTP status codes
fn map_error(error: ApprovalError) -> ApproveHttpError {
    match error {
        ApprovalError::VoucherNotFound(_) | ApprovalError::StoreNotFound(_) => ApproveHttpError {
            status: StatusCode::NOT_FOUND,
            message: error.to_string(),
        },
        ApprovalError::AlreadyApproved(_) | ApprovalError::Cancelled(_) => ApproveHttpError {
            status: StatusCode::CONFLICT,
            message: error.to_string(),
        },
        ApprovalError::InsufficientFunds { .. } => ApproveHttpError {
            status: StatusCode::BAD_REQUEST,
            message: error.to_string(),
        },
        ApprovalError::Bill(_)
        | ApprovalError::Ledger(_)
        | ApprovalError::Transition(_)
        | ApprovalError::Database(_) => ApproveHttpError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "Database error".to_string(),
        },
    }
}

/// Handler for PUT /api/bills/approve/{voucher}
pub async fn approve_bill(
    State(pool): State<Arc<PgPool>>,
    Path(voucher): Path<String>,
    Json(request): Json<ApproveBillRequest>,
) -> Result<Json<ApproveBillResponse>, ApproveHttpError> {
    let response = approval_service::approve_voucher(&pool, &voucher, &request)
        .await
        .map_err(map_error)?;

    Ok(Json(response))
}
