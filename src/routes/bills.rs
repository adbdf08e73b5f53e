//! Bill Batch API Routes
//!
//! - `POST /api/bills` — create a line-item batch under a new voucher number
//! - `POST /api/bills/addbill` — create a batch under a caller-supplied number

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sqlx::PgPool;
use std::sync::Arc;

use crate::contracts::bill_batch_v1::{AddBillRequest, BillBatchRequest, BillBatchResponse};
use crate::services::bill_service::{self, BillServiceError};

/// Error response wrapper
#[derive(Debug, serde::Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Bill batch error HTTP response
#[derive(Debug)]
pub struct BillHttpError {
    pub status: StatusCode,
    pub message: String,
}

impl IntoResponse for BillHttpError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            error: self.message,
        });
        (self.status, body).into_response()
    }
}

/// Map service errors to HTTP status codes
fn map_error(error: BillServiceError) -> BillHttpError {
    match error {
        BillServiceError::Validation(_) => BillHttpError {
            status: StatusCode::BAD_REQUEST,
            message: error.to_string(),
        },
        BillServiceError::VoucherExists(_) => BillHttpError {
            status: StatusCode::CONFLICT,
            message: error.to_string(),
        },
        BillServiceError::Numbering(_)
        | BillServiceError::Bill(_)
        | BillServiceError::Org(_)
        | BillServiceError::Database(_) => BillHttpError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "Database error".to_string(), // Don't leak internal details
        },
    }
}

/// Handler for POST /api/bills
pub async fn create_bill_batch(
    State(pool): State<Arc<PgPool>>,
    Json(request): Json<BillBatchRequest>,
) -> Result<(StatusCode, Json<BillBatchResponse>), BillHttpError> {
    let response = bill_service::create_batch(&pool, &request)
        .await
        .map_err(map_error)?;

    Ok((StatusCode::CREATED, Json(response)))
}

/// Handler for POST /api/bills/addbill
pub async fn add_bill(
    State(pool): State<Arc<PgPool>>,
    Json(request): Json<AddBillRequest>,
) -> Result<(StatusCode, Json<BillBatchResponse>), BillHttpError> {
    let response =
        bill_service::create_with_voucher(&pool, &request.voucher_reference_number, &request.batch)
            .await
            .map_err(map_error)?;

    Ok((StatusCode::CREATED, Json(response)))
}
