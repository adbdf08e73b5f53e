//! Cancellation API Routes
//!
//! - `POST /api/bills/generateCancelOtp/{voucher}` — issue a cancellation OTP
//! - `PUT /api/bills/cancel/{voucher}` — consume OTP, refund the store ledger
//! - `PUT /api/bills/cancel-by-user/{voucher}` — self-cancel, no ledger effect

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sqlx::PgPool;
use std::sync::Arc;

use crate::contracts::cancel_v1::{
    CancelBillRequest, CancelBillResponse, CancelByUserRequest, CancelByUserResponse,
    GenerateCancelOtpResponse,
};
use crate::services::cancellation_service::{self, CancellationError};

use super::bills::ErrorResponse;

/// Cancellation error HTTP response
#[derive(Debug)]
pub struct CancelHttpError {
    pub status: StatusCode,
    pub message: String,
}

impl IntoResponse for CancelHttpError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            error: self.message,
        });
        (self.status, body).into_response()
    }
}

/// Map service errors to HTTP status codes
fn map_error(error: CancellationError) -> CancelHttpError {
    match error {
        CancellationError::VoucherNotFound(_) | CancellationError::StoreNotFound(_) => {
            CancelHttpError {
                status: StatusCode::NOT_FOUND,
                message: error.to_string(),
            }
        }
        CancellationError::AlreadyCancelled(_) | CancellationError::AlreadyApproved(_) => {
            CancelHttpError {
                status: StatusCode::CONFLICT,
                message: error.to_string(),
            }
        }
        CancellationError::NotApproved(_) | CancellationError::InvalidOtp(_) => CancelHttpError {
            status: StatusCode::BAD_REQUEST,
            message: error.to_string(),
        },
        CancellationError::NotOwner(_, _) => CancelHttpError {
            status: StatusCode::FORBIDDEN,
            message: error.to_string(),
        },
        CancellationError::Bill(_)
        | CancellationError::Ledger(_)
        | CancellationError::Otp(_)
        | CancellationError::Transition(_)
        | CancellationError::Database(_) => CancelHttpError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "Database error".to_string(),
        },
    }
}

/// Handler for POST /api/bills/generateCancelOtp/{voucher}
pub async fn generate_cancel_otp(
    State(pool): State<Arc<PgPool>>,
    Path(voucher): Path<String>,
) -> Result<Json<GenerateCancelOtpResponse>, CancelHttpError> {
    let response = cancellation_service::generate_cancel_otp(&pool, &voucher)
        .await
        .map_err(map_error)?;

    Ok(Json(response))
}

/// Handler for PUT /api/bills/cancel/{voucher}
pub async fn cancel_bill(
    State(pool): State<Arc<PgPool>>,
    Path(voucher): Path<String>,
    Json(request): Json<CancelBillRequest>,
) -> Result<Json<CancelBillResponse>, CancelHttpError> {
    let response = cancellation_service::cancel_voucher(&pool, &voucher, &request)
        .await
        .map_err(map_error)?;

    Ok(Json(response))
}

/// Handler for PUT /api/bills/cancel-by-user/{voucher}
pub async fn cancel_bill_by_user(
    State(pool): State<Arc<PgPool>>,
    Path(voucher): Path<String>,
    Json(request): Json<CancelByUserRequest>,
) -> Result<Json<CancelByUserResponse>, CancelHttpError> {
    let response = cancellation_service::cancel_by_user(&pool, &voucher, &request)
        .await
        .map_err(map_error)?;

    Ok(Json(response))
}
