//! Re-issue API Route
//!
//! `PUT /api/bills/update-batch/{voucher}` — re-issue an edited cancelled
//! voucher under a `BASE/N` reference.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sqlx::PgPool;
use std::sync::Arc;

use crate::contracts::bill_batch_v1::{ReissueVoucherRequest, ReissueVoucherResponse};
use crate::services::reissue_service::{self, ReissueError};

use super::bills::ErrorResponse;

/// Re-issue error HTTP response
#[derive(Debug)]
pub struct ReissueHttpError {
    pub status: StatusCode,
    pub message: String,
}

impl IntoResponse for ReissueHttpError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            error: self.message,
        });
        (self.status, body).into_response()
    }
}

/// Map service errors to HTTP status codes
fn map_error(error: ReissueError) -> ReissueHttpError {
    match error {
        ReissueError::VoucherNotFound(_) => ReissueHttpError {
            status: StatusCode::NOT_FOUND,
            message: error.to_string(),
        },
        ReissueError::NotCancelled(_) | ReissueError::Validation(_) => ReissueHttpError {
            status: StatusCode::BAD_REQUEST,
            message: error.to_string(),
        },
        ReissueError::Numbering(_) | ReissueError::Bill(_) | ReissueError::Database(_) => {
            ReissueHttpError {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                message: "Database error".to_string(),
            }
        }
    }
}

/// Handler for PUT /api/bills/update-batch/{voucher}
pub async fn update_batch(
    State(pool): State<Arc<PgPool>>,
    Path(voucher): Path<String>,
    Json(request): Json<ReissueVoucherRequest>,
) -> Result<Json<ReissueVoucherResponse>, ReissueHttpError> {
    let response = reissue_service::reissue_voucher(&pool, &voucher, &request)
        .await
        .map_err(map_error)?;

    Ok(Json(response))
}
