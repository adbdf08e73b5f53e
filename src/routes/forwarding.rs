//! Forwarding API Routes
//!
//! - `POST /api/bills/send-to-admin` — forward approved vouchers to admin
//! - `POST /api/bills/send-to-tally` — forward admin-sent vouchers to Tally

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sqlx::PgPool;
use std::sync::Arc;

use crate::contracts::forwarding_v1::{
    ForwardBillsRequest, SendToAdminResponse, SendToTallyResponse,
};
use crate::services::forwarding_service::{self, ForwardingError};

use super::bills::ErrorResponse;

/// Forwarding error HTTP response
#[derive(Debug)]
pub struct ForwardingHttpError {
    pub status: StatusCode,
    pub message: String,
}

impl IntoResponse for ForwardingHttpError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            error: self.message,
        });
        (self.status, body).into_response()
    }
}

/// Map service errors to HTTP status codes
fn map_error(error: ForwardingError) -> ForwardingHttpError {
    match error {
        ForwardingError::EmptyRequest
        | ForwardingError::BlankVoucherRef
        | ForwardingError::NotEligible(_) => ForwardingHttpError {
            status: StatusCode::BAD_REQUEST,
            message: error.to_string(),
        },
        ForwardingError::VouchersNotFound(_) => ForwardingHttpError {
            status: StatusCode::NOT_FOUND,
            message: error.to_string(),
        },
        ForwardingError::Bill(_) | ForwardingError::Database(_) => ForwardingHttpError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "Database error".to_string(),
        },
    }
}

/// Handler for POST /api/bills/send-to-admin
pub async fn send_to_admin(
    State(pool): State<Arc<PgPool>>,
    Json(request): Json<ForwardBillsRequest>,
) -> Result<Json<SendToAdminResponse>, ForwardingHttpError> {
    let response = forwarding_service::send_to_admin(&pool, &request)
        .await
        .map_err(map_error)?;

    Ok(Json(response))
}

/// Handler for POST /api/bills/send-to-tally
pub async fn send_to_tally(
    State(pool): State<Arc<PgPool>>,
    Json(request): Json<ForwardBillsRequest>,
) -> Result<Json<SendToTallyResponse>, ForwardingHttpError> {
    let response = forwarding_service::send_to_tally(&pool, &request)
        .await
        .map_err(map_error)?;

    Ok(Json(response))
}
