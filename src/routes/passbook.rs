//! Passbook API Routes
//!
//! - `POST /api/passbook` — record a deposit, credit the store ledger
//! - `GET /api/passbook/store/{store_id}` — a store's transition history

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::contracts::deposit_v1::{AddCashRequest, AddCashResponse, StoreTransitionsResponse};
use crate::services::deposit_service::{self, DepositServiceError};

use super::bills::ErrorResponse;

/// Passbook error HTTP response
#[derive(Debug)]
pub struct PassbookHttpError {
    pub status: StatusCode,
    pub message: String,
}

impl IntoResponse for PassbookHttpError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            error: self.message,
        });
        (self.status, body).into_response()
    }
}

/// Map service errors to HTTP status codes
fn map_error(error: DepositServiceError) -> PassbookHttpError {
    match error {
        DepositServiceError::NonPositiveAmount(_) => PassbookHttpError {
            status: StatusCode::BAD_REQUEST,
            message: error.to_string(),
        },
        DepositServiceError::StoreNotFound(_) => PassbookHttpError {
            status: StatusCode::NOT_FOUND,
            message: error.to_string(),
        },
        DepositServiceError::Deposit(_)
        | DepositServiceError::Ledger(_)
        | DepositServiceError::Org(_)
        | DepositServiceError::Transition(_)
        | DepositServiceError::Database(_) => PassbookHttpError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "Database error".to_string(),
        },
    }
}

/// Handler for POST /api/passbook
pub async fn add_cash(
    State(pool): State<Arc<PgPool>>,
    Json(request): Json<AddCashRequest>,
) -> Result<(StatusCode, Json<AddCashResponse>), PassbookHttpError> {
    let response = deposit_service::add_cash(&pool, &request)
        .await
        .map_err(map_error)?;

    Ok((StatusCode::CREATED, Json(response)))
}

/// Handler for GET /api/passbook/store/{store_id}
pub async fn store_transitions(
    State(pool): State<Arc<PgPool>>,
    Path(store_id): Path<Uuid>,
) -> Result<Json<StoreTransitionsResponse>, PassbookHttpError> {
    let response = deposit_service::store_transitions(&pool, store_id)
        .await
        .map_err(map_error)?;

    Ok(Json(response))
}
