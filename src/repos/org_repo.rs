//! Repository for org lookup tables (companies, departments, stores)
//!
//! Batch creation resolves display names through these tables; deposits
//! resolve a store's cost code for transition-id scoping.

use sqlx::{FromRow, Postgres, Transaction};
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during org repository operations
#[derive(Debug, Error)]
pub enum OrgError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Store lookup model
#[derive(Debug, Clone, FromRow)]
pub struct Store {
    pub id: Uuid,
    pub cost_code: String,
    pub store_name: String,
}

/// Resolve a company's display name
pub async fn company_name_tx(
    tx: &mut Transaction<'_, Postgres>,
    company_id: Uuid,
) -> Result<Option<String>, OrgError> {
    let name = sqlx::query_scalar::<_, String>(
        "SELECT company_name FROM companies WHERE id = $1",
    )
    .bind(company_id)
    .fetch_optional(&mut **tx)
    .await?;

    Ok(name)
}

/// Resolve a department's display name
pub async fn department_name_tx(
    tx: &mut Transaction<'_, Postgres>,
    department_id: Uuid,
) -> Result<Option<String>, OrgError> {
    let name = sqlx::query_scalar::<_, String>(
        "SELECT department FROM departments WHERE id = $1",
    )
    .bind(department_id)
    .fetch_optional(&mut **tx)
    .await?;

    Ok(name)
}

/// Fetch a store row by id
pub async fn find_store_tx(
    tx: &mut Transaction<'_, Postgres>,
    store_id: Uuid,
) -> Result<Option<Store>, OrgError> {
    let store = sqlx::query_as::<_, Store>(
        "SELECT id, cost_code, store_name FROM stores WHERE id = $1",
    )
    .bind(store_id)
    .fetch_optional(&mut **tx)
    .await?;

    Ok(store)
}
