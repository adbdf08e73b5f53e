//! Repository for deposit operations
//!
//! Deposits are immutable once written. Their transition ids are sequenced
//! per (cost_code, year) under the `{cost_code}-CR-{year}-NNN` format; the
//! sequence read locks the latest matching row so concurrent deposits to the
//! same store cannot allocate the same id.

use chrono::NaiveDate;
use sqlx::{Postgres, Transaction};
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during deposit repository operations
#[derive(Debug, Error)]
pub enum DepositError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Struct for inserting a deposit
#[derive(Debug, Clone)]
pub struct DepositInsert {
    pub id: Uuid,
    pub transition_id: String,
    pub company_id: Option<Uuid>,
    pub store_id: Uuid,
    pub depositor_id: Uuid,
    pub payment_mode: String,
    pub cheque_date: Option<NaiveDate>,
    pub cheque_number: Option<String>,
    pub bank_name: Option<String>,
    pub upi_reference: Option<String>,
    pub amount_minor: i64,
    pub balance_after_minor: i64,
}

/// Lock and fetch the latest deposit transition id for a store and prefix
///
/// The `FOR UPDATE` lock serializes concurrent sequence reads for the same
/// store until the surrounding transaction commits.
pub async fn last_transition_id_for_update_tx(
    tx: &mut Transaction<'_, Postgres>,
    store_id: Uuid,
    prefix: &str,
) -> Result<Option<String>, DepositError> {
    let last = sqlx::query_scalar::<_, String>(
        r#"
        SELECT transition_id
        FROM deposits
        WHERE store_id = $1
          AND transition_id LIKE $2
        ORDER BY created_at DESC
        LIMIT 1
        FOR UPDATE
        "#,
    )
    .bind(store_id)
    .bind(format!("{prefix}%"))
    .fetch_optional(&mut **tx)
    .await?;

    Ok(last)
}

/// Insert one deposit row within a transaction
pub async fn insert_tx(
    tx: &mut Transaction<'_, Postgres>,
    deposit: &DepositInsert,
) -> Result<(), DepositError> {
    sqlx::query(
        r#"
        INSERT INTO deposits
            (id, transition_id, company_id, store_id, depositor_id, payment_mode,
             cheque_date, cheque_number, bank_name, upi_reference,
             amount_minor, balance_after_minor)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        "#,
    )
    .bind(deposit.id)
    .bind(&deposit.transition_id)
    .bind(deposit.company_id)
    .bind(deposit.store_id)
    .bind(deposit.depositor_id)
    .bind(&deposit.payment_mode)
    .bind(deposit.cheque_date)
    .bind(&deposit.cheque_number)
    .bind(&deposit.bank_name)
    .bind(&deposit.upi_reference)
    .bind(deposit.amount_minor)
    .bind(deposit.balance_after_minor)
    .execute(&mut **tx)
    .await?;

    Ok(())
}
