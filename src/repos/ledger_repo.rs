//! Repository for store ledger operations
//!
//! The store balance is the principal shared mutable resource. Every
//! mutation here runs inside a caller-owned transaction: the balance row is
//! locked with `FOR UPDATE` before any read-check-write sequence, so two
//! concurrent approvals cannot both pass the sufficiency check.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, Postgres, Transaction};
use thiserror::Error;
use uuid::Uuid;

/// Store balance model: one mutable running cash figure per store
#[derive(Debug, Clone, FromRow)]
pub struct StoreBalance {
    pub store_id: Uuid,
    pub available_cash_minor: i64,
    pub updated_at: DateTime<Utc>,
}

/// Errors that can occur during ledger repository operations
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Lock and fetch a store's balance row
///
/// Returns None if the store has never received a deposit. The row lock is
/// held until the surrounding transaction commits, serializing concurrent
/// debits/credits against the same store.
pub async fn find_for_update_tx(
    tx: &mut Transaction<'_, Postgres>,
    store_id: Uuid,
) -> Result<Option<StoreBalance>, LedgerError> {
    let balance = sqlx::query_as::<_, StoreBalance>(
        r#"
        SELECT store_id, available_cash_minor, updated_at
        FROM store_balances
        WHERE store_id = $1
        FOR UPDATE
        "#,
    )
    .bind(store_id)
    .fetch_optional(&mut **tx)
    .await?;

    Ok(balance)
}

/// Debit a store's ledger by `amount_minor`
///
/// The condition `available_cash_minor >= $2` makes the debit a conditional
/// update: no row is returned when funds are insufficient, and the ledger is
/// left untouched.
///
/// # Returns
/// The balance after the debit, or None if funds were insufficient
pub async fn try_debit_tx(
    tx: &mut Transaction<'_, Postgres>,
    store_id: Uuid,
    amount_minor: i64,
) -> Result<Option<i64>, LedgerError> {
    let new_balance = sqlx::query_scalar::<_, i64>(
        r#"
        UPDATE store_balances
        SET available_cash_minor = available_cash_minor - $2,
            updated_at = NOW()
        WHERE store_id = $1
          AND available_cash_minor >= $2
        RETURNING available_cash_minor
        "#,
    )
    .bind(store_id)
    .bind(amount_minor)
    .fetch_optional(&mut **tx)
    .await?;

    Ok(new_balance)
}

/// Credit a store's ledger by `amount_minor`
///
/// # Returns
/// The balance after the credit, or None if no balance row exists
pub async fn credit_tx(
    tx: &mut Transaction<'_, Postgres>,
    store_id: Uuid,
    amount_minor: i64,
) -> Result<Option<i64>, LedgerError> {
    let new_balance = sqlx::query_scalar::<_, i64>(
        r#"
        UPDATE store_balances
        SET available_cash_minor = available_cash_minor + $2,
            updated_at = NOW()
        WHERE store_id = $1
        RETURNING available_cash_minor
        "#,
    )
    .bind(store_id)
    .bind(amount_minor)
    .fetch_optional(&mut **tx)
    .await?;

    Ok(new_balance)
}

/// Credit a store's ledger, creating the balance row on first deposit
///
/// INSERT if no row exists for the store, additive UPDATE otherwise
/// (the lazy-creation path used by deposits).
///
/// # Returns
/// The balance after the credit
pub async fn upsert_credit_tx(
    tx: &mut Transaction<'_, Postgres>,
    store_id: Uuid,
    amount_minor: i64,
) -> Result<i64, LedgerError> {
    let new_balance = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO store_balances (store_id, available_cash_minor, updated_at)
        VALUES ($1, $2, NOW())
        ON CONFLICT (store_id)
        DO UPDATE SET
            available_cash_minor = store_balances.available_cash_minor + EXCLUDED.available_cash_minor,
            updated_at = NOW()
        RETURNING available_cash_minor
        "#,
    )
    .bind(store_id)
    .bind(amount_minor)
    .fetch_one(&mut **tx)
    .await?;

    Ok(new_balance)
}
