//! Repository for the transition audit trail
//!
//! Transitions are append-only: one row per ledger-affecting event (approve
//! debit, deposit credit, cancellation refund), carrying the balance
//! snapshot taken after the event. Rows are never updated or deleted.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use thiserror::Error;
use uuid::Uuid;

/// Transition types recorded in the audit trail
pub const TYPE_DEBIT: &str = "Debit";
pub const TYPE_CREDIT: &str = "Credit";
pub const TYPE_REFUND: &str = "Refund/Cancelled";

/// Errors that can occur during transition repository operations
#[derive(Debug, Error)]
pub enum TransitionError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Struct for appending a transition row
#[derive(Debug, Clone)]
pub struct TransitionInsert {
    pub company_id: Option<Uuid>,
    pub store_id: Uuid,
    pub department_id: Option<Uuid>,
    /// Voucher or deposit reference this event belongs to
    pub tnx_id: String,
    pub user_id: Uuid,
    pub supplier: String,
    pub supplier_gst: Option<String>,
    pub transition_type: &'static str,
    pub amount_minor: i64,
    /// Ledger balance snapshot after this event
    pub balance_minor: i64,
}

/// A persisted transition row
#[derive(Debug, Clone, FromRow)]
pub struct Transition {
    pub id: Uuid,
    pub store_id: Uuid,
    pub tnx_id: String,
    pub supplier: String,
    pub transition_type: String,
    pub amount_minor: i64,
    pub balance_minor: i64,
    pub created_at: DateTime<Utc>,
}

/// Append one transition row within a transaction
pub async fn insert_tx(
    tx: &mut Transaction<'_, Postgres>,
    transition: &TransitionInsert,
) -> Result<Uuid, TransitionError> {
    let id = Uuid::new_v4();

    sqlx::query(
        r#"
        INSERT INTO transitions
            (id, company_id, store_id, department_id, tnx_id, user_id,
             supplier, supplier_gst, transition_type, amount_minor, balance_minor)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        "#,
    )
    .bind(id)
    .bind(transition.company_id)
    .bind(transition.store_id)
    .bind(transition.department_id)
    .bind(&transition.tnx_id)
    .bind(transition.user_id)
    .bind(&transition.supplier)
    .bind(&transition.supplier_gst)
    .bind(transition.transition_type)
    .bind(transition.amount_minor)
    .bind(transition.balance_minor)
    .execute(&mut **tx)
    .await?;

    Ok(id)
}

/// List a store's transitions, most recent first
pub async fn list_for_store(
    pool: &PgPool,
    store_id: Uuid,
) -> Result<Vec<Transition>, TransitionError> {
    let transitions = sqlx::query_as::<_, Transition>(
        r#"
        SELECT id, store_id, tnx_id, supplier, transition_type,
               amount_minor, balance_minor, created_at
        FROM transitions
        WHERE store_id = $1
        ORDER BY created_at DESC, id DESC
        "#,
    )
    .bind(store_id)
    .fetch_all(pool)
    .await?;

    Ok(transitions)
}
