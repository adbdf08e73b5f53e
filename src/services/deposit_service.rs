//! Deposit (Passbook) Service
//!
//! Records a cash deposit against a store: allocates the next
//! `{cost_code}-CR-{year}-NNN` transition id, credits the store ledger
//! (creating the balance row on first deposit) and appends a credit
//! transition, all in one transaction. The sequence read locks the latest
//! deposit row so concurrent deposits to the same store cannot share an id.

use chrono::{Datelike, Utc};
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::contracts::deposit_v1::{
    AddCashRequest, AddCashResponse, StoreTransitionsResponse, TransitionView,
};
use crate::repos::{deposit_repo, ledger_repo, org_repo, transition_repo};

/// Errors that can occur during deposit operations
#[derive(Debug, Error)]
pub enum DepositServiceError {
    #[error("amount_minor must be positive, got {0}")]
    NonPositiveAmount(i64),

    #[error("Store not found: {0}")]
    StoreNotFound(Uuid),

    #[error(transparent)]
    Deposit(#[from] deposit_repo::DepositError),

    #[error(transparent)]
    Ledger(#[from] ledger_repo::LedgerError),

    #[error(transparent)]
    Org(#[from] org_repo::OrgError),

    #[error(transparent)]
    Transition(#[from] transition_repo::TransitionError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Next deposit transition id given the last allocated one for this prefix
///
/// A malformed tail restarts at 1 rather than failing the deposit.
fn next_transition_id(prefix: &str, last: Option<&str>) -> String {
    let next_seq = last
        .and_then(|id| id.rsplit('-').next())
        .and_then(|tail| tail.parse::<u32>().ok())
        .unwrap_or(0)
        + 1;

    format!("{prefix}-{next_seq:03}")
}

/// Record a deposit and credit the store ledger
pub async fn add_cash(
    pool: &PgPool,
    request: &AddCashRequest,
) -> Result<AddCashResponse, DepositServiceError> {
    if request.amount_minor <= 0 {
        return Err(DepositServiceError::NonPositiveAmount(request.amount_minor));
    }

    let mut tx = pool.begin().await?;

    let store = org_repo::find_store_tx(&mut tx, request.store_id)
        .await?
        .ok_or(DepositServiceError::StoreNotFound(request.store_id))?;

    let year = Utc::now().year();
    let prefix = format!("{}-CR-{year}", store.cost_code);

    let last =
        deposit_repo::last_transition_id_for_update_tx(&mut tx, request.store_id, &prefix).await?;
    let transition_id = next_transition_id(&prefix, last.as_deref());

    let new_balance =
        ledger_repo::upsert_credit_tx(&mut tx, request.store_id, request.amount_minor).await?;

    deposit_repo::insert_tx(
        &mut tx,
        &deposit_repo::DepositInsert {
            id: Uuid::new_v4(),
            transition_id: transition_id.clone(),
            company_id: request.company_id,
            store_id: request.store_id,
            depositor_id: request.depositor_id,
            payment_mode: request.payment_mode.clone(),
            cheque_date: request.cheque_date,
            cheque_number: request.cheque_number.clone(),
            bank_name: request.bank_name.clone(),
            upi_reference: request.upi_reference.clone(),
            amount_minor: request.amount_minor,
            balance_after_minor: new_balance,
        },
    )
    .await?;

    transition_repo::insert_tx(
        &mut tx,
        &transition_repo::TransitionInsert {
            company_id: request.company_id,
            store_id: request.store_id,
            department_id: None,
            tnx_id: transition_id.clone(),
            user_id: request.depositor_id,
            supplier: store.store_name.clone(),
            supplier_gst: None,
            transition_type: transition_repo::TYPE_CREDIT,
            amount_minor: request.amount_minor,
            balance_minor: new_balance,
        },
    )
    .await?;

    tx.commit().await?;

    tracing::info!(
        store = %request.store_id,
        transition_id = %transition_id,
        amount_minor = request.amount_minor,
        balance_minor = new_balance,
        "deposit recorded"
    );

    Ok(AddCashResponse {
        transition_id,
        balance_minor: new_balance,
    })
}

/// A store's transition history, most recent first
pub async fn store_transitions(
    pool: &PgPool,
    store_id: Uuid,
) -> Result<StoreTransitionsResponse, DepositServiceError> {
    let transitions = transition_repo::list_for_store(pool, store_id)
        .await?
        .into_iter()
        .map(|t| TransitionView {
            tnx_id: t.tnx_id,
            transition_type: t.transition_type,
            supplier: t.supplier,
            amount_minor: t.amount_minor,
            balance_minor: t.balance_minor,
            created_at: t.created_at,
        })
        .collect();

    Ok(StoreTransitionsResponse {
        store_id,
        transitions,
    })
}
