//! Forwarding Service
//!
//! One-way batch stamps toward downstream accounting:
//!
//! - send-to-admin: every named voucher must be fully approved and not yet
//!   admin-sent; the batch is stamped with a shared `FRI`-prefixed pdf id.
//! - send-to-tally: every named voucher must already be admin-sent and not
//!   yet tally-sent.
//!
//! Either every voucher in the request qualifies or none is stamped; the
//! rejection names the offending references.

use chrono::Utc;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::contracts::forwarding_v1::{
    ForwardBillsRequest, SendToAdminResponse, SendToTallyResponse,
};
use crate::repos::bill_repo;

/// Errors that can occur during forwarding
#[derive(Debug, Error)]
pub enum ForwardingError {
    #[error("voucher_refs must have at least 1 entry")]
    EmptyRequest,

    #[error("voucher_refs must not contain blank entries")]
    BlankVoucherRef,

    #[error("Vouchers not found: {0:?}")]
    VouchersNotFound(Vec<String>),

    #[error("Vouchers not eligible for forwarding: {0:?}")]
    NotEligible(Vec<String>),

    #[error(transparent)]
    Bill(#[from] bill_repo::BillError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Batch id stamped on every admin-forwarded line, e.g. "FRI001122"
fn generate_pdf_id() -> String {
    format!("FRI{:06}", Uuid::new_v4().as_u128() % 1_000_000)
}

/// Trim and dedupe the requested voucher refs
///
/// Blank entries are a 400; duplicates collapse to one so they cannot skew
/// the found-versus-requested comparison.
fn normalize_refs(refs: &[String]) -> Result<Vec<String>, ForwardingError> {
    if refs.is_empty() {
        return Err(ForwardingError::EmptyRequest);
    }

    let mut normalized: Vec<String> = Vec::with_capacity(refs.len());
    for r in refs {
        let trimmed = r.trim();
        if trimmed.is_empty() {
            return Err(ForwardingError::BlankVoucherRef);
        }
        if !normalized.iter().any(|n| n == trimmed) {
            normalized.push(trimmed.to_string());
        }
    }

    Ok(normalized)
}

/// Forward approved vouchers to admin
pub async fn send_to_admin(
    pool: &PgPool,
    request: &ForwardBillsRequest,
) -> Result<SendToAdminResponse, ForwardingError> {
    let voucher_refs = normalize_refs(&request.voucher_refs)?;

    let mut tx = pool.begin().await?;

    let flags = bill_repo::fetch_voucher_flags_tx(&mut tx, &voucher_refs).await?;

    check_missing(&voucher_refs, &flags)?;

    let ineligible: Vec<String> = flags
        .iter()
        .filter(|f| !f.is_approved || f.sent_to_admin)
        .map(|f| f.voucher_reference_number.clone())
        .collect();
    if !ineligible.is_empty() {
        return Err(ForwardingError::NotEligible(ineligible));
    }

    let pdf_id = generate_pdf_id();
    let sent_at = Utc::now();
    let updated_lines =
        bill_repo::mark_sent_to_admin_tx(&mut tx, &voucher_refs, &pdf_id, sent_at).await?;

    tx.commit().await?;

    tracing::info!(
        vouchers = voucher_refs.len(),
        updated_lines,
        pdf_id = %pdf_id,
        "vouchers forwarded to admin"
    );

    Ok(SendToAdminResponse {
        updated_lines,
        sent_to_admin_at: sent_at,
        pdf_id,
    })
}

/// Forward admin-sent vouchers to Tally
pub async fn send_to_tally(
    pool: &PgPool,
    request: &ForwardBillsRequest,
) -> Result<SendToTallyResponse, ForwardingError> {
    let voucher_refs = normalize_refs(&request.voucher_refs)?;

    let mut tx = pool.begin().await?;

    let flags = bill_repo::fetch_voucher_flags_tx(&mut tx, &voucher_refs).await?;

    check_missing(&voucher_refs, &flags)?;

    let ineligible: Vec<String> = flags
        .iter()
        .filter(|f| !f.sent_to_admin || f.sent_to_tally)
        .map(|f| f.voucher_reference_number.clone())
        .collect();
    if !ineligible.is_empty() {
        return Err(ForwardingError::NotEligible(ineligible));
    }

    let updated_lines = bill_repo::mark_sent_to_tally_tx(&mut tx, &voucher_refs).await?;

    tx.commit().await?;

    tracing::info!(
        vouchers = voucher_refs.len(),
        updated_lines,
        "vouchers forwarded to tally"
    );

    Ok(SendToTallyResponse { updated_lines })
}

/// Reject when any requested reference has no lines at all
fn check_missing(
    requested: &[String],
    found: &[bill_repo::VoucherFlags],
) -> Result<(), ForwardingError> {
    if found.len() == requested.len() {
        return Ok(());
    }

    let missing: Vec<String> = requested
        .iter()
        .filter(|r| {
            !found
                .iter()
                .any(|f| &f.voucher_reference_number == *r)
        })
        .cloned()
        .collect();

    Err(ForwardingError::VouchersNotFound(missing))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pdf_id_has_fri_prefix_and_six_digits() {
        for _ in 0..100 {
            let id = generate_pdf_id();
            assert_eq!(id.len(), 9);
            assert!(id.starts_with("FRI"));
            assert!(id[3..].bytes().all(|b| b.is_ascii_digit()));
        }
    }

    #[test]
    fn refs_are_trimmed_and_deduped() {
        let refs = vec![
            " A-2025-001".to_string(),
            "A-2025-001 ".to_string(),
            "A-2025-002".to_string(),
        ];
        assert_eq!(
            normalize_refs(&refs).unwrap(),
            vec!["A-2025-001".to_string(), "A-2025-002".to_string()]
        );
    }

    #[test]
    fn blank_ref_is_rejected() {
        let refs = vec!["A-2025-001".to_string(), "   ".to_string()];
        assert!(matches!(
            normalize_refs(&refs),
            Err(ForwardingError::BlankVoucherRef)
        ));

        assert!(matches!(
            normalize_refs(&[]),
            Err(ForwardingError::EmptyRequest)
        ));
    }

    #[test]
    fn missing_vouchers_are_named() {
        let requested = vec!["A-2025-001".to_string(), "A-2025-002".to_string()];
        let found = vec![bill_repo::VoucherFlags {
            voucher_reference_number: "A-2025-001".to_string(),
            is_approved: true,
            sent_to_admin: false,
            sent_to_tally: false,
        }];

        let err = check_missing(&requested, &found).unwrap_err();
        match err {
            ForwardingError::VouchersNotFound(missing) => {
                assert_eq!(missing, vec!["A-2025-002".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
