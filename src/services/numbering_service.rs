//! Voucher numbering
//!
//! Derives the next sequential reference per (cost_code, year) for standard
//! vouchers and per (cost_code, year, store) for advances, in the formats
//! `{cost_code}-{year}-NNN` and `{cost_code}-ADV-{year}-NNN`. The scan
//! anchors on a full-match pattern and takes the numeric max of the trailing
//! suffix (cast, not lexical, so 10 does not sort before 2), starting at 001
//! when the scope is empty.
//!
//! Re-issued cancelled vouchers are numbered `BASE/N` against the original
//! base reference instead of opening a new year-scoped sequence.

use sqlx::{Postgres, Transaction};
use thiserror::Error;

/// Errors that can occur while deriving reference numbers
#[derive(Debug, Error)]
pub enum NumberingError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Format a reference number from its prefix and sequence (3-digit padded)
pub fn format_voucher_number(prefix: &str, seq: u32) -> String {
    format!("{prefix}-{seq:03}")
}

/// Next reference for a standard (gst / non_gst) voucher
pub async fn next_standard_number(
    tx: &mut Transaction<'_, Postgres>,
    cost_code: &str,
    year: i32,
) -> Result<String, NumberingError> {
    let prefix = format!("{cost_code}-{year}");
    let pattern = format!("^{prefix}-[0-9]+$");

    let max_seq = sqlx::query_scalar::<_, i32>(
        r#"
        SELECT COALESCE(MAX(CAST(substring(voucher_reference_number FROM '([0-9]+)$') AS INTEGER)), 0)
        FROM bills
        WHERE billtype <> 'advance'
          AND cost_code = $1
          AND voucher_reference_number ~ $2
        "#,
    )
    .bind(cost_code)
    .bind(&pattern)
    .fetch_one(&mut **tx)
    .await?;

    Ok(format_voucher_number(&prefix, max_seq as u32 + 1))
}

/// Next reference for an advance voucher (sequence is additionally per store)
pub async fn next_advance_number(
    tx: &mut Transaction<'_, Postgres>,
    cost_code: &str,
    year: i32,
    store_id: uuid::Uuid,
) -> Result<String, NumberingError> {
    let prefix = format!("{cost_code}-ADV-{year}");
    let pattern = format!("^{prefix}-[0-9]+$");

    let max_seq = sqlx::query_scalar::<_, i32>(
        r#"
        SELECT COALESCE(MAX(CAST(substring(voucher_reference_number FROM '([0-9]+)$') AS INTEGER)), 0)
        FROM bills
        WHERE billtype = 'advance'
          AND cost_code = $1
          AND store_id = $2
          AND voucher_reference_number ~ $3
        "#,
    )
    .bind(cost_code)
    .bind(store_id)
    .bind(&pattern)
    .fetch_one(&mut **tx)
    .await?;

    Ok(format_voucher_number(&prefix, max_seq as u32 + 1))
}

/// Base reference of a possibly re-issued voucher (everything before the
/// first '/')
pub fn reissue_base(voucher_ref: &str) -> &str {
    voucher_ref.split('/').next().unwrap_or(voucher_ref)
}

/// Highest existing `/N` suffix among a lineage, plus one
///
/// References without a numeric `/N` suffix (the original base itself)
/// count as 0, so the first re-issue is always `/1`.
pub fn next_reissue_suffix(existing: &[String]) -> u32 {
    existing
        .iter()
        .map(|r| {
            r.rsplit_once('/')
                .and_then(|(_, s)| s.parse::<u32>().ok())
                .unwrap_or(0)
        })
        .max()
        .unwrap_or(0)
        + 1
}

/// Next `BASE/N` reference for re-issuing a cancelled voucher
pub async fn next_reissue_number(
    tx: &mut Transaction<'_, Postgres>,
    voucher_ref: &str,
) -> Result<String, NumberingError> {
    let base = reissue_base(voucher_ref);

    let lineage = sqlx::query_scalar::<_, String>(
        r#"
        SELECT voucher_reference_number
        FROM bills
        WHERE voucher_reference_number LIKE $1
        "#,
    )
    .bind(format!("{base}%"))
    .fetch_all(&mut **tx)
    .await?;

    Ok(format!("{base}/{}", next_reissue_suffix(&lineage)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_with_three_digit_padding() {
        assert_eq!(format_voucher_number("C1-2025", 1), "C1-2025-001");
        assert_eq!(format_voucher_number("C1-2025", 42), "C1-2025-042");
        assert_eq!(format_voucher_number("C1-ADV-2025", 100), "C1-ADV-2025-100");
        // Sequences past 999 widen rather than wrap
        assert_eq!(format_voucher_number("C1-2025", 1000), "C1-2025-1000");
    }

    #[test]
    fn reissue_base_strips_suffix() {
        assert_eq!(reissue_base("C1-2025-001"), "C1-2025-001");
        assert_eq!(reissue_base("C1-2025-001/3"), "C1-2025-001");
    }

    #[test]
    fn first_reissue_is_one() {
        let lineage = vec!["C1-2025-001".to_string()];
        assert_eq!(next_reissue_suffix(&lineage), 1);
    }

    #[test]
    fn reissue_increments_highest_suffix() {
        let lineage = vec![
            "C1-2025-001".to_string(),
            "C1-2025-001/1".to_string(),
            "C1-2025-001/2".to_string(),
        ];
        assert_eq!(next_reissue_suffix(&lineage), 3);
    }

    #[test]
    fn reissue_suffix_is_numeric_not_lexical() {
        let lineage = vec![
            "C1-2025-001/9".to_string(),
            "C1-2025-001/10".to_string(),
        ];
        assert_eq!(next_reissue_suffix(&lineage), 11);
    }

    #[test]
    fn reissue_on_empty_lineage_starts_at_one() {
        assert_eq!(next_reissue_suffix(&[]), 1);
    }
}
