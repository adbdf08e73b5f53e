//! Repository for cancellation OTP records
//!
//! OTPs self-expire via their stored `expires_at` and are single-use via
//! `is_used`; there is no background sweeper, expiry is checked at
//! verification time.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, Postgres, Transaction};
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during OTP repository operations
#[derive(Debug, Error)]
pub enum OtpError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// A persisted OTP record
#[derive(Debug, Clone, FromRow)]
pub struct OtpRecord {
    pub id: Uuid,
    pub voucher_reference_number: String,
    pub otp_code: String,
    pub is_used: bool,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Insert a fresh OTP for a voucher
pub async fn insert_tx(
    tx: &mut Transaction<'_, Postgres>,
    voucher_ref: &str,
    otp_code: &str,
    expires_at: DateTime<Utc>,
) -> Result<Uuid, OtpError> {
    let id = Uuid::new_v4();

    sqlx::query(
        r#"
        INSERT INTO otp_verifications (id, voucher_reference_number, otp_code, expires_at)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(id)
    .bind(voucher_ref)
    .bind(otp_code)
    .bind(expires_at)
    .execute(&mut **tx)
    .await?;

    Ok(id)
}

/// Find the latest unused, unexpired OTP matching a voucher and code
pub async fn find_valid_tx(
    tx: &mut Transaction<'_, Postgres>,
    voucher_ref: &str,
    otp_code: &str,
) -> Result<Option<OtpRecord>, OtpError> {
    let record = sqlx::query_as::<_, OtpRecord>(
        r#"
        SELECT id, voucher_reference_number, otp_code, is_used, expires_at, created_at
        FROM otp_verifications
        WHERE voucher_reference_number = $1
          AND otp_code = $2
          AND is_used = FALSE
          AND expires_at > NOW()
        ORDER BY created_at DESC
        LIMIT 1
        "#,
    )
    .bind(voucher_ref)
    .bind(otp_code)
    .fetch_optional(&mut **tx)
    .await?;

    Ok(record)
}

/// Consume an OTP so it can never be replayed
///
/// The `is_used = FALSE` condition makes consumption first-writer-wins: a
/// concurrent transaction that already consumed the row affects nothing
/// here and gets `false` back.
///
/// # Returns
/// Whether this call consumed the OTP
pub async fn mark_used_tx(
    tx: &mut Transaction<'_, Postgres>,
    otp_id: Uuid,
) -> Result<bool, OtpError> {
    let result =
        sqlx::query("UPDATE otp_verifications SET is_used = TRUE WHERE id = $1 AND is_used = FALSE")
            .bind(otp_id)
            .execute(&mut **tx)
            .await?;

    Ok(result.rows_affected() == 1)
}
