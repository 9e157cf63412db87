//! One-time passcodes for email verification and password reset

use chrono::{Duration, Utc};
use rand::Rng;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::common::{generate_otp_id, now_timestamp, safe_email_log};

/// How long a code stays valid after issuance
pub const OTP_TTL_MINUTES: i64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpPurpose {
    Signup,
    PasswordReset,
}

impl OtpPurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            OtpPurpose::Signup => "signup",
            OtpPurpose::PasswordReset => "password-reset",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "signup" => Some(OtpPurpose::Signup),
            "password-reset" => Some(OtpPurpose::PasswordReset),
            _ => None,
        }
    }
}

/// Issues and consumes OTPs. At most one live code exists per (email, purpose).
#[derive(Clone)]
pub struct OtpService {
    db: SqlitePool,
}

impl OtpService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Replaces any earlier codes for the pair and returns the new one.
    pub async fn create(&self, email: &str, purpose: OtpPurpose) -> Result<String, sqlx::Error> {
        let code = rand::thread_rng().gen_range(100_000..=999_999).to_string();
        let expires_at = (Utc::now() + Duration::minutes(OTP_TTL_MINUTES)).timestamp();

        let mut tx = self.db.begin().await?;

        sqlx::query("DELETE FROM otps WHERE email = ? AND purpose = ?")
            .bind(email)
            .bind(purpose.as_str())
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT INTO otps (id, email, code, purpose, expires_at, consumed, created_at)
             VALUES (?, ?, ?, ?, ?, 0, ?)",
        )
        .bind(generate_otp_id())
        .bind(email)
        .bind(&code)
        .bind(purpose.as_str())
        .bind(expires_at)
        .bind(now_timestamp())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(
            email = %safe_email_log(email),
            purpose = purpose.as_str(),
            "Issued OTP"
        );
        Ok(code)
    }

    /// Consumes a matching live code. Returns false for wrong, expired or used codes.
    pub async fn verify(
        &self,
        email: &str,
        code: &str,
        purpose: OtpPurpose,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE otps SET consumed = 1
             WHERE email = ? AND code = ? AND purpose = ? AND consumed = 0 AND expires_at > ?",
        )
        .bind(email)
        .bind(code.trim())
        .bind(purpose.as_str())
        .bind(Utc::now().timestamp())
        .execute(&self.db)
        .await?;

        let consumed = result.rows_affected() == 1;
        debug!(
            email = %safe_email_log(email),
            purpose = purpose.as_str(),
            consumed,
            "OTP verification attempt"
        );
        Ok(consumed)
    }
}
