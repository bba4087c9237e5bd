//! OTP Service - generate, store, compare and expire one-time passwords
//!
//! Only a SHA-256 digest of each code is persisted. Issuing a new code for a
//! user and purpose invalidates every earlier one, and a code can be used once.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use utoipa::ToSchema;

use crate::domain::DomainError;
use crate::infrastructure::config::OtpSettings;
use crate::models::otp_code::{self, Entity as OtpCode};

pub const CODE_LENGTH: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OtpPurpose {
    EmailVerification,
    PasswordReset,
    Login,
}

impl OtpPurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            OtpPurpose::EmailVerification => "email_verification",
            OtpPurpose::PasswordReset => "password_reset",
            OtpPurpose::Login => "login",
        }
    }
}

/// Random zero-padded numeric code
pub fn generate_code() -> String {
    let max = 10u32.pow(CODE_LENGTH as u32);
    let value = rand::thread_rng().gen_range(0..max);
    format!("{:0width$}", value, width = CODE_LENGTH)
}

pub fn hash_code(code: &str) -> String {
    hex::encode(Sha256::digest(code.trim().as_bytes()))
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, DomainError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DomainError::Internal(format!("Bad timestamp '{}': {}", value, e)))
}

/// Create a fresh code for `user_id` and return it in clear text for delivery.
pub async fn issue(
    db: &DatabaseConnection,
    user_id: i32,
    purpose: OtpPurpose,
    settings: &OtpSettings,
) -> Result<String, DomainError> {
    let now = Utc::now();

    let latest = OtpCode::find()
        .filter(otp_code::Column::UserId.eq(user_id))
        .filter(otp_code::Column::Purpose.eq(purpose.as_str()))
        .order_by_desc(otp_code::Column::Id)
        .one(db)
        .await?;

    if let Some(latest) = latest
        && settings.resend_cooldown_secs > 0
    {
        let elapsed = (now - parse_timestamp(&latest.created_at)?).num_seconds();
        if elapsed < settings.resend_cooldown_secs {
            return Err(DomainError::TooManyRequests(format!(
                "Please wait {} seconds before requesting a new code",
                settings.resend_cooldown_secs - elapsed
            )));
        }
    }

    // Drop stale rows and retire any code still outstanding for this purpose
    OtpCode::delete_many()
        .filter(otp_code::Column::UserId.eq(user_id))
        .filter(otp_code::Column::ExpiresAt.lt(now.to_rfc3339()))
        .exec(db)
        .await?;

    OtpCode::update_many()
        .col_expr(otp_code::Column::Consumed, Expr::value(true))
        .filter(otp_code::Column::UserId.eq(user_id))
        .filter(otp_code::Column::Purpose.eq(purpose.as_str()))
        .filter(otp_code::Column::Consumed.eq(false))
        .exec(db)
        .await?;

    let code = generate_code();
    let record = otp_code::ActiveModel {
        user_id: Set(user_id),
        purpose: Set(purpose.as_str().to_owned()),
        code_hash: Set(hash_code(&code)),
        attempts: Set(0),
        consumed: Set(false),
        expires_at: Set((now + Duration::minutes(settings.ttl_minutes)).to_rfc3339()),
        created_at: Set(now.to_rfc3339()),
        ..Default::default()
    };
    record.insert(db).await?;

    tracing::debug!("Issued {} OTP for user {}", purpose.as_str(), user_id);
    Ok(code)
}

/// Check `code` against the newest outstanding code. Consumes it on success.
pub async fn verify(
    db: &DatabaseConnection,
    user_id: i32,
    purpose: OtpPurpose,
    code: &str,
    settings: &OtpSettings,
) -> Result<(), DomainError> {
    let record = OtpCode::find()
        .filter(otp_code::Column::UserId.eq(user_id))
        .filter(otp_code::Column::Purpose.eq(purpose.as_str()))
        .filter(otp_code::Column::Consumed.eq(false))
        .order_by_desc(otp_code::Column::Id)
        .one(db)
        .await?
        .ok_or_else(|| DomainError::validation("Invalid or expired code"))?;

    let attempts = record.attempts;
    let expired = parse_timestamp(&record.expires_at)? <= Utc::now();
    let matches = hash_code(code) == record.code_hash;
    let mut active: otp_code::ActiveModel = record.into();

    if expired {
        active.consumed = Set(true);
        active.update(db).await?;
        return Err(DomainError::validation(
            "Code has expired, please request a new one",
        ));
    }

    if attempts >= settings.max_attempts {
        active.consumed = Set(true);
        active.update(db).await?;
        return Err(DomainError::TooManyRequests(
            "Too many failed attempts, please request a new code".to_string(),
        ));
    }

    if !matches {
        let attempts = attempts + 1;
        active.attempts = Set(attempts);
        if attempts >= settings.max_attempts {
            active.consumed = Set(true);
        }
        active.update(db).await?;
        tracing::warn!("Wrong {} OTP for user {}", purpose.as_str(), user_id);
        return Err(DomainError::validation("Invalid code"));
    }

    active.consumed = Set(true);
    active.update(db).await?;
    Ok(())
}
