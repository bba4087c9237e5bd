//! Auth Service - registration, login, OTP flows and two-factor settings

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use serde_json::json;
use totp_rs::{Algorithm, Secret, TOTP};
use utoipa::ToSchema;

use crate::domain::DomainError;
use crate::infrastructure::auth::{
    create_jwt, create_pending_token, decode_pending_token, hash_password, verify_password,
};
use crate::infrastructure::config::{JwtSettings, OtpSettings};
use crate::models::user::{self, Entity as User, UserDto};
use crate::services::activity_service::try_log_activity;
use crate::services::mailer::OtpMailer;
use crate::services::otp_service::{self, OtpPurpose};
use crate::utils::validation::{normalize_email, validate_email, validate_name, validate_password};

pub const TOTP_ISSUER: &str = "InvestHub";
pub const METHOD_EMAIL: &str = "email";
pub const METHOD_TOTP: &str = "totp";

const BAD_CREDENTIALS: &str = "Invalid email or password";
const LOGIN_EXPIRED: &str = "Login session expired, please sign in again";

/// Everything the auth flows need besides the request itself
#[derive(Clone, Copy)]
pub struct AuthContext<'a> {
    pub db: &'a DatabaseConnection,
    pub otp: &'a OtpSettings,
    pub jwt: &'a JwtSettings,
    pub mailer: &'a dyn OtpMailer,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RegisterInput {
    pub email: String,
    pub password: String,
    pub full_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthSession {
    pub token: String,
    pub user: UserDto,
}

#[derive(Debug)]
pub enum LoginOutcome {
    Authenticated(AuthSession),
    /// Password was right, a second factor is still needed.
    /// `otp_token` must accompany the code on the second step.
    OtpRequired { method: String, otp_token: String },
    VerificationRequired,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TotpSetup {
    pub secret: String,
    pub otpauth_url: String,
    /// Base64 encoded PNG
    pub qr_code: String,
}

fn internal(e: impl std::fmt::Display) -> DomainError {
    DomainError::Internal(e.to_string())
}

fn issue_session(jwt: &JwtSettings, user: user::Model) -> Result<AuthSession, DomainError> {
    let token = create_jwt(jwt, user.id, &user.email, &user.role).map_err(internal)?;
    Ok(AuthSession {
        token,
        user: user.into(),
    })
}

async fn find_by_email(
    db: &DatabaseConnection,
    email: &str,
) -> Result<Option<user::Model>, DomainError> {
    Ok(User::find()
        .filter(user::Column::Email.eq(normalize_email(email)))
        .one(db)
        .await?)
}

pub async fn find_user(db: &DatabaseConnection, user_id: i32) -> Result<user::Model, DomainError> {
    User::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or_else(|| DomainError::not_found("User"))
}

async fn send_code(
    ctx: AuthContext<'_>,
    user: &user::Model,
    purpose: OtpPurpose,
) -> Result<(), DomainError> {
    let code = otp_service::issue(ctx.db, user.id, purpose, ctx.otp).await?;
    ctx.mailer.send_otp(&user.email, purpose, &code).await?;
    try_log_activity(
        ctx.db,
        Some(user.id),
        "otp_sent",
        Some(json!({ "purpose": purpose.as_str() })),
    )
    .await;
    Ok(())
}

pub fn build_totp(secret: &str, account: &str) -> Result<TOTP, DomainError> {
    let bytes = Secret::Encoded(secret.to_owned())
        .to_bytes()
        .map_err(|e| internal(format!("Invalid TOTP secret: {:?}", e)))?;
    TOTP::new(
        Algorithm::SHA1,
        6,
        1,
        30,
        bytes,
        Some(TOTP_ISSUER.to_string()),
        account.to_owned(),
    )
    .map_err(internal)
}

fn check_totp(user: &user::Model, code: &str) -> Result<(), DomainError> {
    let secret = user
        .totp_secret
        .as_deref()
        .ok_or_else(|| DomainError::InvalidState("Authenticator app is not set up".to_string()))?;
    let totp = build_totp(secret, &user.email)?;
    if totp.check_current(code.trim()).map_err(internal)? {
        Ok(())
    } else {
        Err(DomainError::validation("Invalid authenticator code"))
    }
}

pub async fn register(
    ctx: AuthContext<'_>,
    input: RegisterInput,
) -> Result<UserDto, DomainError> {
    let email = normalize_email(&input.email);
    validate_email(&email)?;
    validate_password(&input.password)?;
    validate_name(&input.full_name)?;

    if find_by_email(ctx.db, &email).await?.is_some() {
        return Err(DomainError::Conflict(
            "An account with this email already exists".to_string(),
        ));
    }

    let now = Utc::now().to_rfc3339();
    let new_user = user::ActiveModel {
        email: Set(email),
        full_name: Set(input.full_name.trim().to_owned()),
        password_hash: Set(hash_password(&input.password).map_err(internal)?),
        role: Set("user".to_owned()),
        is_verified: Set(false),
        two_factor_enabled: Set(false),
        two_factor_method: Set(None),
        totp_secret: Set(None),
        totp_failed_attempts: Set(0),
        last_login_at: Set(None),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };
    // A concurrent registration can still win the unique index
    let saved = new_user.insert(ctx.db).await.map_err(|e| match DomainError::from(e) {
        DomainError::Conflict(_) => {
            DomainError::Conflict("An account with this email already exists".to_string())
        }
        other => other,
    })?;

    try_log_activity(ctx.db, Some(saved.id), "register", None).await;
    send_code(ctx, &saved, OtpPurpose::EmailVerification).await?;

    tracing::info!("Registered user {} ({})", saved.id, saved.email);
    Ok(saved.into())
}

pub async fn verify_email(
    ctx: AuthContext<'_>,
    email: &str,
    otp: &str,
) -> Result<AuthSession, DomainError> {
    let user = find_by_email(ctx.db, email)
        .await?
        .ok_or_else(|| DomainError::not_found("User"))?;

    if user.is_verified {
        return Err(DomainError::InvalidState(
            "Email is already verified".to_string(),
        ));
    }

    otp_service::verify(ctx.db, user.id, OtpPurpose::EmailVerification, otp, ctx.otp).await?;

    let now = Utc::now().to_rfc3339();
    let mut active: user::ActiveModel = user.into();
    active.is_verified = Set(true);
    active.last_login_at = Set(Some(now.clone()));
    active.updated_at = Set(now);
    let updated = active.update(ctx.db).await?;

    try_log_activity(ctx.db, Some(updated.id), "email_verified", None).await;
    issue_session(ctx.jwt, updated)
}

pub async fn resend_otp(
    ctx: AuthContext<'_>,
    email: &str,
    purpose: OtpPurpose,
) -> Result<(), DomainError> {
    let user = find_by_email(ctx.db, email)
        .await?
        .ok_or_else(|| DomainError::not_found("User"))?;

    match purpose {
        OtpPurpose::EmailVerification if user.is_verified => {
            return Err(DomainError::InvalidState(
                "Email is already verified".to_string(),
            ));
        }
        OtpPurpose::Login => {
            return Err(DomainError::validation(
                "Sign in with your password to receive a new login code",
            ));
        }
        OtpPurpose::PasswordReset => {
            return Err(DomainError::validation(
                "Use forgot-password to request a reset code",
            ));
        }
        _ => {}
    }

    send_code(ctx, &user, purpose).await
}

pub async fn login(
    ctx: AuthContext<'_>,
    email: &str,
    password: &str,
) -> Result<LoginOutcome, DomainError> {
    let Some(user) = find_by_email(ctx.db, email).await? else {
        tracing::warn!("Login attempt for unknown email");
        try_log_activity(ctx.db, None, "login_failed", None).await;
        return Err(DomainError::Unauthorized(BAD_CREDENTIALS.to_string()));
    };

    if !verify_password(password, &user.password_hash).map_err(internal)? {
        try_log_activity(ctx.db, Some(user.id), "login_failed", None).await;
        return Err(DomainError::Unauthorized(BAD_CREDENTIALS.to_string()));
    }

    if !user.is_verified {
        return Ok(LoginOutcome::VerificationRequired);
    }

    if user.two_factor_enabled {
        let method = user
            .two_factor_method
            .clone()
            .unwrap_or_else(|| METHOD_EMAIL.to_string());
        if method == METHOD_EMAIL {
            send_code(ctx, &user, OtpPurpose::Login).await?;
        } else if user.totp_failed_attempts > 0 {
            // Each password step opens a fresh window of authenticator attempts
            set_totp_failures(ctx.db, user.id, Expr::value(0)).await?;
        }
        let otp_token =
            create_pending_token(ctx.jwt, user.id, ctx.otp.ttl_minutes).map_err(internal)?;
        return Ok(LoginOutcome::OtpRequired { method, otp_token });
    }

    complete_login(ctx, user, None).await.map(LoginOutcome::Authenticated)
}

async fn complete_login(
    ctx: AuthContext<'_>,
    user: user::Model,
    method: Option<&str>,
) -> Result<AuthSession, DomainError> {
    let now = Utc::now().to_rfc3339();
    let mut active: user::ActiveModel = user.into();
    active.last_login_at = Set(Some(now.clone()));
    active.totp_failed_attempts = Set(0);
    active.updated_at = Set(now);
    let updated = active.update(ctx.db).await?;

    try_log_activity(
        ctx.db,
        Some(updated.id),
        "login",
        method.map(|m| json!({ "two_factor": m })),
    )
    .await;
    issue_session(ctx.jwt, updated)
}

async fn set_totp_failures(
    db: &DatabaseConnection,
    user_id: i32,
    value: sea_orm::sea_query::SimpleExpr,
) -> Result<(), DomainError> {
    User::update_many()
        .col_expr(user::Column::TotpFailedAttempts, value)
        .filter(user::Column::Id.eq(user_id))
        .exec(db)
        .await?;
    Ok(())
}

/// Second step of a two-factor login. `otp_token` comes from the password step.
pub async fn verify_login_otp(
    ctx: AuthContext<'_>,
    otp_token: &str,
    code: &str,
) -> Result<AuthSession, DomainError> {
    let user_id = decode_pending_token(ctx.jwt, otp_token).map_err(|e| {
        tracing::debug!("Rejected pending login token: {}", e);
        DomainError::Unauthorized(LOGIN_EXPIRED.to_string())
    })?;
    let user = User::find_by_id(user_id)
        .one(ctx.db)
        .await?
        .ok_or_else(|| DomainError::Unauthorized(LOGIN_EXPIRED.to_string()))?;

    if !user.two_factor_enabled {
        return Err(DomainError::InvalidState(
            "Two-factor authentication is not enabled".to_string(),
        ));
    }

    match user.two_factor_method.as_deref() {
        Some(METHOD_TOTP) => {
            if user.totp_failed_attempts >= ctx.otp.max_attempts {
                return Err(DomainError::TooManyRequests(
                    "Too many failed attempts, please sign in again".to_string(),
                ));
            }
            if let Err(e) = check_totp(&user, code) {
                set_totp_failures(
                    ctx.db,
                    user.id,
                    Expr::col(user::Column::TotpFailedAttempts).add(1),
                )
                .await?;
                try_log_activity(ctx.db, Some(user.id), "login_failed", None).await;
                tracing::warn!("Wrong authenticator code for user {}", user.id);
                return Err(e);
            }
            complete_login(ctx, user, Some(METHOD_TOTP)).await
        }
        _ => {
            otp_service::verify(ctx.db, user.id, OtpPurpose::Login, code, ctx.otp).await?;
            complete_login(ctx, user, Some(METHOD_EMAIL)).await
        }
    }
}

/// Never reveals whether the email exists
pub async fn forgot_password(ctx: AuthContext<'_>, email: &str) -> Result<(), DomainError> {
    let Some(user) = find_by_email(ctx.db, email).await? else {
        tracing::debug!("Password reset requested for unknown email");
        return Ok(());
    };

    match send_code(ctx, &user, OtpPurpose::PasswordReset).await {
        Ok(()) => Ok(()),
        Err(DomainError::TooManyRequests(msg)) => {
            tracing::debug!("Password reset for user {} throttled: {}", user.id, msg);
            Ok(())
        }
        Err(e) => Err(e),
    }
}

pub async fn reset_password(
    ctx: AuthContext<'_>,
    email: &str,
    otp: &str,
    new_password: &str,
) -> Result<(), DomainError> {
    validate_password(new_password)?;

    let user = find_by_email(ctx.db, email)
        .await?
        .ok_or_else(|| DomainError::validation("Invalid or expired code"))?;

    otp_service::verify(ctx.db, user.id, OtpPurpose::PasswordReset, otp, ctx.otp).await?;

    let user_id = user.id;
    let mut active: user::ActiveModel = user.into();
    active.password_hash = Set(hash_password(new_password).map_err(internal)?);
    active.updated_at = Set(Utc::now().to_rfc3339());
    active.update(ctx.db).await?;

    try_log_activity(ctx.db, Some(user_id), "password_reset", None).await;
    tracing::info!("Password reset for user {}", user_id);
    Ok(())
}

pub async fn change_password(
    db: &DatabaseConnection,
    user_id: i32,
    current_password: &str,
    new_password: &str,
) -> Result<(), DomainError> {
    let user = find_user(db, user_id).await?;

    if !verify_password(current_password, &user.password_hash).map_err(internal)? {
        return Err(DomainError::Unauthorized(
            "Current password is incorrect".to_string(),
        ));
    }
    validate_password(new_password)?;
    if current_password == new_password {
        return Err(DomainError::validation(
            "New password must differ from the current one",
        ));
    }

    let mut active: user::ActiveModel = user.into();
    active.password_hash = Set(hash_password(new_password).map_err(internal)?);
    active.updated_at = Set(Utc::now().to_rfc3339());
    active.update(db).await?;

    try_log_activity(db, Some(user_id), "password_changed", None).await;
    Ok(())
}

pub async fn enable_email_2fa(db: &DatabaseConnection, user_id: i32) -> Result<UserDto, DomainError> {
    let user = find_user(db, user_id).await?;
    if user.two_factor_enabled {
        return Err(DomainError::InvalidState(
            "Two-factor authentication is already enabled".to_string(),
        ));
    }

    let mut active: user::ActiveModel = user.into();
    active.two_factor_enabled = Set(true);
    active.two_factor_method = Set(Some(METHOD_EMAIL.to_owned()));
    active.totp_secret = Set(None);
    active.updated_at = Set(Utc::now().to_rfc3339());
    let updated = active.update(db).await?;

    try_log_activity(
        db,
        Some(user_id),
        "two_factor_enabled",
        Some(json!({ "method": METHOD_EMAIL })),
    )
    .await;
    Ok(updated.into())
}

/// Store a fresh secret. 2FA stays off until `confirm_totp` succeeds.
pub async fn setup_totp(db: &DatabaseConnection, user_id: i32) -> Result<TotpSetup, DomainError> {
    let user = find_user(db, user_id).await?;
    if user.two_factor_enabled {
        return Err(DomainError::InvalidState(
            "Disable two-factor authentication before setting up a new authenticator".to_string(),
        ));
    }

    let secret = Secret::generate_secret().to_encoded().to_string();
    let totp = build_totp(&secret, &user.email)?;
    let otpauth_url = totp.get_url();
    let qr_code = totp.get_qr_base64().map_err(internal)?;

    let mut active: user::ActiveModel = user.into();
    active.totp_secret = Set(Some(secret.clone()));
    active.updated_at = Set(Utc::now().to_rfc3339());
    active.update(db).await?;

    Ok(TotpSetup {
        secret,
        otpauth_url,
        qr_code,
    })
}

pub async fn confirm_totp(
    db: &DatabaseConnection,
    user_id: i32,
    code: &str,
) -> Result<UserDto, DomainError> {
    let user = find_user(db, user_id).await?;
    if user.two_factor_enabled {
        return Err(DomainError::InvalidState(
            "Two-factor authentication is already enabled".to_string(),
        ));
    }
    check_totp(&user, code)?;

    let mut active: user::ActiveModel = user.into();
    active.two_factor_enabled = Set(true);
    active.two_factor_method = Set(Some(METHOD_TOTP.to_owned()));
    active.updated_at = Set(Utc::now().to_rfc3339());
    let updated = active.update(db).await?;

    try_log_activity(
        db,
        Some(user_id),
        "two_factor_enabled",
        Some(json!({ "method": METHOD_TOTP })),
    )
    .await;
    Ok(updated.into())
}

pub async fn disable_2fa(
    db: &DatabaseConnection,
    user_id: i32,
    password: &str,
) -> Result<UserDto, DomainError> {
    let user = find_user(db, user_id).await?;
    if !verify_password(password, &user.password_hash).map_err(internal)? {
        return Err(DomainError::Unauthorized("Password is incorrect".to_string()));
    }
    if !user.two_factor_enabled {
        return Err(DomainError::InvalidState(
            "Two-factor authentication is not enabled".to_string(),
        ));
    }

    let mut active: user::ActiveModel = user.into();
    active.two_factor_enabled = Set(false);
    active.two_factor_method = Set(None);
    active.totp_secret = Set(None);
    active.updated_at = Set(Utc::now().to_rfc3339());
    let updated = active.update(db).await?;

    try_log_activity(db, Some(user_id), "two_factor_disabled", None).await;
    Ok(updated.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_totp_roundtrip_with_generated_secret() {
        let secret = Secret::generate_secret().to_encoded().to_string();
        let totp = build_totp(&secret, "alice@example.com").unwrap();
        let code = totp.generate_current().unwrap();
        assert_eq!(code.len(), 6);
        assert!(totp.check_current(&code).unwrap());
        assert!(totp.get_url().starts_with("otpauth://totp/InvestHub:"));
    }

    #[test]
    fn test_invalid_secret_is_rejected() {
        assert!(build_totp("not base32 !!", "bob@example.com").is_err());
    }
}
