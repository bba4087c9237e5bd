use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use utoipa::ToSchema;

use crate::api::error::ApiResult;
use crate::domain::DomainError;
use crate::infrastructure::AppState;
use crate::infrastructure::auth::Claims;
use crate::models::user::UserDto;
use crate::services::OtpPurpose;
use crate::services::auth_service::{self, LoginOutcome, RegisterInput};

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize, ToSchema)]
pub struct OtpRequest {
    pub email: String,
    pub otp: String,
}

/// Second step of a two-factor login
#[derive(Deserialize, ToSchema)]
pub struct LoginOtpRequest {
    /// Returned by `/auth/login` as `otp_token`
    pub otp_token: Option<String>,
    pub otp: String,
}

#[derive(Deserialize, ToSchema)]
pub struct ResendOtpRequest {
    pub email: String,
    pub purpose: OtpPurpose,
}

#[derive(Deserialize, ToSchema)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Deserialize, ToSchema)]
pub struct ResetPasswordRequest {
    pub email: String,
    pub otp: String,
    pub new_password: String,
}

#[derive(Deserialize, ToSchema)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterInput,
    responses(
        (status = 201, description = "Account created, verification code sent"),
        (status = 400, description = "Invalid email, password or name"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterInput>,
) -> ApiResult<impl IntoResponse> {
    let user = auth_service::register(state.auth_context(), input).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Registration successful. Check your email for the verification code.",
            "user": user
        })),
    ))
}

#[utoipa::path(
    post,
    path = "/api/auth/verify-email",
    request_body = OtpRequest,
    responses(
        (status = 200, description = "Email verified, session issued"),
        (status = 400, description = "Invalid or expired code")
    )
)]
pub async fn verify_email(
    State(state): State<AppState>,
    Json(req): Json<OtpRequest>,
) -> ApiResult<impl IntoResponse> {
    let session = auth_service::verify_email(state.auth_context(), &req.email, &req.otp).await?;
    Ok(Json(session))
}

#[utoipa::path(
    post,
    path = "/api/auth/resend-otp",
    request_body = ResendOtpRequest,
    responses(
        (status = 200, description = "New code sent"),
        (status = 400, description = "Code not applicable for this account"),
        (status = 404, description = "Unknown email"),
        (status = 429, description = "Resend cooldown active")
    )
)]
pub async fn resend_otp(
    State(state): State<AppState>,
    Json(req): Json<ResendOtpRequest>,
) -> ApiResult<impl IntoResponse> {
    auth_service::resend_otp(state.auth_context(), &req.email, req.purpose).await?;
    Ok(Json(json!({ "message": "A new code has been sent" })))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session issued, or `requires_otp` with an `otp_token`"),
        (status = 401, description = "Invalid email or password"),
        (status = 403, description = "Email not verified")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let outcome = auth_service::login(state.auth_context(), &req.email, &req.password).await?;

    let response = match outcome {
        LoginOutcome::Authenticated(session) => (StatusCode::OK, Json(json!(session))),
        LoginOutcome::OtpRequired { method, otp_token } => (
            StatusCode::OK,
            Json(json!({
                "requires_otp": true,
                "method": method,
                "otp_token": otp_token
            })),
        ),
        LoginOutcome::VerificationRequired => (
            StatusCode::FORBIDDEN,
            Json(json!({
                "error": "Email address is not verified",
                "requires_verification": true
            })),
        ),
    };
    Ok(response)
}

#[utoipa::path(
    post,
    path = "/api/auth/login/verify-otp",
    request_body = LoginOtpRequest,
    responses(
        (status = 200, description = "Session issued"),
        (status = 400, description = "Wrong code"),
        (status = 401, description = "Missing or expired login token"),
        (status = 429, description = "Too many failed attempts")
    )
)]
pub async fn verify_login_otp(
    State(state): State<AppState>,
    Json(req): Json<LoginOtpRequest>,
) -> ApiResult<impl IntoResponse> {
    let otp_token = req.otp_token.ok_or_else(|| {
        DomainError::Unauthorized("Sign in with your password first".to_string())
    })?;
    let session =
        auth_service::verify_login_otp(state.auth_context(), &otp_token, &req.otp).await?;
    Ok(Json(session))
}

#[utoipa::path(
    post,
    path = "/api/auth/forgot-password",
    request_body = ForgotPasswordRequest,
    responses((status = 200, description = "Reset code sent when the account exists"))
)]
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(req): Json<ForgotPasswordRequest>,
) -> ApiResult<impl IntoResponse> {
    auth_service::forgot_password(state.auth_context(), &req.email).await?;
    Ok(Json(json!({
        "message": "If an account exists for this email, a reset code has been sent"
    })))
}

#[utoipa::path(
    post,
    path = "/api/auth/reset-password",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password reset"),
        (status = 400, description = "Weak password or invalid code")
    )
)]
pub async fn reset_password(
    State(state): State<AppState>,
    Json(req): Json<ResetPasswordRequest>,
) -> ApiResult<impl IntoResponse> {
    auth_service::reset_password(
        state.auth_context(),
        &req.email,
        &req.otp,
        &req.new_password,
    )
    .await?;
    Ok(Json(json!({ "message": "Password has been reset" })))
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current user", body = UserDto),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn get_me(State(state): State<AppState>, claims: Claims) -> ApiResult<impl IntoResponse> {
    let user = auth_service::find_user(state.db(), claims.user_id()?).await?;
    Ok(Json(json!({ "user": UserDto::from(user) })))
}

#[utoipa::path(
    post,
    path = "/api/auth/change-password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed"),
        (status = 401, description = "Current password is incorrect")
    )
)]
pub async fn change_password(
    State(state): State<AppState>,
    claims: Claims,
    Json(req): Json<ChangePasswordRequest>,
) -> ApiResult<impl IntoResponse> {
    auth_service::change_password(
        state.db(),
        claims.user_id()?,
        &req.current_password,
        &req.new_password,
    )
    .await?;
    Ok(Json(json!({ "message": "Password changed" })))
}
