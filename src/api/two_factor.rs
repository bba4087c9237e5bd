use axum::{
    extract::{Json, State},
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use utoipa::ToSchema;

use crate::api::error::ApiResult;
use crate::domain::DomainError;
use crate::infrastructure::AppState;
use crate::infrastructure::auth::Claims;
use crate::services::auth_service::{self, METHOD_EMAIL, TotpSetup};

#[derive(Deserialize, ToSchema)]
pub struct EnableRequest {
    pub method: String,
}

#[derive(Deserialize, ToSchema)]
pub struct VerifyRequest {
    pub code: String,
}

#[derive(Deserialize, ToSchema)]
pub struct DisableRequest {
    pub password: String,
}

#[utoipa::path(
    post,
    path = "/api/auth/2fa/enable",
    request_body = EnableRequest,
    responses(
        (status = 200, description = "Email two-factor enabled"),
        (status = 400, description = "Unsupported method or already enabled")
    )
)]
pub async fn enable(
    State(state): State<AppState>,
    claims: Claims,
    Json(req): Json<EnableRequest>,
) -> ApiResult<impl IntoResponse> {
    if req.method != METHOD_EMAIL {
        return Err(DomainError::validation(
            "Only the 'email' method can be enabled directly; use /auth/2fa/setup for an authenticator app",
        )
        .into());
    }

    let user = auth_service::enable_email_2fa(state.db(), claims.user_id()?).await?;
    Ok(Json(json!({
        "message": "Two-factor authentication enabled",
        "user": user
    })))
}

#[utoipa::path(
    post,
    path = "/api/auth/2fa/setup",
    responses(
        (status = 200, description = "New authenticator secret", body = TotpSetup),
        (status = 400, description = "Two-factor already enabled")
    )
)]
pub async fn setup(State(state): State<AppState>, claims: Claims) -> ApiResult<impl IntoResponse> {
    let setup = auth_service::setup_totp(state.db(), claims.user_id()?).await?;
    Ok(Json(setup))
}

#[utoipa::path(
    post,
    path = "/api/auth/2fa/verify",
    request_body = VerifyRequest,
    responses(
        (status = 200, description = "Authenticator app enabled"),
        (status = 400, description = "Invalid code")
    )
)]
pub async fn verify(
    State(state): State<AppState>,
    claims: Claims,
    Json(req): Json<VerifyRequest>,
) -> ApiResult<impl IntoResponse> {
    let user = auth_service::confirm_totp(state.db(), claims.user_id()?, &req.code).await?;
    Ok(Json(json!({
        "message": "Authenticator app enabled",
        "user": user
    })))
}

#[utoipa::path(
    post,
    path = "/api/auth/2fa/disable",
    request_body = DisableRequest,
    responses(
        (status = 200, description = "Two-factor disabled"),
        (status = 401, description = "Password is incorrect")
    )
)]
pub async fn disable(
    State(state): State<AppState>,
    claims: Claims,
    Json(req): Json<DisableRequest>,
) -> ApiResult<impl IntoResponse> {
    let user = auth_service::disable_2fa(state.db(), claims.user_id()?, &req.password).await?;
    Ok(Json(json!({
        "message": "Two-factor authentication disabled",
        "user": user
    })))
}
