use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use utoipa::IntoParams;

use crate::api::error::ApiResult;
use crate::infrastructure::AppState;
use crate::infrastructure::auth::Claims;
use crate::models::investment::CreateInvestmentDto;
use crate::services::investment_service;

#[derive(Debug, Deserialize, IntoParams)]
pub struct InvestmentQuery {
    /// `active`, `matured` or `cancelled`
    pub status: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/investments",
    request_body = CreateInvestmentDto,
    responses(
        (status = 201, description = "Investment created"),
        (status = 400, description = "Amount outside the product limits or product inactive"),
        (status = 404, description = "Product not found")
    )
)]
pub async fn create_investment(
    State(state): State<AppState>,
    claims: Claims,
    Json(dto): Json<CreateInvestmentDto>,
) -> ApiResult<impl IntoResponse> {
    let investment =
        investment_service::create_investment(state.db(), claims.user_id()?, dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Investment created successfully",
            "investment": investment
        })),
    ))
}

#[utoipa::path(
    get,
    path = "/api/investments",
    params(InvestmentQuery),
    responses((status = 200, description = "Investments of the current user, newest first"))
)]
pub async fn list_investments(
    State(state): State<AppState>,
    claims: Claims,
    Query(params): Query<InvestmentQuery>,
) -> ApiResult<impl IntoResponse> {
    let investments = investment_service::list_investments(
        state.db(),
        claims.user_id()?,
        params.status,
        state.currency(),
    )
    .await?;
    Ok(Json(json!({
        "total": investments.len(),
        "investments": investments
    })))
}

#[utoipa::path(
    get,
    path = "/api/investments/{id}",
    params(("id" = i32, Path, description = "Investment ID")),
    responses(
        (status = 200, description = "Investment with valuation"),
        (status = 404, description = "Investment not found")
    )
)]
pub async fn get_investment(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<i32>,
) -> ApiResult<impl IntoResponse> {
    let investment =
        investment_service::get_investment(state.db(), claims.user_id()?, id, state.currency())
            .await?;
    Ok(Json(json!({ "investment": investment })))
}

#[utoipa::path(
    post,
    path = "/api/investments/{id}/cancel",
    params(("id" = i32, Path, description = "Investment ID")),
    responses(
        (status = 200, description = "Investment cancelled and refunded"),
        (status = 400, description = "Investment is not active"),
        (status = 404, description = "Investment not found")
    )
)]
pub async fn cancel_investment(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<i32>,
) -> ApiResult<impl IntoResponse> {
    let investment = investment_service::cancel_investment(state.db(), claims.user_id()?, id).await?;
    Ok(Json(json!({
        "message": "Investment cancelled and refunded",
        "investment": investment
    })))
}

#[utoipa::path(
    get,
    path = "/api/investments/portfolio",
    responses((status = 200, description = "Portfolio totals and allocation"))
)]
pub async fn portfolio(State(state): State<AppState>, claims: Claims) -> ApiResult<impl IntoResponse> {
    let summary =
        investment_service::portfolio(state.db(), claims.user_id()?, state.currency()).await?;
    Ok(Json(json!({ "portfolio": summary })))
}
