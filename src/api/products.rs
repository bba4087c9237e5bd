use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use utoipa::IntoParams;

use crate::api::error::ApiResult;
use crate::domain::{DomainError, ProductFilter};
use crate::infrastructure::AppState;
use crate::infrastructure::auth::Claims;
use crate::models::Product;
use crate::services::activity_service::try_log_activity;

#[derive(Debug, Deserialize, IntoParams)]
pub struct ProductQuery {
    pub category: Option<String>,
    pub risk_level: Option<String>,
    pub search: Option<String>,
    /// `return_desc`, `return_asc`, `min_investment_asc` or name (default)
    pub sort: Option<String>,
    /// 1-based
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub include_inactive: Option<bool>,
}

#[utoipa::path(
    get,
    path = "/api/products",
    params(ProductQuery),
    responses(
        (status = 200, description = "List of investment products")
    )
)]
pub async fn list_products(
    State(state): State<AppState>,
    claims: Option<Claims>,
    Query(params): Query<ProductQuery>,
) -> ApiResult<impl IntoResponse> {
    let is_admin = claims.as_ref().is_some_and(Claims::is_admin);

    let filter = ProductFilter {
        category: params.category,
        risk_level: params.risk_level,
        search: params.search,
        sort: params.sort,
        include_inactive: is_admin && params.include_inactive.unwrap_or(false),
        page: params.page.map(|p| p.saturating_sub(1)),
        limit: params.limit.map(|l| l.clamp(1, 100)),
    };

    let result = state.product_repo.find_all(filter).await?;
    Ok(Json(json!({
        "products": result.products,
        "total": result.total
    })))
}

#[utoipa::path(
    get,
    path = "/api/products/{id}",
    params(("id" = i32, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product details", body = Product),
        (status = 404, description = "Product not found")
    )
)]
pub async fn get_product(
    State(state): State<AppState>,
    claims: Option<Claims>,
    Path(id): Path<i32>,
) -> ApiResult<impl IntoResponse> {
    let is_admin = claims.as_ref().is_some_and(Claims::is_admin);

    let product = state
        .product_repo
        .find_by_id(id)
        .await?
        .filter(|p| is_admin || p.is_active.unwrap_or(false))
        .ok_or_else(|| DomainError::not_found("Product"))?;

    Ok(Json(json!({ "product": product })))
}

#[utoipa::path(
    post,
    path = "/api/products",
    request_body = Product,
    responses(
        (status = 201, description = "Product created", body = Product),
        (status = 400, description = "Invalid product"),
        (status = 403, description = "Admin access required")
    )
)]
pub async fn create_product(
    State(state): State<AppState>,
    claims: Claims,
    Json(product): Json<Product>,
) -> ApiResult<impl IntoResponse> {
    claims.require_admin()?;
    product.validate()?;

    let created = state.product_repo.create(product).await?;
    try_log_activity(
        state.db(),
        Some(claims.user_id()?),
        "product_created",
        Some(json!({ "product_id": created.id, "name": created.name })),
    )
    .await;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Product created successfully",
            "product": created
        })),
    ))
}

#[utoipa::path(
    put,
    path = "/api/products/{id}",
    params(("id" = i32, Path, description = "Product ID")),
    request_body = Product,
    responses(
        (status = 200, description = "Product updated", body = Product),
        (status = 404, description = "Product not found")
    )
)]
pub async fn update_product(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<i32>,
    Json(product): Json<Product>,
) -> ApiResult<impl IntoResponse> {
    claims.require_admin()?;
    product.validate()?;

    let updated = state.product_repo.update(id, product).await?;
    try_log_activity(
        state.db(),
        Some(claims.user_id()?),
        "product_updated",
        Some(json!({ "product_id": id })),
    )
    .await;

    Ok(Json(json!({
        "message": "Product updated successfully",
        "product": updated
    })))
}

#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    params(("id" = i32, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product deactivated"),
        (status = 404, description = "Product not found")
    )
)]
pub async fn delete_product(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<i32>,
) -> ApiResult<impl IntoResponse> {
    claims.require_admin()?;

    state.product_repo.deactivate(id).await?;
    try_log_activity(
        state.db(),
        Some(claims.user_id()?),
        "product_deactivated",
        Some(json!({ "product_id": id })),
    )
    .await;

    Ok(Json(json!({ "message": "Product deactivated" })))
}
