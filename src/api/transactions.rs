use axum::{
    extract::{Json, Query, State},
    http::header,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use utoipa::IntoParams;

use crate::api::error::ApiResult;
use crate::api::pagination::PageParams;
use crate::infrastructure::AppState;
use crate::infrastructure::auth::Claims;
use crate::services::transaction_service::{self, TransactionFilter};

#[derive(Debug, Deserialize, IntoParams)]
pub struct TransactionQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub kind: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/transactions",
    params(TransactionQuery),
    responses((status = 200, description = "Paginated transactions, newest first"))
)]
pub async fn list_transactions(
    State(state): State<AppState>,
    claims: Claims,
    Query(params): Query<TransactionQuery>,
) -> ApiResult<impl IntoResponse> {
    let paging = PageParams {
        page: params.page,
        limit: params.limit,
    };

    let result = transaction_service::list_transactions(
        state.db(),
        TransactionFilter {
            user_id: claims.user_id()?,
            kind: params.kind,
            page: paging.page_index(),
            limit: paging.limit(),
        },
    )
    .await?;

    Ok(Json(json!({
        "transactions": transaction_service::present(result.transactions, state.currency()),
        "total": result.total,
        "page": paging.page(),
        "limit": paging.limit()
    })))
}

#[utoipa::path(
    get,
    path = "/api/transactions/export",
    responses((status = 200, description = "All transactions as CSV", content_type = "text/csv"))
)]
pub async fn export_transactions(
    State(state): State<AppState>,
    claims: Claims,
) -> ApiResult<impl IntoResponse> {
    let rows = transaction_service::all_for_user(state.db(), claims.user_id()?).await?;
    let csv = transaction_service::to_csv(&rows)?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"transactions.csv\"",
            ),
        ],
        csv,
    ))
}
