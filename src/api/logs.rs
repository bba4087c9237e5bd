use axum::{
    extract::{Json, Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use utoipa::IntoParams;

use crate::api::error::ApiResult;
use crate::api::pagination::PageParams;
use crate::infrastructure::AppState;
use crate::infrastructure::auth::Claims;
use crate::services::activity_service::{self, LogFilter};

#[derive(Debug, Deserialize, IntoParams)]
pub struct LogQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub action: Option<String>,
    /// Admins only: every user's activity
    pub all: Option<bool>,
}

#[utoipa::path(
    get,
    path = "/api/logs",
    params(LogQuery),
    responses(
        (status = 200, description = "Paginated activity log"),
        (status = 403, description = "`all` requested by a non-admin")
    )
)]
pub async fn list_logs(
    State(state): State<AppState>,
    claims: Claims,
    Query(params): Query<LogQuery>,
) -> ApiResult<impl IntoResponse> {
    let paging = PageParams {
        page: params.page,
        limit: params.limit,
    };

    let user_id = if params.all.unwrap_or(false) {
        claims.require_admin()?;
        None
    } else {
        Some(claims.user_id()?)
    };

    let result = activity_service::list_logs(
        state.db(),
        LogFilter {
            user_id,
            action: params.action,
            page: paging.page_index(),
            limit: paging.limit(),
        },
    )
    .await?;

    Ok(Json(json!({
        "logs": result.logs,
        "total": result.total,
        "page": paging.page(),
        "limit": paging.limit()
    })))
}
