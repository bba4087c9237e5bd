use axum::{
    extract::{Json, State},
    response::IntoResponse,
};
use serde_json::json;

use crate::api::error::ApiResult;
use crate::infrastructure::AppState;
use crate::infrastructure::auth::Claims;
use crate::models::user::UserDto;
use crate::services::activity_service::{self, LogFilter};
use crate::services::transaction_service::{self, TransactionFilter};
use crate::services::{auth_service, investment_service};

const RECENT_ITEMS: u64 = 5;
const TOP_PRODUCTS: u64 = 3;

#[utoipa::path(
    get,
    path = "/api/dashboard",
    responses(
        (status = 200, description = "User, portfolio, recent activity, recent transactions and top products"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn get_dashboard(
    State(state): State<AppState>,
    claims: Claims,
) -> ApiResult<impl IntoResponse> {
    let user_id = claims.user_id()?;
    let db = state.db();

    let user = auth_service::find_user(db, user_id).await?;
    let portfolio = investment_service::portfolio(db, user_id, state.currency()).await?;

    let recent_activity = activity_service::list_logs(
        db,
        LogFilter {
            user_id: Some(user_id),
            action: None,
            page: 0,
            limit: RECENT_ITEMS,
        },
    )
    .await?;

    let recent_transactions = transaction_service::list_transactions(
        db,
        TransactionFilter {
            user_id,
            kind: None,
            page: 0,
            limit: RECENT_ITEMS,
        },
    )
    .await?;

    let top_products = state.product_repo.top_by_return(TOP_PRODUCTS).await?;

    Ok(Json(json!({
        "user": UserDto::from(user),
        "portfolio": portfolio,
        "recent_activity": recent_activity.logs,
        "recent_transactions": transaction_service::present(
            recent_transactions.transactions,
            state.currency()
        ),
        "top_products": top_products
    })))
}
