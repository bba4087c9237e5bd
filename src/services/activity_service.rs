//! Activity Service - audit trail of user actions

use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde_json::Value;

use crate::domain::DomainError;
use crate::models::activity_log::{self, Entity as ActivityLog};

pub async fn log_activity<C>(
    db: &C,
    user_id: Option<i32>,
    action: &str,
    details: Option<Value>,
) -> Result<(), DomainError>
where
    C: ConnectionTrait,
{
    let log = activity_log::ActiveModel {
        user_id: Set(user_id),
        action: Set(action.to_owned()),
        details: Set(details.map(|v| v.to_string())),
        created_at: Set(chrono::Utc::now().to_rfc3339()),
        ..Default::default()
    };

    ActivityLog::insert(log).exec(db).await?;
    Ok(())
}

/// Like `log_activity`, for call sites where a failed audit write must not fail the request
pub async fn try_log_activity(
    db: &DatabaseConnection,
    user_id: Option<i32>,
    action: &str,
    details: Option<Value>,
) {
    if let Err(e) = log_activity(db, user_id, action, details).await {
        tracing::error!("Failed to record '{}' activity: {}", action, e);
    }
}

#[derive(Debug, Default, Clone)]
pub struct LogFilter {
    /// `None` lists every user's activity (admin view)
    pub user_id: Option<i32>,
    pub action: Option<String>,
    pub page: u64,
    pub limit: u64,
}

#[derive(Debug)]
pub struct PaginatedLogs {
    pub logs: Vec<activity_log::Model>,
    pub total: u64,
}

/// Newest first. `page` is zero-based.
pub async fn list_logs(
    db: &DatabaseConnection,
    filter: LogFilter,
) -> Result<PaginatedLogs, DomainError> {
    let mut query = ActivityLog::find();

    if let Some(user_id) = filter.user_id {
        query = query.filter(activity_log::Column::UserId.eq(user_id));
    }

    if let Some(action) = &filter.action
        && !action.is_empty()
    {
        query = query.filter(activity_log::Column::Action.eq(action.as_str()));
    }

    let paginator = query
        .order_by_desc(activity_log::Column::Id)
        .paginate(db, filter.limit.max(1));
    let total = paginator.num_items().await?;
    let logs = paginator.fetch_page(filter.page).await?;

    Ok(PaginatedLogs { logs, total })
}
