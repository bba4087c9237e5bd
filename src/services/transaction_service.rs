//! Transaction Service - money movements caused by investments

use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::Serialize;

use crate::domain::DomainError;
use crate::models::transaction::{self, Entity as Transaction};
use crate::utils::format::{format_currency, format_date};

/// Ledger row with display strings for the client
#[derive(Debug, Clone, Serialize)]
pub struct TransactionView {
    #[serde(flatten)]
    pub transaction: transaction::Model,
    pub formatted_amount: String,
    pub formatted_date: String,
}

impl TransactionView {
    pub fn new(transaction: transaction::Model, currency: &str) -> Self {
        Self {
            formatted_amount: format_currency(transaction.amount, currency),
            formatted_date: format_date(&transaction.created_at),
            transaction,
        }
    }
}

pub fn present(rows: Vec<transaction::Model>, currency: &str) -> Vec<TransactionView> {
    rows.into_iter()
        .map(|row| TransactionView::new(row, currency))
        .collect()
}

pub async fn record<C>(
    db: &C,
    user_id: i32,
    investment_id: Option<i32>,
    kind: &str,
    amount: f64,
    description: String,
) -> Result<transaction::Model, DomainError>
where
    C: ConnectionTrait,
{
    let row = transaction::ActiveModel {
        user_id: Set(user_id),
        investment_id: Set(investment_id),
        kind: Set(kind.to_owned()),
        amount: Set(amount),
        status: Set("completed".to_owned()),
        description: Set(description),
        created_at: Set(chrono::Utc::now().to_rfc3339()),
        ..Default::default()
    };

    let result = Transaction::insert(row).exec_with_returning(db).await?;
    Ok(result)
}

#[derive(Debug, Default, Clone)]
pub struct TransactionFilter {
    pub user_id: i32,
    pub kind: Option<String>,
    pub page: u64,
    pub limit: u64,
}

#[derive(Debug)]
pub struct PaginatedTransactions {
    pub transactions: Vec<transaction::Model>,
    pub total: u64,
}

pub async fn list_transactions(
    db: &DatabaseConnection,
    filter: TransactionFilter,
) -> Result<PaginatedTransactions, DomainError> {
    let mut query = Transaction::find().filter(transaction::Column::UserId.eq(filter.user_id));

    if let Some(kind) = &filter.kind
        && !kind.is_empty()
    {
        query = query.filter(transaction::Column::Kind.eq(kind.as_str()));
    }

    let paginator = query
        .order_by_desc(transaction::Column::Id)
        .paginate(db, filter.limit.max(1));
    let total = paginator.num_items().await?;
    let transactions = paginator.fetch_page(filter.page).await?;

    Ok(PaginatedTransactions {
        transactions,
        total,
    })
}

/// Every transaction of a user, oldest first, for exports
pub async fn all_for_user(
    db: &DatabaseConnection,
    user_id: i32,
) -> Result<Vec<transaction::Model>, DomainError> {
    let rows = Transaction::find()
        .filter(transaction::Column::UserId.eq(user_id))
        .order_by_asc(transaction::Column::Id)
        .all(db)
        .await?;
    Ok(rows)
}

/// Render transactions as CSV with a header row
pub fn to_csv(rows: &[transaction::Model]) -> Result<String, DomainError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record([
            "id",
            "date",
            "kind",
            "amount",
            "status",
            "description",
            "investment_id",
        ])
        .map_err(|e| DomainError::Internal(e.to_string()))?;

    for row in rows {
        writer
            .write_record([
                row.id.to_string(),
                row.created_at.clone(),
                row.kind.clone(),
                format!("{:.2}", row.amount),
                row.status.clone(),
                row.description.clone(),
                row.investment_id.map(|id| id.to_string()).unwrap_or_default(),
            ])
            .map_err(|e| DomainError::Internal(e.to_string()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| DomainError::Internal(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| DomainError::Internal(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_quotes_descriptions_with_commas() {
        let rows = vec![transaction::Model {
            id: 7,
            user_id: 1,
            investment_id: Some(3),
            kind: "investment".to_string(),
            amount: 2500.0,
            status: "completed".to_string(),
            description: "Invested in Gilt Fund, 2030".to_string(),
            created_at: "2026-10-19T08:30:00+00:00".to_string(),
        }];

        let csv = to_csv(&rows).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("id,date,kind,amount,status,description,investment_id")
        );
        assert_eq!(
            lines.next(),
            Some("7,2026-10-19T08:30:00+00:00,investment,2500.00,completed,\"Invested in Gilt Fund, 2030\",3")
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_view_adds_display_strings() {
        let view = TransactionView::new(
            transaction::Model {
                id: 1,
                user_id: 1,
                investment_id: None,
                kind: "refund".to_string(),
                amount: 125000.5,
                status: "completed".to_string(),
                description: "Refund".to_string(),
                created_at: "2026-03-02T10:00:00+00:00".to_string(),
            },
            "INR",
        );
        assert_eq!(view.formatted_amount, "₹1,25,000.50");
        assert_eq!(view.formatted_date, "02 Mar 2026");

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["kind"], "refund");
        assert_eq!(json["formatted_date"], "02 Mar 2026");
    }
}
