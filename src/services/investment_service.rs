//! Investment Service - Pure business logic without HTTP layer

use chrono::{Months, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::Serialize;
use serde_json::json;

use crate::domain::DomainError;
use crate::models::investment::{
    self, CreateInvestmentDto, Entity as Investment, STATUS_ACTIVE, STATUS_CANCELLED,
    STATUS_MATURED,
};
use crate::models::product::Entity as Product;
use crate::models::transaction::{KIND_INVESTMENT, KIND_REFUND};
use crate::services::portfolio_service::{self, PortfolioSummary};
use crate::services::{activity_service, transaction_service};
use crate::utils::format::{format_currency, format_date, percentage_change, round2};

/// Investment enriched with product info and valuation
#[derive(Debug, Clone, Serialize)]
pub struct InvestmentView {
    #[serde(flatten)]
    pub investment: investment::Model,
    pub product_name: String,
    pub product_category: String,
    pub current_value: f64,
    pub gain: f64,
    /// Gain relative to the principal, in percent
    pub gain_percentage: f64,
    pub formatted_current_value: String,
    pub formatted_invested_at: String,
    pub formatted_maturity_date: Option<String>,
}

impl InvestmentView {
    fn build(investment: investment::Model, product: Option<crate::models::product::Model>, currency: &str) -> Self {
        let value = portfolio_service::current_value(&investment, Utc::now());
        let (product_name, product_category) = product
            .map(|p| (p.name, p.category))
            .unwrap_or_else(|| ("Unknown".to_string(), "unknown".to_string()));
        let gain = if investment.status == STATUS_CANCELLED {
            0.0
        } else {
            value - investment.amount
        };

        Self {
            product_name,
            product_category,
            current_value: round2(value),
            gain: round2(gain),
            gain_percentage: round2(
                percentage_change(investment.amount, investment.amount + gain).unwrap_or(0.0),
            ),
            formatted_current_value: format_currency(value, currency),
            formatted_invested_at: format_date(&investment.invested_at),
            formatted_maturity_date: investment.maturity_date.as_deref().map(format_date),
            investment,
        }
    }
}

fn new_reference() -> String {
    let id = uuid::Uuid::new_v4().simple().to_string().to_uppercase();
    format!("INV-{}", &id[..12])
}

/// Create a new investment together with its debit transaction and audit entry
pub async fn create_investment(
    db: &DatabaseConnection,
    user_id: i32,
    dto: CreateInvestmentDto,
) -> Result<investment::Model, DomainError> {
    if !dto.amount.is_finite() || dto.amount <= 0.0 {
        return Err(DomainError::validation("Amount must be a positive number"));
    }

    let product = Product::find_by_id(dto.product_id)
        .one(db)
        .await?
        .ok_or_else(|| DomainError::not_found("Product"))?;

    if !product.is_active {
        return Err(DomainError::InvalidState(
            "Product is not available for investment".to_string(),
        ));
    }

    if dto.amount < product.min_investment {
        return Err(DomainError::validation(format!(
            "Minimum investment for {} is {:.2}",
            product.name, product.min_investment
        )));
    }

    if let Some(max) = product.max_investment
        && dto.amount > max
    {
        return Err(DomainError::validation(format!(
            "Maximum investment for {} is {:.2}",
            product.name, max
        )));
    }

    let now = Utc::now();
    let maturity_date = product
        .tenure_months
        .filter(|m| *m > 0)
        .and_then(|m| now.checked_add_months(Months::new(m as u32)))
        .map(|d| d.to_rfc3339());

    let txn = db.begin().await?;

    let new_investment = investment::ActiveModel {
        reference: Set(new_reference()),
        user_id: Set(user_id),
        product_id: Set(product.id),
        amount: Set(dto.amount),
        expected_return: Set(product.expected_return),
        status: Set(STATUS_ACTIVE.to_owned()),
        invested_at: Set(now.to_rfc3339()),
        maturity_date: Set(maturity_date),
        cancelled_at: Set(None),
        created_at: Set(now.to_rfc3339()),
        updated_at: Set(now.to_rfc3339()),
        ..Default::default()
    };
    let saved = new_investment.insert(&txn).await?;

    transaction_service::record(
        &txn,
        user_id,
        Some(saved.id),
        KIND_INVESTMENT,
        saved.amount,
        format!("Invested in {}", product.name),
    )
    .await?;

    activity_service::log_activity(
        &txn,
        Some(user_id),
        "investment_created",
        Some(json!({
            "investment_id": saved.id,
            "reference": saved.reference,
            "product_id": product.id,
            "amount": saved.amount,
        })),
    )
    .await?;

    txn.commit().await?;

    tracing::info!(
        "User {} invested {:.2} in product {} ({})",
        user_id,
        saved.amount,
        product.id,
        saved.reference
    );
    Ok(saved)
}

/// Cancel an active investment and refund the principal.
/// Investments past their maturity date can no longer be cancelled.
pub async fn cancel_investment(
    db: &DatabaseConnection,
    user_id: i32,
    id: i32,
) -> Result<investment::Model, DomainError> {
    refresh_matured(db, user_id).await?;

    let existing = Investment::find_by_id(id)
        .filter(investment::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or_else(|| DomainError::not_found("Investment"))?;

    if existing.status != STATUS_ACTIVE {
        return Err(DomainError::InvalidState(format!(
            "Only active investments can be cancelled (current status: {})",
            existing.status
        )));
    }

    let now = Utc::now().to_rfc3339();
    let txn = db.begin().await?;

    // Only one request can move the row out of `active`; the loser refunds nothing
    let claimed = Investment::update_many()
        .col_expr(investment::Column::Status, Expr::value(STATUS_CANCELLED))
        .col_expr(investment::Column::CancelledAt, Expr::value(now.clone()))
        .col_expr(investment::Column::UpdatedAt, Expr::value(now.clone()))
        .filter(investment::Column::Id.eq(id))
        .filter(investment::Column::UserId.eq(user_id))
        .filter(investment::Column::Status.eq(STATUS_ACTIVE))
        .filter(
            Condition::any()
                .add(investment::Column::MaturityDate.is_null())
                .add(investment::Column::MaturityDate.gt(now.clone())),
        )
        .exec(&txn)
        .await?;

    if claimed.rows_affected != 1 {
        txn.rollback().await?;
        return Err(DomainError::InvalidState(
            "Investment is no longer active".to_string(),
        ));
    }

    let updated = Investment::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or_else(|| DomainError::not_found("Investment"))?;

    transaction_service::record(
        &txn,
        user_id,
        Some(updated.id),
        KIND_REFUND,
        updated.amount,
        format!("Refund for cancelled investment {}", updated.reference),
    )
    .await?;

    activity_service::log_activity(
        &txn,
        Some(user_id),
        "investment_cancelled",
        Some(json!({
            "investment_id": updated.id,
            "reference": updated.reference,
            "refund": updated.amount,
        })),
    )
    .await?;

    txn.commit().await?;

    tracing::info!("User {} cancelled investment {}", user_id, updated.id);
    Ok(updated)
}

/// Flip active investments past their maturity date to `matured`
pub async fn refresh_matured(db: &DatabaseConnection, user_id: i32) -> Result<u64, DomainError> {
    let now = Utc::now().to_rfc3339();
    let result = Investment::update_many()
        .col_expr(investment::Column::Status, Expr::value(STATUS_MATURED))
        .col_expr(investment::Column::UpdatedAt, Expr::value(now.clone()))
        .filter(investment::Column::UserId.eq(user_id))
        .filter(investment::Column::Status.eq(STATUS_ACTIVE))
        .filter(investment::Column::MaturityDate.is_not_null())
        .filter(investment::Column::MaturityDate.lte(now))
        .exec(db)
        .await?;

    if result.rows_affected > 0 {
        tracing::debug!(
            "{} investment(s) of user {} matured",
            result.rows_affected,
            user_id
        );
    }
    Ok(result.rows_affected)
}

pub async fn list_investments(
    db: &DatabaseConnection,
    user_id: i32,
    status: Option<String>,
    currency: &str,
) -> Result<Vec<InvestmentView>, DomainError> {
    refresh_matured(db, user_id).await?;

    let mut query = Investment::find().filter(investment::Column::UserId.eq(user_id));
    if let Some(status) = status
        && !status.is_empty()
    {
        query = query.filter(investment::Column::Status.eq(status));
    }

    let rows = query
        .order_by_desc(investment::Column::Id)
        .find_also_related(Product)
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(inv, product)| InvestmentView::build(inv, product, currency))
        .collect())
}

pub async fn get_investment(
    db: &DatabaseConnection,
    user_id: i32,
    id: i32,
    currency: &str,
) -> Result<InvestmentView, DomainError> {
    refresh_matured(db, user_id).await?;

    let (inv, product) = Investment::find_by_id(id)
        .filter(investment::Column::UserId.eq(user_id))
        .find_also_related(Product)
        .one(db)
        .await?
        .ok_or_else(|| DomainError::not_found("Investment"))?;

    Ok(InvestmentView::build(inv, product, currency))
}

pub async fn portfolio(
    db: &DatabaseConnection,
    user_id: i32,
    currency: &str,
) -> Result<PortfolioSummary, DomainError> {
    refresh_matured(db, user_id).await?;

    let rows = Investment::find()
        .filter(investment::Column::UserId.eq(user_id))
        .find_also_related(Product)
        .all(db)
        .await?;

    let holdings: Vec<(investment::Model, String)> = rows
        .into_iter()
        .map(|(inv, product)| {
            let category = product
                .map(|p| p.category)
                .unwrap_or_else(|| "unknown".to_string());
            (inv, category)
        })
        .collect();

    Ok(portfolio_service::summarize(&holdings, Utc::now(), currency))
}
