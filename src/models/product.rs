use sea_orm::entity::prelude::*;
use sea_orm::{NotSet, Set};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::DomainError;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    #[sea_orm(indexed)]
    pub category: String, // 'bond', 'etf', 'mutual_fund', 'fixed_deposit', 'stock'
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub risk_level: String, // 'low', 'medium', 'high'
    /// Annual return in percent
    pub expected_return: f64,
    pub min_investment: f64,
    pub max_investment: Option<f64>,
    pub tenure_months: Option<i32>,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::investment::Entity")]
    Investments,
}

impl Related<super::investment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Investments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub const CATEGORIES: [&str; 5] = ["bond", "etf", "mutual_fund", "fixed_deposit", "stock"];
pub const RISK_LEVELS: [&str; 3] = ["low", "medium", "high"];

// DTO for API requests and responses
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: Option<i32>,
    pub name: String,
    pub category: String,
    pub description: Option<String>,
    pub risk_level: String,
    pub expected_return: f64,
    pub min_investment: f64,
    pub max_investment: Option<f64>,
    pub tenure_months: Option<i32>,
    pub is_active: Option<bool>,
    #[serde(skip_deserializing)]
    pub created_at: Option<String>,
}

impl Product {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("Product name is required"));
        }
        if !CATEGORIES.contains(&self.category.as_str()) {
            return Err(DomainError::validation(format!(
                "Category must be one of: {}",
                CATEGORIES.join(", ")
            )));
        }
        if !RISK_LEVELS.contains(&self.risk_level.as_str()) {
            return Err(DomainError::validation(format!(
                "Risk level must be one of: {}",
                RISK_LEVELS.join(", ")
            )));
        }
        if !self.expected_return.is_finite() || !(0.0..=100.0).contains(&self.expected_return) {
            return Err(DomainError::validation(
                "Expected return must be between 0 and 100",
            ));
        }
        if !self.min_investment.is_finite() || self.min_investment <= 0.0 {
            return Err(DomainError::validation(
                "Minimum investment must be greater than 0",
            ));
        }
        if let Some(max) = self.max_investment
            && (!max.is_finite() || max < self.min_investment)
        {
            return Err(DomainError::validation(
                "Maximum investment must not be below the minimum",
            ));
        }
        if let Some(months) = self.tenure_months
            && months <= 0
        {
            return Err(DomainError::validation("Tenure must be a positive number of months"));
        }
        Ok(())
    }
}

impl From<Model> for Product {
    fn from(model: Model) -> Self {
        Self {
            id: Some(model.id),
            name: model.name,
            category: model.category,
            description: model.description,
            risk_level: model.risk_level,
            expected_return: model.expected_return,
            min_investment: model.min_investment,
            max_investment: model.max_investment,
            tenure_months: model.tenure_months,
            is_active: Some(model.is_active),
            created_at: Some(model.created_at),
        }
    }
}

impl From<Product> for ActiveModel {
    fn from(product: Product) -> Self {
        Self {
            id: product.id.map_or(NotSet, Set),
            name: Set(product.name),
            category: Set(product.category),
            description: Set(product.description),
            risk_level: Set(product.risk_level),
            expected_return: Set(product.expected_return),
            min_investment: Set(product.min_investment),
            max_investment: Set(product.max_investment),
            tenure_months: Set(product.tenure_months),
            is_active: product.is_active.map_or(NotSet, Set),
            created_at: NotSet,
            updated_at: NotSet,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bond() -> Product {
        Product {
            id: None,
            name: "Treasury Bond 2030".to_string(),
            category: "bond".to_string(),
            description: None,
            risk_level: "low".to_string(),
            expected_return: 7.1,
            min_investment: 1000.0,
            max_investment: Some(500_000.0),
            tenure_months: Some(60),
            is_active: None,
            created_at: None,
        }
    }

    #[test]
    fn test_valid_product() {
        assert!(bond().validate().is_ok());
    }

    #[test]
    fn test_rejects_unknown_category_and_risk() {
        let mut p = bond();
        p.category = "crypto".to_string();
        assert!(p.validate().is_err());

        let mut p = bond();
        p.risk_level = "extreme".to_string();
        assert!(p.validate().is_err());
    }

    #[test]
    fn test_rejects_inconsistent_amounts() {
        let mut p = bond();
        p.max_investment = Some(500.0);
        assert!(p.validate().is_err());

        let mut p = bond();
        p.min_investment = 0.0;
        assert!(p.validate().is_err());

        let mut p = bond();
        p.expected_return = 120.0;
        assert!(p.validate().is_err());

        let mut p = bond();
        p.tenure_months = Some(0);
        assert!(p.validate().is_err());
    }
}
