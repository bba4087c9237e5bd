//! SeaORM implementation of ProductRepository

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};

use crate::domain::{DomainError, PaginatedProducts, ProductFilter, ProductRepository};
use crate::models::Product;
use crate::models::product::{ActiveModel, Column, Entity as ProductEntity};

/// SeaORM-based implementation of ProductRepository
pub struct SeaOrmProductRepository {
    db: DatabaseConnection,
}

impl SeaOrmProductRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProductRepository for SeaOrmProductRepository {
    async fn find_all(&self, filter: ProductFilter) -> Result<PaginatedProducts, DomainError> {
        let mut query = ProductEntity::find();

        if !filter.include_inactive {
            query = query.filter(Column::IsActive.eq(true));
        }

        if let Some(category) = &filter.category
            && !category.is_empty()
        {
            query = query.filter(Column::Category.eq(category.as_str()));
        }

        if let Some(risk) = &filter.risk_level
            && !risk.is_empty()
        {
            query = query.filter(Column::RiskLevel.eq(risk.as_str()));
        }

        if let Some(q) = &filter.search
            && !q.trim().is_empty()
        {
            let q = q.trim();
            let cond = Condition::any()
                .add(Column::Name.contains(q))
                .add(Column::Description.contains(q));
            query = query.filter(cond);
        }

        match filter.sort.as_deref() {
            Some("return_desc") => query = query.order_by_desc(Column::ExpectedReturn),
            Some("return_asc") => query = query.order_by_asc(Column::ExpectedReturn),
            Some("min_investment_asc") => query = query.order_by_asc(Column::MinInvestment),
            _ => query = query.order_by_asc(Column::Name),
        }
        query = query.order_by_asc(Column::Id);

        let (products, total) = if let Some(limit) = filter.limit {
            let page = filter.page.unwrap_or(0);
            let paginator = query.paginate(&self.db, limit.max(1));
            let total = paginator.num_items().await?;
            let items = paginator.fetch_page(page).await?;
            (items, total)
        } else {
            let items = query.all(&self.db).await?;
            let total = items.len() as u64;
            (items, total)
        };

        Ok(PaginatedProducts {
            products: products.into_iter().map(Product::from).collect(),
            total,
        })
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Product>, DomainError> {
        let product = ProductEntity::find_by_id(id).one(&self.db).await?;
        Ok(product.map(Product::from))
    }

    async fn top_by_return(&self, limit: u64) -> Result<Vec<Product>, DomainError> {
        let products = ProductEntity::find()
            .filter(Column::IsActive.eq(true))
            .order_by_desc(Column::ExpectedReturn)
            .order_by_asc(Column::Id)
            .limit(limit)
            .all(&self.db)
            .await?;
        Ok(products.into_iter().map(Product::from).collect())
    }

    async fn create(&self, product: Product) -> Result<Product, DomainError> {
        let now = chrono::Utc::now().to_rfc3339();
        let is_active = product.is_active.unwrap_or(true);

        let mut new_product: ActiveModel = Product { id: None, ..product }.into();
        new_product.is_active = Set(is_active);
        new_product.created_at = Set(now.clone());
        new_product.updated_at = Set(now);

        let result = new_product.insert(&self.db).await?;
        Ok(Product::from(result))
    }

    async fn update(&self, id: i32, product: Product) -> Result<Product, DomainError> {
        let existing = ProductEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| DomainError::not_found("Product"))?;

        let mut active: ActiveModel = existing.into();
        active.name = Set(product.name);
        active.category = Set(product.category);
        active.description = Set(product.description);
        active.risk_level = Set(product.risk_level);
        active.expected_return = Set(product.expected_return);
        active.min_investment = Set(product.min_investment);
        active.max_investment = Set(product.max_investment);
        active.tenure_months = Set(product.tenure_months);
        if let Some(is_active) = product.is_active {
            active.is_active = Set(is_active);
        }
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        let result = active.update(&self.db).await?;
        Ok(Product::from(result))
    }

    async fn deactivate(&self, id: i32) -> Result<(), DomainError> {
        let existing = ProductEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| DomainError::not_found("Product"))?;

        let mut active: ActiveModel = existing.into();
        active.is_active = Set(false);
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());
        active.update(&self.db).await?;
        Ok(())
    }
}
