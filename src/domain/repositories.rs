//! Repository trait definitions
//!
//! These traits define the contract for data access.
//! Implementations live in the infrastructure layer.

use async_trait::async_trait;

use super::DomainError;
use crate::models::product::Product;

/// Filter criteria for product queries
#[derive(Debug, Default, Clone)]
pub struct ProductFilter {
    pub category: Option<String>,
    pub risk_level: Option<String>,
    /// Matched against name and description
    pub search: Option<String>,
    pub sort: Option<String>,
    pub include_inactive: bool,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

/// Paginated result with total count
#[derive(Debug)]
pub struct PaginatedProducts {
    pub products: Vec<Product>,
    pub total: u64,
}

/// Repository trait for Product entity
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn find_all(&self, filter: ProductFilter) -> Result<PaginatedProducts, DomainError>;

    async fn find_by_id(&self, id: i32) -> Result<Option<Product>, DomainError>;

    /// Active products with the highest expected return
    async fn top_by_return(&self, limit: u64) -> Result<Vec<Product>, DomainError>;

    async fn create(&self, product: Product) -> Result<Product, DomainError>;

    async fn update(&self, id: i32, product: Product) -> Result<Product, DomainError>;

    /// Soft delete: the row stays for existing investments
    async fn deactivate(&self, id: i32) -> Result<(), DomainError>;
}
