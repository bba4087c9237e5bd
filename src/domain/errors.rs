//! Domain error types
//!
//! These errors are framework-agnostic and represent business-level failures.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    /// Resource not found
    #[error("{0} not found")]
    NotFound(String),
    /// Validation error with message
    #[error("Validation error: {0}")]
    Validation(String),
    /// Missing or wrong credentials
    #[error("{0}")]
    Unauthorized(String),
    /// Authenticated but not allowed
    #[error("{0}")]
    Forbidden(String),
    /// Unique constraint or duplicate resource
    #[error("{0}")]
    Conflict(String),
    /// Operation not allowed in the current state of the resource
    #[error("{0}")]
    InvalidState(String),
    #[error("{0}")]
    TooManyRequests(String),
    /// Database/persistence error
    #[error("Database error: {0}")]
    Database(String),
    /// Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn not_found(what: &str) -> Self {
        DomainError::NotFound(what.to_string())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        DomainError::Validation(msg.into())
    }
}

// Conversion from SeaORM errors (used in infrastructure layer)
impl From<sea_orm::DbErr> for DomainError {
    fn from(e: sea_orm::DbErr) -> Self {
        match e.sql_err() {
            Some(sea_orm::SqlErr::UniqueConstraintViolation(detail)) => {
                tracing::debug!("Unique constraint violated: {}", detail);
                DomainError::Conflict("Resource already exists".to_string())
            }
            _ => DomainError::Database(e.to_string()),
        }
    }
}

impl<E> From<sea_orm::TransactionError<E>> for DomainError
where
    E: Into<DomainError> + std::error::Error,
{
    fn from(e: sea_orm::TransactionError<E>) -> Self {
        match e {
            sea_orm::TransactionError::Connection(db) => db.into(),
            sea_orm::TransactionError::Transaction(inner) => inner.into(),
        }
    }
}
