//! Domain error types.

use common::OrderId;
use order_store::StoreError;
use thiserror::Error;

/// Errors that can occur during order operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// No order with this identifier exists.
    #[error("order not found")]
    NotFound(OrderId),

    /// The store failed to read or write.
    #[error("Order store error: {0}")]
    Store(StoreError),
}

impl DomainError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, DomainError::NotFound(_))
    }
}

impl From<StoreError> for DomainError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::OrderNotFound(order_id) => DomainError::NotFound(order_id),
            other => DomainError::Store(other),
        }
    }
}

/// Result type for domain operations.
pub type Result<T> = std::result::Result<T, DomainError>;
