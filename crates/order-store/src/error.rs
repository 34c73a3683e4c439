use thiserror::Error;

use crate::OrderId;

/// Errors that can occur when interacting with the order store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No order row matches the identifier.
    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A non-SQL backend failed to complete a write.
    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Result type for order store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
