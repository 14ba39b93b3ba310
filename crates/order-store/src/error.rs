use thiserror::Error;

use crate::OrderId;

/// Errors that can occur when interacting with the order repository.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The order was not found.
    #[error("Order not found: {0}")]
    NotFound(OrderId),

    /// An order with the same ID already exists.
    #[error("Order already exists: {0}")]
    Duplicate(OrderId),

    /// A stored row could not be mapped back into the domain model.
    #[error("Corrupt order row: {0}")]
    Corrupt(String),

    /// The repository could not be reached (or was told to fail).
    #[error("Order store unavailable: {0}")]
    Unavailable(String),

    /// The call did not complete within its deadline.
    #[error("Order store call timed out")]
    Timeout,

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl From<tokio::time::error::Elapsed> for StoreError {
    fn from(_: tokio::time::error::Elapsed) -> Self {
        StoreError::Timeout
    }
}

/// Result type for order repository operations.
pub type Result<T> = std::result::Result<T, StoreError>;
