//! Saga error types.

use common::OrderId;
use domain::{OrderError, OrderStatus, ProductId, UserId};
use order_store::StoreError;
use thiserror::Error;

use crate::services::CatalogError;

/// Errors surfaced by the order saga.
///
/// Every collaborator failure is translated into one of these variants at the
/// point of call, so callers can branch on `kind()` without parsing messages.
#[derive(Debug, Error)]
pub enum SagaError {
    /// Malformed input, rejected before any remote call.
    #[error("Validation error: {0}")]
    Validation(OrderError),

    /// The identity check was negative or could not be performed.
    #[error("Invalid user: {user_id}")]
    InvalidUser { user_id: UserId },

    /// The catalog does not know the product.
    #[error("Product not found: {product_id}")]
    ProductNotFound { product_id: ProductId },

    /// The catalog refused a stock decrement that would go below zero.
    #[error("Insufficient stock for product {product_id} (requested {requested})")]
    InsufficientStock {
        product_id: ProductId,
        requested: u64,
    },

    /// The frozen price times the quantity, or the running order total, does
    /// not fit the money range. Detected before that line's stock is touched.
    #[error("Order amount out of range at product {product_id}")]
    AmountOutOfRange { product_id: ProductId },

    /// A collaborator could not be reached in time.
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    /// The order could not be stored after its stock was reserved.
    #[error("Create order error: {0}")]
    Persistence(String),

    /// Requested status is outside the allowed set.
    #[error("Invalid status: '{value}'")]
    InvalidStatus { value: String },

    /// Requested status is not reachable from the current one.
    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    /// Order not found.
    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),

    /// Order store error outside the creation path.
    #[error("Order store error: {0}")]
    Store(StoreError),
}

impl SagaError {
    /// Stable, machine-readable failure category.
    pub fn kind(&self) -> &'static str {
        match self {
            SagaError::Validation(_) => "validation_error",
            SagaError::InvalidUser { .. } => "invalid_user",
            SagaError::ProductNotFound { .. } => "product_not_found",
            SagaError::InsufficientStock { .. } => "insufficient_stock",
            SagaError::AmountOutOfRange { .. } => "amount_out_of_range",
            SagaError::Unavailable(_) => "unavailable",
            SagaError::Persistence(_) => "persistence_error",
            SagaError::InvalidStatus { .. } => "invalid_status",
            SagaError::InvalidTransition { .. } => "invalid_transition",
            SagaError::OrderNotFound(_) => "not_found",
            SagaError::Store(_) => "store_error",
        }
    }
}

impl From<OrderError> for SagaError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::InvalidStatus { value } => SagaError::InvalidStatus { value },
            OrderError::InvalidTransition { from, to } => SagaError::InvalidTransition { from, to },
            other => SagaError::Validation(other),
        }
    }
}

impl From<CatalogError> for SagaError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::NotFound(product_id) => SagaError::ProductNotFound { product_id },
            CatalogError::InsufficientStock { product_id, delta } => SagaError::InsufficientStock {
                product_id,
                requested: delta.unsigned_abs(),
            },
            CatalogError::Unavailable(msg) => SagaError::Unavailable(msg),
            CatalogError::Malformed(msg) => SagaError::Unavailable(msg),
        }
    }
}

impl From<StoreError> for SagaError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(order_id) => SagaError::OrderNotFound(order_id),
            StoreError::Timeout => SagaError::Unavailable("order store timed out".to_string()),
            StoreError::Unavailable(msg) => SagaError::Unavailable(msg),
            other => SagaError::Store(other),
        }
    }
}

/// Convenience type alias for saga results.
pub type Result<T> = std::result::Result<T, SagaError>;
