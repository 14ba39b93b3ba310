//! Order model and related types.

mod commands;
mod model;
mod status;
mod value_objects;

pub use commands::{MAX_QUANTITY, OrderLine, PlaceOrder, RequestedItem, ValidatedOrder};
pub use model::{Order, OrderLineItem, OrderRecord, PricedLine};
pub use status::{OrderStatus, StatusChange};
pub use value_objects::{MAX_AMOUNT_CENTS, Money, MoneyError, ProductId, UserId};

use thiserror::Error;

/// Errors raised while validating order input or status changes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    /// User ID is required.
    #[error("user_id is required")]
    UserIdRequired,

    /// Order has no items.
    #[error("order must contain at least one item")]
    NoItems,

    /// An item was submitted without a product id.
    #[error("item {index}: product_id is required")]
    ProductIdRequired { index: usize },

    /// Invalid quantity.
    #[error("item {index}: invalid quantity {quantity} (must be between 1 and {})", MAX_QUANTITY)]
    InvalidQuantity { index: usize, quantity: i64 },

    /// Requested status is outside the allowed set.
    #[error("invalid status '{value}' (expected pending, paid or canceled)")]
    InvalidStatus { value: String },

    /// The status change is not one of the legal transitions.
    #[error("invalid status transition: {from} -> {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    /// A line or order total does not fit the money range.
    #[error("order total exceeds the supported amount range")]
    AmountOutOfRange,
}
