//! Domain layer for the order service.
//!
//! This crate provides the order data model and its invariants:
//! - `Money`, a two-decimal fixed-point amount with checked arithmetic
//! - `OrderStatus`, the pending → paid / canceled state machine
//! - `Order`, `OrderLineItem` and `OrderRecord` with frozen unit prices
//! - `PlaceOrder` input validation performed before any remote call

pub mod order;

pub use order::{
    MAX_AMOUNT_CENTS, MAX_QUANTITY, Money, MoneyError, Order, OrderError, OrderLine,
    OrderLineItem, OrderRecord, OrderStatus, PlaceOrder, PricedLine, ProductId, RequestedItem,
    StatusChange, UserId, ValidatedOrder,
};
