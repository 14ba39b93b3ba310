use std::sync::Arc;

use async_trait::async_trait;
use domain::{Order, OrderLineItem, OrderRecord, OrderStatus, UserId};

use crate::{ListQuery, OrderId, Result};

/// Durable storage for orders and their line items.
///
/// All implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Stores an order and all of its items.
    ///
    /// The write is atomic: either the order and every item are stored, or nothing is.
    async fn create(&self, record: &OrderRecord) -> Result<()>;

    /// Retrieves an order and its items.
    ///
    /// Returns None if the order doesn't exist.
    async fn get(&self, order_id: OrderId) -> Result<Option<OrderRecord>>;

    /// Lists a user's orders, newest first.
    async fn list_by_user(&self, user_id: &UserId, query: ListQuery) -> Result<Vec<Order>>;

    /// Overwrites an order's status and refreshes its update timestamp.
    ///
    /// Fails with `NotFound` if no order has the given ID.
    async fn update_status(&self, order_id: OrderId, status: OrderStatus) -> Result<()>;

    /// Retrieves the line items of an order.
    async fn get_items(&self, order_id: OrderId) -> Result<Vec<OrderLineItem>>;
}

#[async_trait]
impl<T: OrderRepository + ?Sized> OrderRepository for Arc<T> {
    async fn create(&self, record: &OrderRecord) -> Result<()> {
        (**self).create(record).await
    }

    async fn get(&self, order_id: OrderId) -> Result<Option<OrderRecord>> {
        (**self).get(order_id).await
    }

    async fn list_by_user(&self, user_id: &UserId, query: ListQuery) -> Result<Vec<Order>> {
        (**self).list_by_user(user_id, query).await
    }

    async fn update_status(&self, order_id: OrderId, status: OrderStatus) -> Result<()> {
        (**self).update_status(order_id, status).await
    }

    async fn get_items(&self, order_id: OrderId) -> Result<Vec<OrderLineItem>> {
        (**self).get_items(order_id).await
    }
}
