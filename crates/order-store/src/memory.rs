use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use domain::{Order, OrderLineItem, OrderRecord, OrderStatus, UserId};
use tokio::sync::RwLock;

use crate::{ListQuery, OrderId, Result, StoreError, store::OrderRepository};

/// In-memory order repository for testing and local runs.
///
/// This implementation keeps every record in memory and provides
/// the same interface as the PostgreSQL implementation.
#[derive(Clone, Default)]
pub struct InMemoryOrderRepository {
    records: Arc<RwLock<Vec<OrderRecord>>>,
    fail_on_create: Arc<AtomicBool>,
    fail_on_update: Arc<AtomicBool>,
}

impl InMemoryOrderRepository {
    /// Creates a new empty in-memory repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the repository to fail every `create` call.
    pub fn set_fail_on_create(&self, fail: bool) {
        self.fail_on_create.store(fail, Ordering::SeqCst);
    }

    /// Configures the repository to fail every `update_status` call.
    pub fn set_fail_on_update(&self, fail: bool) {
        self.fail_on_update.store(fail, Ordering::SeqCst);
    }

    /// Stores a record directly, bypassing failure injection.
    pub async fn insert(&self, record: OrderRecord) {
        self.records.write().await.push(record);
    }

    /// Removes an order, simulating a concurrent delete.
    pub async fn remove(&self, order_id: OrderId) {
        self.records.write().await.retain(|r| r.order.id != order_id);
    }

    /// Returns the number of stored orders.
    pub async fn order_count(&self) -> usize {
        self.records.read().await.len()
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn create(&self, record: &OrderRecord) -> Result<()> {
        if self.fail_on_create.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("create disabled".to_string()));
        }

        let mut records = self.records.write().await;
        if records.iter().any(|r| r.order.id == record.order.id) {
            return Err(StoreError::Duplicate(record.order.id));
        }
        records.push(record.clone());
        Ok(())
    }

    async fn get(&self, order_id: OrderId) -> Result<Option<OrderRecord>> {
        let records = self.records.read().await;
        Ok(records.iter().find(|r| r.order.id == order_id).cloned())
    }

    async fn list_by_user(&self, user_id: &UserId, query: ListQuery) -> Result<Vec<Order>> {
        let records = self.records.read().await;
        let mut orders: Vec<Order> = records
            .iter()
            .rev()
            .filter(|r| &r.order.user_id == user_id)
            .map(|r| r.order.clone())
            .collect();

        // Newest first; ties keep most-recently-inserted first
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(orders
            .into_iter()
            .skip(query.offset() as usize)
            .take(query.limit() as usize)
            .collect())
    }

    async fn update_status(&self, order_id: OrderId, status: OrderStatus) -> Result<()> {
        if self.fail_on_update.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("update disabled".to_string()));
        }

        let mut records = self.records.write().await;
        let record = records
            .iter_mut()
            .find(|r| r.order.id == order_id)
            .ok_or(StoreError::NotFound(order_id))?;
        record.order.status = status;
        record.order.updated_at = Utc::now();
        Ok(())
    }

    async fn get_items(&self, order_id: OrderId) -> Result<Vec<OrderLineItem>> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .find(|r| r.order.id == order_id)
            .map(|r| r.items.clone())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use domain::{Money, PricedLine, ProductId};

    use super::*;

    fn record_for(user: &str) -> OrderRecord {
        OrderRecord::pending(
            UserId::from(user),
            vec![PricedLine::new(
                ProductId::new("P1"),
                2,
                Money::from_cents(1500),
            )],
            Utc::now(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let repo = InMemoryOrderRepository::new();
        let record = record_for("U1");

        repo.create(&record).await.unwrap();

        let loaded = repo.get(record.id()).await.unwrap().unwrap();
        assert_eq!(loaded, record);
        assert_eq!(repo.get_items(record.id()).await.unwrap(), record.items);
    }

    #[tokio::test]
    async fn test_get_nonexistent_order() {
        let repo = InMemoryOrderRepository::new();
        assert!(repo.get(OrderId::new()).await.unwrap().is_none());
        assert!(repo.get_items(OrderId::new()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_create_is_rejected() {
        let repo = InMemoryOrderRepository::new();
        let record = record_for("U1");

        repo.create(&record).await.unwrap();
        let result = repo.create(&record).await;
        assert!(matches!(result, Err(StoreError::Duplicate(_))));
        assert_eq!(repo.order_count().await, 1);
    }

    #[tokio::test]
    async fn test_fail_on_create() {
        let repo = InMemoryOrderRepository::new();
        repo.set_fail_on_create(true);

        let result = repo.create(&record_for("U1")).await;
        assert!(matches!(result, Err(StoreError::Unavailable(_))));
        assert_eq!(repo.order_count().await, 0);
    }

    #[tokio::test]
    async fn test_update_status() {
        let repo = InMemoryOrderRepository::new();
        let record = record_for("U1");
        repo.create(&record).await.unwrap();

        repo.update_status(record.id(), OrderStatus::Paid)
            .await
            .unwrap();

        let loaded = repo.get(record.id()).await.unwrap().unwrap();
        assert_eq!(loaded.order.status, OrderStatus::Paid);
        assert!(loaded.order.updated_at >= record.order.updated_at);
        assert_eq!(loaded.items, record.items);
    }

    #[tokio::test]
    async fn test_update_status_of_missing_order() {
        let repo = InMemoryOrderRepository::new();
        let missing = OrderId::new();

        let result = repo.update_status(missing, OrderStatus::Paid).await;
        assert!(matches!(result, Err(StoreError::NotFound(id)) if id == missing));
    }

    #[tokio::test]
    async fn test_list_by_user_newest_first_with_paging() {
        let repo = InMemoryOrderRepository::new();
        let base = Utc::now();
        let mut ids = Vec::new();
        for minutes in 0..5 {
            let mut record = record_for("U1");
            record.order.created_at = base + Duration::minutes(minutes);
            ids.push(record.id());
            repo.insert(record).await;
        }
        repo.insert(record_for("U2")).await;

        let user = UserId::from("U1");
        let all = repo.list_by_user(&user, ListQuery::default()).await.unwrap();
        let listed: Vec<_> = all.iter().map(|o| o.id).collect();
        let expected: Vec<_> = ids.iter().rev().copied().collect();
        assert_eq!(listed, expected);

        let page = repo.list_by_user(&user, ListQuery::new(2, 1)).await.unwrap();
        let paged: Vec<_> = page.iter().map(|o| o.id).collect();
        assert_eq!(paged, vec![ids[3], ids[2]]);
    }
}
