//! Stock catalog contract and in-memory implementation.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use domain::{Money, ProductId};
use thiserror::Error;
use tokio::time::error::Elapsed;

/// Price and stock of a product at the moment it was read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductSnapshot {
    pub product_id: ProductId,
    pub unit_price: Money,
    /// Advisory only; the authoritative check happens in `adjust_stock`.
    pub stock: i64,
}

/// Failures reported by a stock catalog.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("product not found: {0}")]
    NotFound(ProductId),

    #[error("adjusting stock of {product_id} by {delta} would go below zero")]
    InsufficientStock { product_id: ProductId, delta: i64 },

    #[error("catalog unavailable: {0}")]
    Unavailable(String),

    #[error("malformed catalog response: {0}")]
    Malformed(String),
}

impl From<Elapsed> for CatalogError {
    fn from(_: Elapsed) -> Self {
        CatalogError::Unavailable("catalog call timed out".to_string())
    }
}

/// Read prices and move stock in the product catalog.
#[async_trait]
pub trait StockCatalogClient: Send + Sync {
    /// Reads the current price and stock of a product.
    async fn fetch_snapshot(&self, product_id: &ProductId) -> Result<ProductSnapshot, CatalogError>;

    /// Adds `delta` to the product's stock. Negative deltas reserve, positive
    /// deltas release. Fails with `InsufficientStock` when the result would be
    /// negative, leaving the stock unchanged.
    async fn adjust_stock(&self, product_id: &ProductId, delta: i64) -> Result<(), CatalogError>;
}

#[async_trait]
impl<T: StockCatalogClient + ?Sized> StockCatalogClient for Arc<T> {
    async fn fetch_snapshot(&self, product_id: &ProductId) -> Result<ProductSnapshot, CatalogError> {
        (**self).fetch_snapshot(product_id).await
    }

    async fn adjust_stock(&self, product_id: &ProductId, delta: i64) -> Result<(), CatalogError> {
        (**self).adjust_stock(product_id, delta).await
    }
}

#[derive(Debug, Default)]
struct InMemoryCatalogState {
    products: HashMap<ProductId, (Money, i64)>,
    adjustments: Vec<(ProductId, i64)>,
    calls: usize,
    unavailable: bool,
    fail_on_reserve: HashSet<ProductId>,
    fail_on_release: HashSet<ProductId>,
    latency: Option<Duration>,
}

/// In-memory stock catalog for testing.
///
/// Adjustments are applied under a single write lock, so a decrement either
/// fully succeeds or leaves the stock untouched.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStockCatalog {
    state: Arc<RwLock<InMemoryCatalogState>>,
}

impl InMemoryStockCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of `add_product`.
    pub fn with_product(self, product_id: impl Into<ProductId>, unit_price: Money, stock: i64) -> Self {
        self.add_product(product_id, unit_price, stock);
        self
    }

    /// Inserts or replaces a product.
    pub fn add_product(&self, product_id: impl Into<ProductId>, unit_price: Money, stock: i64) {
        self.state
            .write()
            .unwrap()
            .products
            .insert(product_id.into(), (unit_price, stock));
    }

    /// Removes a product, as if it were deleted from the catalog.
    pub fn remove_product(&self, product_id: &ProductId) {
        self.state.write().unwrap().products.remove(product_id);
    }

    /// Changes the price without touching stock.
    pub fn set_price(&self, product_id: &ProductId, unit_price: Money) {
        if let Some(entry) = self.state.write().unwrap().products.get_mut(product_id) {
            entry.0 = unit_price;
        }
    }

    /// Returns the current stock of a product.
    pub fn stock(&self, product_id: impl Into<ProductId>) -> Option<i64> {
        let product_id = product_id.into();
        self.state
            .read()
            .unwrap()
            .products
            .get(&product_id)
            .map(|(_, stock)| *stock)
    }

    /// Makes every call fail with `Unavailable`.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.state.write().unwrap().unavailable = unavailable;
    }

    /// Makes stock decrements for the product fail with `Unavailable`.
    pub fn set_fail_on_reserve(&self, product_id: impl Into<ProductId>) {
        self.state
            .write()
            .unwrap()
            .fail_on_reserve
            .insert(product_id.into());
    }

    /// Makes stock increments for the product fail with `Unavailable`.
    pub fn set_fail_on_release(&self, product_id: impl Into<ProductId>) {
        self.state
            .write()
            .unwrap()
            .fail_on_release
            .insert(product_id.into());
    }

    /// Delays every call by the given duration.
    pub fn set_latency(&self, latency: Duration) {
        self.state.write().unwrap().latency = Some(latency);
    }

    /// Successful adjustments, in the order they were applied.
    pub fn adjustments(&self) -> Vec<(ProductId, i64)> {
        self.state.read().unwrap().adjustments.clone()
    }

    /// Total number of calls received, successful or not.
    pub fn call_count(&self) -> usize {
        self.state.read().unwrap().calls
    }

    async fn enter(&self) -> Result<(), CatalogError> {
        let latency = {
            let mut state = self.state.write().unwrap();
            state.calls += 1;
            state.latency
        };
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        if self.state.read().unwrap().unavailable {
            return Err(CatalogError::Unavailable("catalog offline".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl StockCatalogClient for InMemoryStockCatalog {
    async fn fetch_snapshot(&self, product_id: &ProductId) -> Result<ProductSnapshot, CatalogError> {
        self.enter().await?;
        let state = self.state.read().unwrap();
        let (unit_price, stock) = state
            .products
            .get(product_id)
            .ok_or_else(|| CatalogError::NotFound(product_id.clone()))?;
        Ok(ProductSnapshot {
            product_id: product_id.clone(),
            unit_price: *unit_price,
            stock: *stock,
        })
    }

    async fn adjust_stock(&self, product_id: &ProductId, delta: i64) -> Result<(), CatalogError> {
        self.enter().await?;
        let mut state = self.state.write().unwrap();

        let failing = if delta < 0 {
            &state.fail_on_reserve
        } else {
            &state.fail_on_release
        };
        if failing.contains(product_id) {
            return Err(CatalogError::Unavailable(format!(
                "stock write for {product_id} rejected"
            )));
        }

        let stock = state
            .products
            .get_mut(product_id)
            .map(|(_, stock)| stock)
            .ok_or_else(|| CatalogError::NotFound(product_id.clone()))?;
        let next = *stock + delta;
        if next < 0 {
            return Err(CatalogError::InsufficientStock {
                product_id: product_id.clone(),
                delta,
            });
        }
        *stock = next;
        state.adjustments.push((product_id.clone(), delta));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn price(cents: i32) -> Money {
        Money::from_cents(cents)
    }

    #[tokio::test]
    async fn test_snapshot_reports_price_and_stock() {
        let catalog = InMemoryStockCatalog::new().with_product("P1", price(1500), 5);

        let snapshot = catalog.fetch_snapshot(&ProductId::new("P1")).await.unwrap();

        assert_eq!(snapshot.unit_price, price(1500));
        assert_eq!(snapshot.stock, 5);
        assert_eq!(catalog.call_count(), 1);
    }

    #[tokio::test]
    async fn test_unknown_product_is_not_found() {
        let catalog = InMemoryStockCatalog::new();
        let err = catalog
            .fetch_snapshot(&ProductId::new("missing"))
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_decrement_below_zero_leaves_stock_untouched() {
        let catalog = InMemoryStockCatalog::new().with_product("P1", price(100), 1);
        let p1 = ProductId::new("P1");

        let err = catalog.adjust_stock(&p1, -2).await.unwrap_err();

        assert!(matches!(err, CatalogError::InsufficientStock { delta: -2, .. }));
        assert_eq!(catalog.stock("P1"), Some(1));
        assert!(catalog.adjustments().is_empty());
    }

    #[tokio::test]
    async fn test_release_failure_only_affects_increments() {
        let catalog = InMemoryStockCatalog::new().with_product("P1", price(100), 3);
        catalog.set_fail_on_release("P1");
        let p1 = ProductId::new("P1");

        catalog.adjust_stock(&p1, -1).await.unwrap();
        let err = catalog.adjust_stock(&p1, 1).await.unwrap_err();

        assert!(matches!(err, CatalogError::Unavailable(_)));
        assert_eq!(catalog.stock("P1"), Some(2));
        assert_eq!(catalog.adjustments(), vec![(p1, -1)]);
    }

    #[tokio::test]
    async fn test_unavailable_catalog_counts_calls() {
        let catalog = InMemoryStockCatalog::new().with_product("P1", price(100), 3);
        catalog.set_unavailable(true);

        let err = catalog.fetch_snapshot(&ProductId::new("P1")).await.unwrap_err();

        assert!(matches!(err, CatalogError::Unavailable(_)));
        assert_eq!(catalog.call_count(), 1);
    }
}
