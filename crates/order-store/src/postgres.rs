use std::time::Duration;

use async_trait::async_trait;
use common::LineItemId;
use domain::{Money, Order, OrderLineItem, OrderRecord, OrderStatus, ProductId, UserId};
use sqlx::{PgPool, Row, postgres::{PgPoolOptions, PgRow}};
use uuid::Uuid;

use crate::{ListQuery, OrderId, Result, StoreError, store::OrderRepository};

const ORDER_COLUMNS: &str = "id, user_id, status, total::text AS total, created_at, updated_at";
const ITEM_COLUMNS: &str = "id, order_id, product_id, quantity, price::text AS price";

/// PostgreSQL-backed order repository.
#[derive(Clone)]
pub struct PostgresOrderRepository {
    pool: PgPool,
}

impl PostgresOrderRepository {
    /// Creates a new PostgreSQL order repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a connection pool for `database_url`.
    pub async fn connect(database_url: &str, acquire_timeout: Duration) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .acquire_timeout(acquire_timeout)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    fn row_to_order(row: &PgRow) -> Result<Order> {
        let status: String = row.try_get("status")?;
        let total: String = row.try_get("total")?;

        Ok(Order {
            id: OrderId::from_uuid(row.try_get::<Uuid, _>("id")?),
            user_id: UserId::from(row.try_get::<&str, _>("user_id")?),
            status: OrderStatus::parse(&status)
                .map_err(|e| StoreError::Corrupt(e.to_string()))?,
            total: total
                .parse::<Money>()
                .map_err(|e| StoreError::Corrupt(e.to_string()))?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn row_to_item(row: &PgRow) -> Result<OrderLineItem> {
        let quantity: i32 = row.try_get("quantity")?;
        let price: String = row.try_get("price")?;

        Ok(OrderLineItem {
            id: LineItemId::from_uuid(row.try_get::<Uuid, _>("id")?),
            order_id: OrderId::from_uuid(row.try_get::<Uuid, _>("order_id")?),
            product_id: ProductId::new(row.try_get::<String, _>("product_id")?),
            quantity: u32::try_from(quantity)
                .map_err(|_| StoreError::Corrupt(format!("negative quantity {quantity}")))?,
            unit_price: price
                .parse::<Money>()
                .map_err(|e| StoreError::Corrupt(e.to_string()))?,
        })
    }

    async fn fetch_items(&self, order_id: OrderId) -> Result<Vec<OrderLineItem>> {
        let rows = sqlx::query(&format!(
            "SELECT {ITEM_COLUMNS} FROM order_items WHERE order_id = $1 ORDER BY position ASC"
        ))
        .bind(order_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_item).collect()
    }
}

#[async_trait]
impl OrderRepository for PostgresOrderRepository {
    #[tracing::instrument(skip(self, record), fields(order_id = %record.order.id))]
    async fn create(&self, record: &OrderRecord) -> Result<()> {
        let order = &record.order;

        // Start a transaction
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO orders (id, user_id, status, total, created_at, updated_at)
            VALUES ($1, $2, $3, $4::numeric, $5, $6)
            "#,
        )
        .bind(order.id.as_uuid())
        .bind(order.user_id.as_str())
        .bind(order.status.as_str())
        .bind(order.total.to_string())
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.constraint() == Some("orders_pkey")
            {
                return StoreError::Duplicate(order.id);
            }
            StoreError::Database(e)
        })?;

        for (position, item) in record.items.iter().enumerate() {
            let quantity = i32::try_from(item.quantity)
                .map_err(|_| StoreError::Corrupt(format!("quantity {} too large", item.quantity)))?;

            sqlx::query(
                r#"
                INSERT INTO order_items (id, order_id, position, product_id, quantity, price)
                VALUES ($1, $2, $3, $4, $5, $6::numeric)
                "#,
            )
            .bind(item.id.as_uuid())
            .bind(order.id.as_uuid())
            .bind(position as i32)
            .bind(item.product_id.as_str())
            .bind(quantity)
            .bind(item.unit_price.to_string())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        metrics::counter!("order_store_writes_total", "op" => "create").increment(1);
        Ok(())
    }

    async fn get(&self, order_id: OrderId) -> Result<Option<OrderRecord>> {
        let row = sqlx::query(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"))
            .bind(order_id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let order = Self::row_to_order(&row)?;
        let items = self.fetch_items(order_id).await?;

        Ok(Some(OrderRecord { order, items }))
    }

    async fn list_by_user(&self, user_id: &UserId, query: ListQuery) -> Result<Vec<Order>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {ORDER_COLUMNS}
            FROM orders
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(user_id.as_str())
        .bind(query.limit())
        .bind(query.offset())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_order).collect()
    }

    #[tracing::instrument(skip(self))]
    async fn update_status(&self, order_id: OrderId, status: OrderStatus) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE orders
            SET status = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(order_id.as_uuid())
        .bind(status.as_str())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(order_id));
        }
        metrics::counter!("order_store_writes_total", "op" => "update_status").increment(1);
        Ok(())
    }

    async fn get_items(&self, order_id: OrderId) -> Result<Vec<OrderLineItem>> {
        self.fetch_items(order_id).await
    }
}
