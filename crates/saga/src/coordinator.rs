//! Saga coordinator for order creation and status transitions.

use std::future::Future;
use std::time::{Duration, Instant};

use chrono::Utc;
use common::OrderId;
use domain::{
    Money, Order, OrderLine, OrderLineItem, OrderRecord, OrderStatus, PlaceOrder, PricedLine,
    StatusChange, UserId,
};
use order_store::{ListQuery, OrderRepository};
use tokio::time::error::Elapsed;

use crate::error::SagaError;
use crate::reservation::{CompensationReport, ReservationLog};
use crate::services::{IdentityError, IdentityValidator, StockCatalogClient};
use crate::steps;

/// Upper bound applied to every collaborator call unless overridden.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(5);

/// Orchestrates order creation across the identity service, the product
/// catalog and the order repository.
///
/// Creation validates the user, then reserves stock item by item at the
/// price read just before the reservation. A failure at any point releases
/// the reservations made so far in reverse order. Release failures are logged
/// and counted but never replace the original error.
pub struct OrderSaga<R, I, C>
where
    R: OrderRepository,
    I: IdentityValidator,
    C: StockCatalogClient,
{
    orders: R,
    identity: I,
    catalog: C,
    call_timeout: Duration,
}

impl<R, I, C> OrderSaga<R, I, C>
where
    R: OrderRepository,
    I: IdentityValidator,
    C: StockCatalogClient,
{
    /// Creates a new saga coordinator with the default call timeout.
    pub fn new(orders: R, identity: I, catalog: C) -> Self {
        Self {
            orders,
            identity,
            catalog,
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }

    /// Overrides the timeout applied to each collaborator call.
    pub fn with_call_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    pub fn call_timeout(&self) -> Duration {
        self.call_timeout
    }

    /// Creates a pending order.
    ///
    /// On success every item's stock has been decremented and the order and
    /// its items are stored. On failure no reservation made by this call
    /// remains applied, except where a release itself failed.
    #[tracing::instrument(
        skip(self, request),
        fields(saga_type = steps::SAGA_TYPE, user_id = %request.user_id, items = request.items.len())
    )]
    pub async fn create_order(&self, request: PlaceOrder) -> Result<OrderRecord, SagaError> {
        metrics::counter!("order_saga_executions_total").increment(1);
        let saga_start = Instant::now();

        let result = self.run_creation(&request).await;

        let duration = saga_start.elapsed().as_secs_f64();
        metrics::histogram!("order_saga_duration_seconds").record(duration);
        match &result {
            Ok(record) => {
                metrics::counter!("orders_created_total").increment(1);
                tracing::info!(
                    order_id = %record.id(),
                    total = %record.order.total,
                    duration,
                    "order created"
                );
            }
            Err(e) => {
                metrics::counter!("order_creation_failed_total", "reason" => e.kind())
                    .increment(1);
                tracing::warn!(error = %e, kind = e.kind(), duration, "order creation failed");
            }
        }
        result
    }

    async fn run_creation(&self, request: &PlaceOrder) -> Result<OrderRecord, SagaError> {
        // 1. Reject malformed input before any remote call
        let order = request.validate()?;

        // 2. Confirm the user exists
        self.check_identity(&order.user_id).await?;

        // 3. Reserve stock item by item, freezing each price
        let mut log = ReservationLog::new();
        let mut lines = Vec::with_capacity(order.items.len());
        let mut total = Money::zero();
        for line in &order.items {
            match self.reserve_line(line, total).await {
                Ok((priced, running_total)) => {
                    log.record(priced.product_id.clone(), priced.quantity);
                    total = running_total;
                    lines.push(priced);
                }
                Err(e) => {
                    self.compensate(log, steps::STEP_RESERVE_STOCK).await;
                    return Err(e);
                }
            }
        }

        // 4. Persist
        let record = match OrderRecord::pending(order.user_id, lines, Utc::now()) {
            Ok(record) => record,
            Err(e) => {
                self.compensate(log, steps::STEP_PERSIST_ORDER).await;
                return Err(e.into());
            }
        };
        debug_assert_eq!(record.order.total, total);

        tracing::info!(step = steps::STEP_PERSIST_ORDER, order_id = %record.id(), "saga step started");
        if let Err(e) = self.bounded(self.orders.create(&record)).await {
            tracing::error!(order_id = %record.id(), error = %e, "failed to persist order");
            self.compensate(log, steps::STEP_PERSIST_ORDER).await;
            return Err(SagaError::Persistence(e.to_string()));
        }

        Ok(record)
    }

    async fn check_identity(&self, user_id: &UserId) -> Result<(), SagaError> {
        tracing::debug!(step = steps::STEP_VALIDATE_USER, %user_id, "saga step started");
        match self.bounded(self.identity.validate(user_id)).await {
            Ok(true) => Ok(()),
            Ok(false) => {
                metrics::counter!("identity_check_failures_total", "kind" => "unknown_user")
                    .increment(1);
                tracing::warn!(%user_id, "user not recognised by identity service");
                Err(SagaError::InvalidUser {
                    user_id: user_id.clone(),
                })
            }
            Err(e) => {
                let kind = match e {
                    IdentityError::Unavailable(_) => "unavailable",
                    IdentityError::Rejected(_) => "rejected",
                };
                metrics::counter!("identity_check_failures_total", "kind" => kind).increment(1);
                tracing::error!(%user_id, error = %e, "identity check failed");
                Err(SagaError::InvalidUser {
                    user_id: user_id.clone(),
                })
            }
        }
    }

    /// Reserves one line and returns it with the order total including it.
    ///
    /// The line total and running total are computed from the frozen price
    /// before the stock decrement, so an unrepresentable amount never leaves
    /// a reservation behind.
    async fn reserve_line(
        &self,
        line: &OrderLine,
        total: Money,
    ) -> Result<(PricedLine, Money), SagaError> {
        let product_id = &line.product_id;

        let snapshot = self
            .bounded(self.catalog.fetch_snapshot(product_id))
            .await?;
        tracing::debug!(
            step = steps::STEP_RESERVE_STOCK,
            %product_id,
            unit_price = %snapshot.unit_price,
            stock = snapshot.stock,
            quantity = line.quantity,
            "reserving stock"
        );

        let priced = PricedLine::new(product_id.clone(), line.quantity, snapshot.unit_price);
        let running_total = priced
            .line_total()
            .and_then(|line_total| total.checked_add(line_total))
            .ok_or_else(|| SagaError::AmountOutOfRange {
                product_id: product_id.clone(),
            })?;

        self.bounded(self.catalog.adjust_stock(product_id, -i64::from(line.quantity)))
            .await?;

        Ok((priced, running_total))
    }

    /// Releases every logged reservation, newest first.
    async fn compensate(&self, log: ReservationLog, failed_step: &'static str) -> CompensationReport {
        let mut report = CompensationReport::default();
        if log.is_empty() {
            return report;
        }
        tracing::warn!(
            failed_step,
            reservations = log.len(),
            "compensating stock reservations"
        );

        for reservation in log.into_compensation_order() {
            let delta = i64::from(reservation.quantity);
            match self
                .bounded(self.catalog.adjust_stock(&reservation.product_id, delta))
                .await
            {
                Ok(()) => {
                    metrics::counter!("stock_compensations_total", "outcome" => "restored")
                        .increment(1);
                    report.restored.push(reservation);
                }
                Err(e) => {
                    metrics::counter!("stock_compensations_total", "outcome" => "failed")
                        .increment(1);
                    tracing::error!(
                        product_id = %reservation.product_id,
                        quantity = reservation.quantity,
                        error = %e,
                        "failed to release reserved stock"
                    );
                    report.failed.push(reservation);
                }
            }
        }

        if !report.is_complete() {
            tracing::error!(
                failed_step,
                unreleased = report.failed.len(),
                "compensation incomplete; stock left reserved"
            );
        }
        report
    }

    /// Moves an order to the requested status.
    ///
    /// Requesting the current status returns the order unchanged without a
    /// write. Canceling a pending order returns each item's quantity to the
    /// catalog first; release failures are logged and do not block the change.
    #[tracing::instrument(skip(self, order_id), fields(saga_type = steps::STATUS_SAGA_TYPE, order_id = %order_id))]
    pub async fn update_status(
        &self,
        order_id: OrderId,
        requested: &str,
    ) -> Result<OrderRecord, SagaError> {
        let requested = OrderStatus::parse(requested)?;

        let current = self
            .bounded(self.orders.get(order_id))
            .await?
            .ok_or(SagaError::OrderNotFound(order_id))?;

        let StatusChange::Apply { from, to, restock } =
            current.order.status.plan_change(requested)?
        else {
            tracing::debug!(status = %requested, "status unchanged");
            return Ok(current);
        };

        if restock {
            self.restock(&current.items).await;
        }

        self.bounded(self.orders.update_status(order_id, to))
            .await?;
        metrics::counter!(
            "order_status_transitions_total",
            "from" => from.as_str(),
            "to" => to.as_str()
        )
        .increment(1);
        tracing::info!(%from, %to, restocked = restock, "order status updated");

        self.bounded(self.orders.get(order_id))
            .await?
            .ok_or(SagaError::OrderNotFound(order_id))
    }

    async fn restock(&self, items: &[OrderLineItem]) {
        tracing::info!(step = steps::STEP_RESTOCK, items = items.len(), "returning stock");
        for item in items {
            let delta = i64::from(item.quantity);
            if let Err(e) = self
                .bounded(self.catalog.adjust_stock(&item.product_id, delta))
                .await
            {
                metrics::counter!("stock_restock_failures_total").increment(1);
                tracing::error!(
                    product_id = %item.product_id,
                    quantity = item.quantity,
                    error = %e,
                    "failed to return stock for canceled order"
                );
            }
        }
    }

    /// Reads an order with its items.
    pub async fn get_order(&self, order_id: OrderId) -> Result<OrderRecord, SagaError> {
        self.bounded(self.orders.get(order_id))
            .await?
            .ok_or(SagaError::OrderNotFound(order_id))
    }

    /// Lists a user's orders, newest first.
    pub async fn list_orders(
        &self,
        user_id: &UserId,
        query: ListQuery,
    ) -> Result<Vec<Order>, SagaError> {
        Ok(self
            .bounded(self.orders.list_by_user(user_id, query))
            .await?)
    }

    /// Reads the items of an existing order.
    pub async fn order_items(&self, order_id: OrderId) -> Result<Vec<OrderLineItem>, SagaError> {
        self.get_order(order_id).await?;
        Ok(self.bounded(self.orders.get_items(order_id)).await?)
    }

    async fn bounded<T, E, F>(&self, call: F) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
        E: From<Elapsed>,
    {
        tokio::time::timeout(self.call_timeout, call).await?
    }
}

