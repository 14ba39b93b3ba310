//! Order and line item records.

use chrono::{DateTime, Utc};
use common::{LineItemId, OrderId};
use serde::{Deserialize, Serialize};

use super::{Money, OrderError, OrderStatus, ProductId, UserId};

/// An order header as stored by the order repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub status: OrderStatus,
    /// Sum of `quantity × price` over the order's items.
    pub total: Money,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A single line of an order with its unit price frozen at creation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLineItem {
    pub id: LineItemId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: u32,
    /// Unit price captured from the catalog; never refreshed afterwards.
    #[serde(rename = "price")]
    pub unit_price: Money,
}

impl OrderLineItem {
    /// Returns `quantity × unit_price`, or `None` when it is out of range.
    pub fn line_total(&self) -> Option<Money> {
        self.unit_price.checked_mul(self.quantity)
    }
}

/// A reserved line whose price has been read from the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedLine {
    pub product_id: ProductId,
    pub quantity: u32,
    pub unit_price: Money,
}

impl PricedLine {
    /// Creates a priced line.
    pub fn new(product_id: ProductId, quantity: u32, unit_price: Money) -> Self {
        Self {
            product_id,
            quantity,
            unit_price,
        }
    }

    /// Returns `quantity × unit_price`, or `None` when it is out of range.
    pub fn line_total(&self) -> Option<Money> {
        self.unit_price.checked_mul(self.quantity)
    }
}

/// An order together with its line items, persisted and read as one unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub order: Order,
    pub items: Vec<OrderLineItem>,
}

impl OrderRecord {
    /// Builds a new pending order from priced lines, in the order given.
    pub fn pending(
        user_id: UserId,
        lines: Vec<PricedLine>,
        now: DateTime<Utc>,
    ) -> Result<Self, OrderError> {
        let order_id = OrderId::new();
        let total = sum_totals(lines.iter().map(PricedLine::line_total))
            .ok_or(OrderError::AmountOutOfRange)?;
        let items = lines
            .into_iter()
            .map(|line| OrderLineItem {
                id: LineItemId::new(),
                order_id,
                product_id: line.product_id,
                quantity: line.quantity,
                unit_price: line.unit_price,
            })
            .collect();

        Ok(Self {
            order: Order {
                id: order_id,
                user_id,
                status: OrderStatus::Pending,
                total,
                created_at: now,
                updated_at: now,
            },
            items,
        })
    }

    /// Returns the order's ID.
    pub fn id(&self) -> OrderId {
        self.order.id
    }

    /// Recomputes the total from the line items.
    pub fn computed_total(&self) -> Option<Money> {
        sum_totals(self.items.iter().map(OrderLineItem::line_total))
    }

    /// Returns true if the stored total matches the line items and every item
    /// points back at this order.
    pub fn is_consistent(&self) -> bool {
        self.computed_total() == Some(self.order.total)
            && self.items.iter().all(|item| item.order_id == self.order.id)
    }
}

fn sum_totals(totals: impl Iterator<Item = Option<Money>>) -> Option<Money> {
    totals.fold(Some(Money::zero()), |acc, line| acc?.checked_add(line?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(product: &str, quantity: u32, cents: i32) -> PricedLine {
        PricedLine::new(ProductId::new(product), quantity, Money::from_cents(cents))
    }

    #[test]
    fn test_pending_record_totals_its_lines() {
        let record = OrderRecord::pending(
            UserId::from("U1"),
            vec![line("P1", 2, 1500), line("P2", 3, 333)],
            Utc::now(),
        )
        .unwrap();

        assert_eq!(record.order.status, OrderStatus::Pending);
        assert_eq!(record.order.total.to_string(), "39.99");
        assert_eq!(record.items.len(), 2);
        assert!(record.is_consistent());
        assert_eq!(record.order.created_at, record.order.updated_at);
    }

    #[test]
    fn test_pending_record_keeps_duplicate_products_separate() {
        let record = OrderRecord::pending(
            UserId::from("U1"),
            vec![line("P1", 1, 1000), line("P1", 2, 1000)],
            Utc::now(),
        )
        .unwrap();

        assert_eq!(record.items.len(), 2);
        assert_ne!(record.items[0].id, record.items[1].id);
        assert_eq!(record.order.total, Money::from_cents(3000));
    }

    #[test]
    fn test_tampered_total_is_inconsistent() {
        let mut record =
            OrderRecord::pending(UserId::from("U1"), vec![line("P1", 2, 1500)], Utc::now())
                .unwrap();
        record.order.total = Money::from_cents(1);
        assert!(!record.is_consistent());
    }

    #[test]
    fn test_line_item_serializes_frozen_price_as_text() {
        let record =
            OrderRecord::pending(UserId::from("U1"), vec![line("P1", 2, 1500)], Utc::now())
                .unwrap();
        let json = serde_json::to_value(&record.items[0]).unwrap();
        assert_eq!(json["price"], "15.00");
        assert_eq!(json["quantity"], 2);
        assert_eq!(json["order_id"], record.id().to_string());
    }

    #[test]
    fn test_pending_record_rejects_totals_beyond_the_money_range() {
        let big = PricedLine::new(ProductId::new("P1"), 1, "600000000000.00".parse().unwrap());
        assert_eq!(big.line_total(), Some(big.unit_price));

        let result =
            OrderRecord::pending(UserId::from("U1"), vec![big.clone(), big], Utc::now());
        assert_eq!(result, Err(OrderError::AmountOutOfRange));

        let overflowing =
            PricedLine::new(ProductId::new("P2"), u32::MAX, Money::from_cents(i32::MAX));
        assert_eq!(overflowing.line_total(), None);
    }
}
