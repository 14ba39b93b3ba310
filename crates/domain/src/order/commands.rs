//! Order placement input and its validation.

use super::{OrderError, ProductId, UserId};

/// Largest quantity a single line may request; line quantities are stored as
/// Postgres `INTEGER`.
pub const MAX_QUANTITY: u32 = i32::MAX as u32;

/// An item as requested by the caller, before validation.
#[derive(Debug, Clone)]
pub struct RequestedItem {
    pub product_id: String,
    pub quantity: i64,
}

/// Request to place a new order.
#[derive(Debug, Clone)]
pub struct PlaceOrder {
    /// The user placing the order.
    pub user_id: String,

    /// Items in the order the caller supplied them.
    pub items: Vec<RequestedItem>,
}

impl PlaceOrder {
    /// Creates a new PlaceOrder request with no items.
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            items: Vec::new(),
        }
    }

    /// Appends an item to the request.
    pub fn item(mut self, product_id: impl Into<String>, quantity: i64) -> Self {
        self.items.push(RequestedItem {
            product_id: product_id.into(),
            quantity,
        });
        self
    }

    /// Checks the request shape without contacting any collaborator.
    pub fn validate(&self) -> Result<ValidatedOrder, OrderError> {
        let user_id = UserId::parse(&self.user_id).ok_or(OrderError::UserIdRequired)?;
        if self.items.is_empty() {
            return Err(OrderError::NoItems);
        }

        let items = self
            .items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                let product_id = ProductId::parse(&item.product_id)
                    .ok_or(OrderError::ProductIdRequired { index })?;
                let quantity = u32::try_from(item.quantity)
                    .ok()
                    .filter(|q| (1..=MAX_QUANTITY).contains(q))
                    .ok_or(OrderError::InvalidQuantity {
                        index,
                        quantity: item.quantity,
                    })?;
                Ok(OrderLine {
                    product_id,
                    quantity,
                })
            })
            .collect::<Result<Vec<_>, OrderError>>()?;

        Ok(ValidatedOrder { user_id, items })
    }
}

/// A validated line: non-blank product and a positive quantity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// A PlaceOrder request that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedOrder {
    pub user_id: UserId,
    pub items: Vec<OrderLine>,
}
