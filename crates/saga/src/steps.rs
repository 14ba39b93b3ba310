//! Saga and step names used in logs and metric labels.

/// The saga type identifier for order creation.
pub const SAGA_TYPE: &str = "OrderCreation";

/// The saga type identifier for order status transitions.
pub const STATUS_SAGA_TYPE: &str = "OrderStatusTransition";

/// Step name: Confirm the user exists.
pub const STEP_VALIDATE_USER: &str = "validate_user";

/// Step name: Read price and reserve stock for one item.
pub const STEP_RESERVE_STOCK: &str = "reserve_stock";

/// Step name: Store the order and its items.
pub const STEP_PERSIST_ORDER: &str = "persist_order";

/// Step name: Return a canceled order's items to the catalog.
pub const STEP_RESTOCK: &str = "restock";
