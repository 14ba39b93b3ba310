//! Saga pattern implementation for order placement.
//!
//! An order touches three services that share no transaction: the identity
//! service (does the user exist), the product catalog (price and stock) and
//! the order repository. The order creation saga runs these steps:
//! 1. Validate the user
//! 2. For each item, in caller order: read the price, then reserve stock
//! 3. Persist the order and its items
//!
//! If a step fails, every stock reservation made so far is released in reverse
//! order. The same coordinator owns the status transition policy, which
//! releases stock when a pending order is canceled.

pub mod coordinator;
pub mod error;
pub mod reservation;
pub mod services;
pub mod steps;

pub use coordinator::{DEFAULT_CALL_TIMEOUT, OrderSaga};
pub use error::SagaError;
pub use reservation::{CompensationReport, Reservation, ReservationLog};
pub use services::{
    CatalogError, GrpcIdentityValidator, HttpStockCatalogClient, IdentityError,
    IdentityValidator, InMemoryIdentityValidator, InMemoryStockCatalog, ProductSnapshot,
    StockCatalogClient,
};
