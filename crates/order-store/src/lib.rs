pub mod error;
pub mod memory;
pub mod postgres;
pub mod query;
pub mod store;

pub use common::OrderId;
pub use error::{Result, StoreError};
pub use memory::InMemoryOrderRepository;
pub use postgres::PostgresOrderRepository;
pub use query::ListQuery;
pub use store::OrderRepository;
