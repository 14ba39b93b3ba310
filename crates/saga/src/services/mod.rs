//! Collaborator contracts used by the order saga.
//!
//! Each contract has a network client for production and an in-memory
//! implementation for tests.

pub mod catalog;
pub mod grpc_identity;
pub mod http_catalog;
pub mod identity;

pub use catalog::{CatalogError, InMemoryStockCatalog, ProductSnapshot, StockCatalogClient};
pub use grpc_identity::GrpcIdentityValidator;
pub use http_catalog::HttpStockCatalogClient;
pub use identity::{IdentityError, IdentityValidator, InMemoryIdentityValidator};
