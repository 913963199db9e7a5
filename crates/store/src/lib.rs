//! Persistence layer: repository contracts, SQLite implementations, schema
//! bootstrap, and in-memory doubles for tests.
//!
//! The pool handle is constructed by the process entry point and injected
//! here; no module owns a connection factory.

pub mod error;
pub mod memory;
pub mod product_store;
pub mod sales_store;
pub mod schema;

pub use error::{StoreError, StoreResult};
pub use memory::{InMemoryProductStore, InMemorySalesStore};
pub use product_store::{ProductRow, ProductStore, SqliteProductStore};
pub use sales_store::{SaleRow, SalesStore, SqliteSalesStore};
pub use schema::init_schema;
