//! Business layer: the Store Manager.
//!
//! Owns the in-memory product cache and mediates every mutation so the
//! cached view and the durable store never diverge silently.

pub mod error;
pub mod manager;


pub use error::{ManagerError, ManagerResult};
pub use manager::{LOW_STOCK_THRESHOLD, StoreManager};
