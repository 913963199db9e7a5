//! Product catalog domain module.
//!
//! This crate contains business rules for catalog entries, implemented purely
//! as deterministic domain logic (no IO, no storage).

pub mod perishable;
pub mod product;

pub use perishable::Perishability;
pub use product::{Product, ProductDraft, ProductPatch};
