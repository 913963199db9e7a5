//! Sales domain module.
//!
//! This crate contains the immutable sale record, implemented purely as
//! deterministic domain logic (no IO, no storage).

pub mod sale;

pub use sale::Sale;
