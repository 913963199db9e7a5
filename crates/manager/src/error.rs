//! Business-layer error model.

use thiserror::Error;

use smartstock_core::{DomainError, ProductId};
use smartstock_store::StoreError;

/// Result type used across the business layer.
pub type ManagerResult<T> = Result<T, ManagerError>;

/// Error surfaced by [`crate::StoreManager`] operations.
///
/// Nothing is retried or swallowed; the presentation layer decides how to
/// display each kind.
#[derive(Debug, Error)]
pub enum ManagerError {
    /// Validation or stock-invariant failure from the entities.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// The referenced product is unknown to the cache (or the store reported
    /// zero rows affected).
    #[error("product {0} not found")]
    ProductNotFound(ProductId),

    /// Persistence failure; the cache was left unchanged.
    #[error(transparent)]
    Storage(StoreError),

    /// The stock update was persisted but the sale row was not recorded:
    /// the product table and the sales log diverge until reconciled.
    #[error("sale for product {product_id} not recorded after stock update")]
    SalePartiallyRecorded {
        product_id: ProductId,
        #[source]
        source: StoreError,
    },
}

impl ManagerError {
    /// True for the insufficient-stock kind; sale flows branch on this.
    pub fn is_insufficient_stock(&self) -> bool {
        matches!(self, Self::Domain(DomainError::InsufficientStock { .. }))
    }
}

impl From<StoreError> for ManagerError {
    fn from(err: StoreError) -> Self {
        Self::Storage(err)
    }
}
