use serde::{Deserialize, Serialize};

use smartstock_core::{DomainError, DomainResult, ProductId};

/// Validated catalog entry that has not been persisted yet.
///
/// The identifier is absent until the store assigns one; `into_product`
/// attaches it. All field invariants (non-empty name, positive price,
/// non-negative stock) are established here and preserved by every
/// [`Product`] mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDraft {
    name: String,
    price: f64,
    stock_quantity: i64,
}

impl ProductDraft {
    pub fn new(name: impl Into<String>, price: f64, stock_quantity: i64) -> DomainResult<Self> {
        let name = name.into();
        validate_name(&name)?;
        validate_price(price)?;
        if stock_quantity < 0 {
            return Err(DomainError::validation("stock quantity cannot be negative"));
        }
        Ok(Self {
            name,
            price,
            stock_quantity,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn stock_quantity(&self) -> i64 {
        self.stock_quantity
    }

    /// Attach the identifier assigned by the store.
    pub fn into_product(self, id: ProductId) -> Product {
        Product {
            id,
            name: self.name,
            price: self.price,
            stock_quantity: self.stock_quantity,
        }
    }
}

/// Catalog entry with a persisted identity.
///
/// Mutation goes through Result-returning methods so every call site handles
/// the failure path; there are no silently-raising setters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    id: ProductId,
    name: String,
    price: f64,
    stock_quantity: i64,
}

impl Product {
    /// Rebuild a product from stored fields (e.g. a database row).
    ///
    /// Runs the same validation as [`ProductDraft::new`], so a corrupt row
    /// surfaces as a validation error instead of an invalid entity.
    pub fn from_stored(
        id: ProductId,
        name: impl Into<String>,
        price: f64,
        stock_quantity: i64,
    ) -> DomainResult<Self> {
        Ok(ProductDraft::new(name, price, stock_quantity)?.into_product(id))
    }

    pub fn id(&self) -> ProductId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn stock_quantity(&self) -> i64 {
        self.stock_quantity
    }

    pub fn rename(&mut self, name: impl Into<String>) -> DomainResult<()> {
        let name = name.into();
        validate_name(&name)?;
        self.name = name;
        Ok(())
    }

    pub fn set_price(&mut self, price: f64) -> DomainResult<()> {
        validate_price(price)?;
        self.price = price;
        Ok(())
    }

    /// Replace the stock level absolutely (administrative correction, not a
    /// sale or restock).
    pub fn set_stock(&mut self, quantity: i64) -> DomainResult<()> {
        if quantity < 0 {
            return Err(DomainError::validation("stock quantity cannot be negative"));
        }
        self.stock_quantity = quantity;
        Ok(())
    }

    pub fn increase_stock(&mut self, quantity: i64) -> DomainResult<()> {
        if quantity <= 0 {
            return Err(DomainError::validation("quantity must be positive"));
        }
        self.stock_quantity = self
            .stock_quantity
            .checked_add(quantity)
            .ok_or_else(|| DomainError::validation("stock quantity would overflow"))?;
        Ok(())
    }

    /// Decrement stock by `quantity`.
    ///
    /// Fails with [`DomainError::InsufficientStock`] when the requested
    /// quantity exceeds what is available; the entity is left untouched on
    /// any failure.
    pub fn reduce_stock(&mut self, quantity: i64) -> DomainResult<()> {
        if quantity <= 0 {
            return Err(DomainError::validation("quantity must be positive"));
        }
        if quantity > self.stock_quantity {
            return Err(DomainError::insufficient_stock(quantity, self.stock_quantity));
        }
        self.stock_quantity -= quantity;
        Ok(())
    }
}

/// Field-level patch for a catalog entry; `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub stock_quantity: Option<i64>,
}

impl ProductPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.price.is_none() && self.stock_quantity.is_none()
    }
}

fn validate_name(name: &str) -> DomainResult<()> {
    if name.trim().is_empty() {
        return Err(DomainError::validation("name cannot be empty"));
    }
    Ok(())
}

fn validate_price(price: f64) -> DomainResult<()> {
    if !price.is_finite() || price <= 0.0 {
        return Err(DomainError::validation("price must be greater than zero"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_product(price: f64, stock: i64) -> Product {
        ProductDraft::new("Test Product", price, stock)
            .unwrap()
            .into_product(ProductId::new(1))
    }

    #[test]
    fn draft_rejects_empty_name() {
        let err = ProductDraft::new("   ", 9.99, 3).unwrap_err();
        match err {
            DomainError::Validation(_) => {}
            _ => panic!("Expected Validation error for empty name"),
        }
    }

    #[test]
    fn draft_rejects_non_positive_price() {
        assert!(ProductDraft::new("Milk", 0.0, 3).is_err());
        assert!(ProductDraft::new("Milk", -1.5, 3).is_err());
        assert!(ProductDraft::new("Milk", f64::NAN, 3).is_err());
    }

    #[test]
    fn draft_rejects_negative_stock() {
        let err = ProductDraft::new("Milk", 9.99, -1).unwrap_err();
        match err {
            DomainError::Validation(_) => {}
            _ => panic!("Expected Validation error for negative stock"),
        }
    }

    #[test]
    fn draft_into_product_preserves_fields() {
        let product = test_product(30.0, 12);
        assert_eq!(product.id(), ProductId::new(1));
        assert_eq!(product.name(), "Test Product");
        assert_eq!(product.price(), 30.0);
        assert_eq!(product.stock_quantity(), 12);
    }

    #[test]
    fn reduce_stock_decrements() {
        let mut product = test_product(10.0, 8);
        product.reduce_stock(3).unwrap();
        assert_eq!(product.stock_quantity(), 5);
    }

    #[test]
    fn reduce_stock_rejects_non_positive_quantity() {
        let mut product = test_product(10.0, 8);
        assert!(product.reduce_stock(0).is_err());
        assert!(product.reduce_stock(-2).is_err());
        assert_eq!(product.stock_quantity(), 8);
    }

    #[test]
    fn reduce_stock_beyond_available_is_insufficient_stock() {
        let mut product = test_product(10.0, 4);
        let err = product.reduce_stock(5).unwrap_err();
        match err {
            DomainError::InsufficientStock {
                requested,
                available,
            } => {
                assert_eq!(requested, 5);
                assert_eq!(available, 4);
            }
            _ => panic!("Expected InsufficientStock error"),
        }
        // Failed reduction leaves the entity untouched.
        assert_eq!(product.stock_quantity(), 4);
    }

    #[test]
    fn increase_stock_rejects_non_positive_quantity() {
        let mut product = test_product(10.0, 8);
        assert!(product.increase_stock(0).is_err());
        assert!(product.increase_stock(-1).is_err());
        assert_eq!(product.stock_quantity(), 8);
    }

    #[test]
    fn increase_stock_rejects_overflow() {
        let mut product = test_product(10.0, i64::MAX - 1);
        let err = product.increase_stock(2).unwrap_err();
        match err {
            DomainError::Validation(_) => {}
            _ => panic!("Expected Validation error for overflow"),
        }
        assert_eq!(product.stock_quantity(), i64::MAX - 1);

        product.increase_stock(1).unwrap();
        assert_eq!(product.stock_quantity(), i64::MAX);
    }

    #[test]
    fn set_stock_replaces_absolutely() {
        let mut product = test_product(10.0, 8);
        product.set_stock(0).unwrap();
        assert_eq!(product.stock_quantity(), 0);
        assert!(product.set_stock(-1).is_err());
        assert_eq!(product.stock_quantity(), 0);
    }

    #[test]
    fn set_price_enforces_positive_price() {
        let mut product = test_product(10.0, 8);
        assert!(product.set_price(0.0).is_err());
        assert!(product.set_price(-4.5).is_err());
        assert_eq!(product.price(), 10.0);
        product.set_price(12.5).unwrap();
        assert_eq!(product.price(), 12.5);
    }

    #[test]
    fn rename_rejects_whitespace_only() {
        let mut product = test_product(10.0, 8);
        assert!(product.rename("  \t ").is_err());
        assert_eq!(product.name(), "Test Product");
    }

    #[test]
    fn empty_patch_is_empty() {
        assert!(ProductPatch::default().is_empty());
        let patch = ProductPatch {
            price: Some(2.0),
            ..ProductPatch::default()
        };
        assert!(!patch.is_empty());
    }

    #[cfg(test)]
    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: reduce followed by increase of the same quantity
            /// restores the original stock level.
            #[test]
            fn reduce_then_increase_restores_stock(
                stock in 1i64..10_000,
                quantity in 1i64..10_000
            ) {
                prop_assume!(quantity <= stock);
                let mut product = test_product(5.0, stock);
                product.reduce_stock(quantity).unwrap();
                product.increase_stock(quantity).unwrap();
                prop_assert_eq!(product.stock_quantity(), stock);
            }

            /// Property: stock never goes negative, whatever the requested
            /// reduction.
            #[test]
            fn stock_never_negative(
                stock in 0i64..10_000,
                quantity in 1i64..20_000
            ) {
                let mut product = ProductDraft::new("P", 1.0, stock)
                    .unwrap()
                    .into_product(ProductId::new(1));
                let _ = product.reduce_stock(quantity);
                prop_assert!(product.stock_quantity() >= 0);
            }

            /// Property: a failed reduction is a no-op on the entity.
            #[test]
            fn failed_reduce_leaves_stock_unchanged(
                stock in 0i64..100,
                excess in 1i64..100
            ) {
                let mut product = ProductDraft::new("P", 1.0, stock)
                    .unwrap()
                    .into_product(ProductId::new(1));
                let before = product.stock_quantity();
                prop_assert!(product.reduce_stock(stock + excess).is_err());
                prop_assert_eq!(product.stock_quantity(), before);
            }
        }
    }
}
