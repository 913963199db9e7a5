use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use smartstock_core::{DomainError, DomainResult, ProductId, SaleId};

/// Immutable record of one sales transaction.
///
/// Created only as the result of a successful sale; never updated or
/// deleted. The timestamp is assigned by the store at insert time and
/// interpreted as UTC. Deleting a product does not cascade to its sales.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sale {
    id: SaleId,
    product_id: ProductId,
    quantity_sold: i64,
    sold_at: DateTime<Utc>,
}

impl Sale {
    pub fn new(
        id: SaleId,
        product_id: ProductId,
        quantity_sold: i64,
        sold_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if product_id.get() <= 0 {
            return Err(DomainError::validation("product_id must be positive"));
        }
        if quantity_sold <= 0 {
            return Err(DomainError::validation("quantity_sold must be positive"));
        }
        Ok(Self {
            id,
            product_id,
            quantity_sold,
            sold_at,
        })
    }

    pub fn id(&self) -> SaleId {
        self.id
    }

    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    pub fn quantity_sold(&self) -> i64 {
        self.quantity_sold
    }

    pub fn sold_at(&self) -> DateTime<Utc> {
        self.sold_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sale_preserves_fields() {
        let now = Utc::now();
        let sale = Sale::new(SaleId::new(7), ProductId::new(3), 2, now).unwrap();
        assert_eq!(sale.id(), SaleId::new(7));
        assert_eq!(sale.product_id(), ProductId::new(3));
        assert_eq!(sale.quantity_sold(), 2);
        assert_eq!(sale.sold_at(), now);
    }

    #[test]
    fn sale_rejects_non_positive_product_id() {
        let err = Sale::new(SaleId::new(1), ProductId::new(0), 2, Utc::now()).unwrap_err();
        match err {
            DomainError::Validation(_) => {}
            _ => panic!("Expected Validation error for product_id"),
        }
    }

    #[test]
    fn sale_rejects_non_positive_quantity() {
        assert!(Sale::new(SaleId::new(1), ProductId::new(3), 0, Utc::now()).is_err());
        assert!(Sale::new(SaleId::new(1), ProductId::new(3), -4, Utc::now()).is_err());
    }
}
