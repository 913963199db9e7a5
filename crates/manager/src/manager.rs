use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use tracing::instrument;

use smartstock_catalog::{Product, ProductDraft, ProductPatch};
use smartstock_core::{DomainError, ProductId, SaleId};
use smartstock_sales::Sale;
use smartstock_store::{ProductRow, ProductStore, SaleRow, SalesStore, StoreError};

use crate::error::{ManagerError, ManagerResult};

/// Stock level below which a product is reported by the low-stock query.
/// The boundary is exclusive: stock equal to the threshold is not low.
pub const LOW_STOCK_THRESHOLD: i64 = 5;

/// Write-through product cache over the durable stores.
///
/// The cache is loaded once at startup and is the only read path for product
/// queries. Consistency contract: **persist first, then mutate the cache**.
/// Every mutation is applied to a clone of the cached entity and the clone is
/// committed only after the store accepted the write, so a storage failure
/// never leaves a phantom or diverged entry. The one operation spanning both
/// stores, [`StoreManager::process_sale`], surfaces a distinct
/// [`ManagerError::SalePartiallyRecorded`] kind instead of diverging
/// silently.
///
/// Keys are monotonically assigned rowids, so the map's id order equals
/// insertion order.
pub struct StoreManager<P, S> {
    products: BTreeMap<ProductId, Product>,
    product_store: P,
    sales_store: S,
}

impl<P, S> StoreManager<P, S>
where
    P: ProductStore,
    S: SalesStore,
{
    /// Load the full catalog into memory. Called once at startup; the
    /// stores are injected by the process entry point.
    pub async fn load(product_store: P, sales_store: S) -> ManagerResult<Self> {
        let rows = product_store.fetch_all().await?;
        let mut products = BTreeMap::new();
        for row in rows {
            let product = product_from_row(row)?;
            products.insert(product.id(), product);
        }
        tracing::info!(count = products.len(), "catalog loaded");
        Ok(Self {
            products,
            product_store,
            sales_store,
        })
    }

    /// Cached lookup; no store access.
    pub fn product(&self, id: ProductId) -> Option<&Product> {
        self.products.get(&id)
    }

    /// Products with stock strictly below [`LOW_STOCK_THRESHOLD`], in the
    /// cache's id order.
    pub fn low_stock_products(&self) -> Vec<&Product> {
        self.products
            .values()
            .filter(|p| p.stock_quantity() < LOW_STOCK_THRESHOLD)
            .collect()
    }

    /// All cached products, ascending by price. The sort is stable: equal
    /// prices keep their encounter order.
    pub fn products_by_price(&self) -> Vec<&Product> {
        let mut all: Vec<&Product> = self.products.values().collect();
        all.sort_by(|a, b| a.price().total_cmp(&b.price()));
        all
    }

    /// All cached products, ascending by stock quantity (stable).
    pub fn products_by_stock(&self) -> Vec<&Product> {
        let mut all: Vec<&Product> = self.products.values().collect();
        all.sort_by_key(|p| p.stock_quantity());
        all
    }

    /// Validate, persist to obtain the identifier, then insert into the
    /// cache. A validation or storage failure leaves the cache unchanged.
    #[instrument(skip(self), err)]
    pub async fn add_product(
        &mut self,
        name: &str,
        price: f64,
        stock_quantity: i64,
    ) -> ManagerResult<&Product> {
        let draft = ProductDraft::new(name, price, stock_quantity)?;
        let id = self.product_store.insert(&draft).await?;
        tracing::info!(%id, "product added");
        Ok(self.commit(draft.into_product(id)))
    }

    /// Apply the supplied fields through the entity's validated setters on a
    /// clone, persist the row, then commit the clone into the cache.
    #[instrument(skip(self, patch), err)]
    pub async fn update_product(
        &mut self,
        id: ProductId,
        patch: ProductPatch,
    ) -> ManagerResult<&Product> {
        if patch.is_empty() {
            return Err(DomainError::validation("no fields supplied for update").into());
        }
        let current = self
            .products
            .get(&id)
            .ok_or(ManagerError::ProductNotFound(id))?;

        // Entity invariants are enforced before any persistence attempt.
        let mut updated = current.clone();
        if let Some(name) = &patch.name {
            updated.rename(name.clone())?;
        }
        if let Some(price) = patch.price {
            updated.set_price(price)?;
        }
        if let Some(stock) = patch.stock_quantity {
            updated.set_stock(stock)?;
        }

        self.persist_or_not_found(id, self.product_store.update_fields(id, &patch).await)?;
        Ok(self.commit(updated))
    }

    /// Persist the deletion, then drop the cache entry.
    #[instrument(skip(self), err)]
    pub async fn delete_product(&mut self, id: ProductId) -> ManagerResult<()> {
        if !self.products.contains_key(&id) {
            return Err(ManagerError::ProductNotFound(id));
        }
        match self.product_store.delete(id).await {
            Ok(()) => {}
            Err(StoreError::RowNotFound) => {
                // The row was already gone; drop the stale cache entry too.
                tracing::warn!(%id, "cached product had no row in the store");
                self.products.remove(&id);
                return Err(ManagerError::ProductNotFound(id));
            }
            Err(err) => return Err(err.into()),
        }
        self.products.remove(&id);
        tracing::info!(%id, "product deleted");
        Ok(())
    }

    /// Restock: entity validation, then a stock-only partial update.
    #[instrument(skip(self), err)]
    pub async fn increase_product_stock(
        &mut self,
        id: ProductId,
        quantity: i64,
    ) -> ManagerResult<&Product> {
        let current = self
            .products
            .get(&id)
            .ok_or(ManagerError::ProductNotFound(id))?;

        let mut updated = current.clone();
        updated.increase_stock(quantity)?;

        let outcome = self
            .product_store
            .update_stock(id, updated.stock_quantity())
            .await;
        self.persist_or_not_found(id, outcome)?;
        Ok(self.commit(updated))
    }

    /// Dry-run of a sale: returns price × quantity without mutating
    /// anything. Pure and idempotent.
    pub fn preview_sale(&self, id: ProductId, quantity: i64) -> ManagerResult<f64> {
        if quantity <= 0 {
            return Err(DomainError::validation("quantity must be positive").into());
        }
        let product = self
            .products
            .get(&id)
            .ok_or(ManagerError::ProductNotFound(id))?;
        if product.stock_quantity() < quantity {
            return Err(
                DomainError::insufficient_stock(quantity, product.stock_quantity()).into(),
            );
        }
        Ok(product.price() * quantity as f64)
    }

    /// Reduce stock, persist it, commit the cache, then append the sale row.
    ///
    /// A failure appending the sale after the stock write returns
    /// [`ManagerError::SalePartiallyRecorded`]: the decrement stands, the
    /// sales log is missing the row.
    #[instrument(skip(self), err)]
    pub async fn process_sale(&mut self, id: ProductId, quantity: i64) -> ManagerResult<SaleId> {
        let current = self
            .products
            .get(&id)
            .ok_or(ManagerError::ProductNotFound(id))?;

        let mut updated = current.clone();
        updated.reduce_stock(quantity)?;

        let outcome = self
            .product_store
            .update_stock(id, updated.stock_quantity())
            .await;
        self.persist_or_not_found(id, outcome)?;
        let remaining = updated.stock_quantity();
        self.commit(updated);

        match self.sales_store.append(id, quantity).await {
            Ok(sale_id) => {
                tracing::info!(%id, quantity, remaining, "sale recorded");
                Ok(sale_id)
            }
            Err(source) => Err(ManagerError::SalePartiallyRecorded {
                product_id: id,
                source,
            }),
        }
    }

    /// All recorded sales, most recent first. Pass-through read.
    pub async fn all_sales(&self) -> ManagerResult<Vec<Sale>> {
        let rows = self.sales_store.fetch_all().await?;
        rows.into_iter().map(sale_from_row).collect()
    }

    /// Sales for one cached product, most recent first.
    pub async fn sales_for_product(&self, id: ProductId) -> ManagerResult<Vec<Sale>> {
        if !self.products.contains_key(&id) {
            return Err(ManagerError::ProductNotFound(id));
        }
        let rows = self.sales_store.fetch_by_product(id).await?;
        rows.into_iter().map(sale_from_row).collect()
    }

    /// Replace the cached entry after a successful persistence call.
    fn commit(&mut self, product: Product) -> &Product {
        match self.products.entry(product.id()) {
            Entry::Occupied(mut entry) => {
                entry.insert(product);
                entry.into_mut()
            }
            Entry::Vacant(entry) => entry.insert(product),
        }
    }

    /// Map a zero-rows-affected persistence outcome onto the not-found kind.
    fn persist_or_not_found(
        &self,
        id: ProductId,
        outcome: Result<(), StoreError>,
    ) -> ManagerResult<()> {
        match outcome {
            Ok(()) => Ok(()),
            Err(StoreError::RowNotFound) => Err(ManagerError::ProductNotFound(id)),
            Err(err) => Err(err.into()),
        }
    }
}

fn product_from_row(row: ProductRow) -> ManagerResult<Product> {
    let product = Product::from_stored(
        ProductId::new(row.id),
        row.name,
        row.price,
        row.stock_quantity,
    )?;
    Ok(product)
}

fn sale_from_row(row: SaleRow) -> ManagerResult<Sale> {
    let sale = Sale::new(
        SaleId::new(row.sale_id),
        ProductId::new(row.product_id),
        row.quantity_sold,
        row.sold_at,
    )?;
    Ok(sale)
}
