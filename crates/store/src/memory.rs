//! In-memory repositories.
//!
//! Intended for tests/dev. They mirror the SQLite implementations row for
//! row (id assignment, ordering, zero-rows-affected semantics) and can
//! inject a one-shot failure to exercise error paths.

use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;

use smartstock_catalog::{ProductDraft, ProductPatch};
use smartstock_core::{ProductId, SaleId};

use crate::error::{StoreError, StoreResult};
use crate::product_store::{ProductRow, ProductStore};
use crate::sales_store::{SaleRow, SalesStore};

#[derive(Debug, Default)]
struct ProductTable {
    rows: Vec<ProductRow>,
    next_id: i64,
    fail_next: bool,
}

/// In-memory product repository.
#[derive(Debug, Default)]
pub struct InMemoryProductStore {
    table: RwLock<ProductTable>,
}

impl InMemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next store call fail with [`StoreError::Unavailable`].
    pub fn fail_next(&self) {
        if let Ok(mut table) = self.table.write() {
            table.fail_next = true;
        }
    }
}

fn take_failure(fail_next: &mut bool) -> StoreResult<()> {
    if *fail_next {
        *fail_next = false;
        return Err(StoreError::Unavailable("injected failure".to_string()));
    }
    Ok(())
}

#[async_trait]
impl ProductStore for InMemoryProductStore {
    async fn insert(&self, draft: &ProductDraft) -> StoreResult<ProductId> {
        let mut table = self
            .table
            .write()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        take_failure(&mut table.fail_next)?;

        table.next_id += 1;
        let id = table.next_id;
        table.rows.push(ProductRow {
            id,
            name: draft.name().to_string(),
            price: draft.price(),
            stock_quantity: draft.stock_quantity(),
        });
        Ok(ProductId::new(id))
    }

    async fn fetch(&self, id: ProductId) -> StoreResult<Option<ProductRow>> {
        let mut table = self
            .table
            .write()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        take_failure(&mut table.fail_next)?;

        Ok(table.rows.iter().find(|r| r.id == id.get()).cloned())
    }

    async fn fetch_all(&self) -> StoreResult<Vec<ProductRow>> {
        let mut table = self
            .table
            .write()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        take_failure(&mut table.fail_next)?;

        Ok(table.rows.clone())
    }

    async fn update_stock(&self, id: ProductId, new_stock: i64) -> StoreResult<()> {
        let mut table = self
            .table
            .write()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        take_failure(&mut table.fail_next)?;

        match table.rows.iter_mut().find(|r| r.id == id.get()) {
            Some(row) => {
                row.stock_quantity = new_stock;
                Ok(())
            }
            None => Err(StoreError::RowNotFound),
        }
    }

    async fn update_fields(&self, id: ProductId, patch: &ProductPatch) -> StoreResult<()> {
        if patch.is_empty() {
            return Err(StoreError::EmptyUpdate);
        }

        let mut table = self
            .table
            .write()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        take_failure(&mut table.fail_next)?;

        match table.rows.iter_mut().find(|r| r.id == id.get()) {
            Some(row) => {
                if let Some(name) = &patch.name {
                    row.name = name.clone();
                }
                if let Some(price) = patch.price {
                    row.price = price;
                }
                if let Some(stock) = patch.stock_quantity {
                    row.stock_quantity = stock;
                }
                Ok(())
            }
            None => Err(StoreError::RowNotFound),
        }
    }

    async fn delete(&self, id: ProductId) -> StoreResult<()> {
        let mut table = self
            .table
            .write()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        take_failure(&mut table.fail_next)?;

        let before = table.rows.len();
        table.rows.retain(|r| r.id != id.get());
        if table.rows.len() == before {
            return Err(StoreError::RowNotFound);
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
struct SalesTable {
    rows: Vec<SaleRow>,
    next_id: i64,
    fail_next: bool,
}

/// In-memory append-only sales log.
#[derive(Debug, Default)]
pub struct InMemorySalesStore {
    table: RwLock<SalesTable>,
}

impl InMemorySalesStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next store call fail with [`StoreError::Unavailable`].
    pub fn fail_next(&self) {
        if let Ok(mut table) = self.table.write() {
            table.fail_next = true;
        }
    }
}

#[async_trait]
impl SalesStore for InMemorySalesStore {
    async fn append(&self, product_id: ProductId, quantity_sold: i64) -> StoreResult<SaleId> {
        let mut table = self
            .table
            .write()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        take_failure(&mut table.fail_next)?;

        table.next_id += 1;
        let id = table.next_id;
        table.rows.push(SaleRow {
            sale_id: id,
            product_id: product_id.get(),
            quantity_sold,
            sold_at: Utc::now(),
        });
        Ok(SaleId::new(id))
    }

    async fn fetch_all(&self) -> StoreResult<Vec<SaleRow>> {
        let mut table = self
            .table
            .write()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        take_failure(&mut table.fail_next)?;

        let mut rows = table.rows.clone();
        rows.sort_by(|a, b| b.sold_at.cmp(&a.sold_at).then(b.sale_id.cmp(&a.sale_id)));
        Ok(rows)
    }

    async fn fetch_by_product(&self, product_id: ProductId) -> StoreResult<Vec<SaleRow>> {
        let mut table = self
            .table
            .write()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        take_failure(&mut table.fail_next)?;

        let mut rows: Vec<SaleRow> = table
            .rows
            .iter()
            .filter(|r| r.product_id == product_id.get())
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.sold_at.cmp(&a.sold_at).then(b.sale_id.cmp(&a.sale_id)));
        Ok(rows)
    }
}
