//! Product repository: contract plus the SQLite implementation.

use async_trait::async_trait;
use sqlx::{FromRow, SqlitePool};
use tracing::instrument;

use smartstock_catalog::{ProductDraft, ProductPatch};
use smartstock_core::ProductId;

use crate::error::{StoreError, StoreResult};

/// Raw product row as persisted. The business layer converts rows into
/// validated entities.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct ProductRow {
    pub id: i64,
    pub name: String,
    pub price: f64,
    pub stock_quantity: i64,
}

/// Durable create/read/update/delete for products.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Persist a validated draft; returns the identifier assigned by the
    /// store.
    async fn insert(&self, draft: &ProductDraft) -> StoreResult<ProductId>;

    async fn fetch(&self, id: ProductId) -> StoreResult<Option<ProductRow>>;

    /// All product rows in storage order.
    async fn fetch_all(&self) -> StoreResult<Vec<ProductRow>>;

    /// Persist the stock quantity only (partial update).
    async fn update_stock(&self, id: ProductId, new_stock: i64) -> StoreResult<()>;

    /// Persist only the supplied fields. Fails with
    /// [`StoreError::EmptyUpdate`] when the patch is empty and
    /// [`StoreError::RowNotFound`] when no row matched.
    async fn update_fields(&self, id: ProductId, patch: &ProductPatch) -> StoreResult<()>;

    /// Remove the row. Fails with [`StoreError::RowNotFound`] when zero rows
    /// were affected.
    async fn delete(&self, id: ProductId) -> StoreResult<()>;
}

/// SQLite-backed product repository.
///
/// Each call borrows a connection from the shared pool for the duration of
/// its statement and releases it immediately; nothing is held across calls.
#[derive(Debug, Clone)]
pub struct SqliteProductStore {
    pool: SqlitePool,
}

impl SqliteProductStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductStore for SqliteProductStore {
    #[instrument(skip(self, draft), err)]
    async fn insert(&self, draft: &ProductDraft) -> StoreResult<ProductId> {
        let result = sqlx::query(
            r#"
            INSERT INTO products (name, price, stock_quantity)
            VALUES (?1, ?2, ?3)
            "#,
        )
        .bind(draft.name())
        .bind(draft.price())
        .bind(draft.stock_quantity())
        .execute(&self.pool)
        .await?;

        Ok(ProductId::new(result.last_insert_rowid()))
    }

    #[instrument(skip(self), err)]
    async fn fetch(&self, id: ProductId) -> StoreResult<Option<ProductRow>> {
        let row = sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT id, name, price, stock_quantity
            FROM products
            WHERE id = ?1
            "#,
        )
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    #[instrument(skip(self), err)]
    async fn fetch_all(&self) -> StoreResult<Vec<ProductRow>> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT id, name, price, stock_quantity
            FROM products
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    #[instrument(skip(self), err)]
    async fn update_stock(&self, id: ProductId, new_stock: i64) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE products
            SET stock_quantity = ?1
            WHERE id = ?2
            "#,
        )
        .bind(new_stock)
        .bind(id.get())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::RowNotFound);
        }
        Ok(())
    }

    #[instrument(skip(self, patch), err)]
    async fn update_fields(&self, id: ProductId, patch: &ProductPatch) -> StoreResult<()> {
        if patch.is_empty() {
            return Err(StoreError::EmptyUpdate);
        }

        let result = sqlx::query(
            r#"
            UPDATE products
            SET name           = COALESCE(?1, name),
                price          = COALESCE(?2, price),
                stock_quantity = COALESCE(?3, stock_quantity)
            WHERE id = ?4
            "#,
        )
        .bind(patch.name.as_deref())
        .bind(patch.price)
        .bind(patch.stock_quantity)
        .bind(id.get())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::RowNotFound);
        }
        Ok(())
    }

    #[instrument(skip(self), err)]
    async fn delete(&self, id: ProductId) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            DELETE FROM products
            WHERE id = ?1
            "#,
        )
        .bind(id.get())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::RowNotFound);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::init_schema;

    // One connection only: every pooled connection to an in-memory database
    // is a separate database.
    async fn test_pool() -> SqlitePool {
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        init_schema(&pool).await.unwrap();
        pool
    }

    fn draft(name: &str, price: f64, stock: i64) -> ProductDraft {
        ProductDraft::new(name, price, stock).unwrap()
    }

    #[tokio::test]
    async fn insert_assigns_sequential_ids() {
        let store = SqliteProductStore::new(test_pool().await);
        let first = store.insert(&draft("Milk", 2.5, 10)).await.unwrap();
        let second = store.insert(&draft("Bread", 1.2, 4)).await.unwrap();
        assert!(second.get() > first.get());
    }

    #[tokio::test]
    async fn fetch_returns_inserted_row() {
        let store = SqliteProductStore::new(test_pool().await);
        let id = store.insert(&draft("Milk", 2.5, 10)).await.unwrap();

        let row = store.fetch(id).await.unwrap().unwrap();
        assert_eq!(row.id, id.get());
        assert_eq!(row.name, "Milk");
        assert_eq!(row.price, 2.5);
        assert_eq!(row.stock_quantity, 10);
    }

    #[tokio::test]
    async fn fetch_unknown_id_is_none() {
        let store = SqliteProductStore::new(test_pool().await);
        assert!(store.fetch(ProductId::new(99)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn fetch_all_returns_rows_in_id_order() {
        let store = SqliteProductStore::new(test_pool().await);
        store.insert(&draft("Milk", 2.5, 10)).await.unwrap();
        store.insert(&draft("Bread", 1.2, 4)).await.unwrap();

        let rows = store.fetch_all().await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "Milk");
        assert_eq!(rows[1].name, "Bread");
    }

    #[tokio::test]
    async fn update_stock_persists_only_stock() {
        let store = SqliteProductStore::new(test_pool().await);
        let id = store.insert(&draft("Milk", 2.5, 10)).await.unwrap();

        store.update_stock(id, 7).await.unwrap();

        let row = store.fetch(id).await.unwrap().unwrap();
        assert_eq!(row.stock_quantity, 7);
        assert_eq!(row.price, 2.5);
        assert_eq!(row.name, "Milk");
    }

    #[tokio::test]
    async fn update_stock_unknown_id_is_row_not_found() {
        let store = SqliteProductStore::new(test_pool().await);
        let err = store.update_stock(ProductId::new(99), 7).await.unwrap_err();
        assert!(matches!(err, StoreError::RowNotFound));
    }

    #[tokio::test]
    async fn update_fields_applies_only_supplied_fields() {
        let store = SqliteProductStore::new(test_pool().await);
        let id = store.insert(&draft("Milk", 2.5, 10)).await.unwrap();

        let patch = ProductPatch {
            price: Some(3.0),
            ..ProductPatch::default()
        };
        store.update_fields(id, &patch).await.unwrap();

        let row = store.fetch(id).await.unwrap().unwrap();
        assert_eq!(row.price, 3.0);
        assert_eq!(row.name, "Milk");
        assert_eq!(row.stock_quantity, 10);
    }

    #[tokio::test]
    async fn update_fields_rejects_empty_patch() {
        let store = SqliteProductStore::new(test_pool().await);
        let id = store.insert(&draft("Milk", 2.5, 10)).await.unwrap();

        let err = store
            .update_fields(id, &ProductPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::EmptyUpdate));
    }

    #[tokio::test]
    async fn delete_removes_row_and_reports_missing() {
        let store = SqliteProductStore::new(test_pool().await);
        let id = store.insert(&draft("Milk", 2.5, 10)).await.unwrap();

        store.delete(id).await.unwrap();
        assert!(store.fetch(id).await.unwrap().is_none());

        let err = store.delete(id).await.unwrap_err();
        assert!(matches!(err, StoreError::RowNotFound));
    }
}
