//! Sales log repository: contract plus the SQLite implementation.
//!
//! The log is append-only; rows are never updated or deleted.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use tracing::instrument;

use smartstock_core::{ProductId, SaleId};

use crate::error::StoreResult;

/// Raw sale row as persisted.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct SaleRow {
    pub sale_id: i64,
    pub product_id: i64,
    pub quantity_sold: i64,
    pub sold_at: DateTime<Utc>,
}

/// Durable append/read for the sales log.
#[async_trait]
pub trait SalesStore: Send + Sync {
    /// Append one sale; the timestamp is assigned by the store at insert
    /// time. Returns the identifier of the new row.
    async fn append(&self, product_id: ProductId, quantity_sold: i64) -> StoreResult<SaleId>;

    /// All sale rows, most recent first.
    async fn fetch_all(&self) -> StoreResult<Vec<SaleRow>>;

    /// Sale rows for one product, most recent first.
    async fn fetch_by_product(&self, product_id: ProductId) -> StoreResult<Vec<SaleRow>>;
}

/// SQLite-backed sales log.
#[derive(Debug, Clone)]
pub struct SqliteSalesStore {
    pool: SqlitePool,
}

impl SqliteSalesStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SalesStore for SqliteSalesStore {
    #[instrument(skip(self), err)]
    async fn append(&self, product_id: ProductId, quantity_sold: i64) -> StoreResult<SaleId> {
        let result = sqlx::query(
            r#"
            INSERT INTO sales_log (product_id, quantity_sold, sold_at)
            VALUES (?1, ?2, ?3)
            "#,
        )
        .bind(product_id.get())
        .bind(quantity_sold)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(SaleId::new(result.last_insert_rowid()))
    }

    #[instrument(skip(self), err)]
    async fn fetch_all(&self) -> StoreResult<Vec<SaleRow>> {
        let rows = sqlx::query_as::<_, SaleRow>(
            r#"
            SELECT sale_id, product_id, quantity_sold, sold_at
            FROM sales_log
            ORDER BY sold_at DESC, sale_id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    #[instrument(skip(self), err)]
    async fn fetch_by_product(&self, product_id: ProductId) -> StoreResult<Vec<SaleRow>> {
        let rows = sqlx::query_as::<_, SaleRow>(
            r#"
            SELECT sale_id, product_id, quantity_sold, sold_at
            FROM sales_log
            WHERE product_id = ?1
            ORDER BY sold_at DESC, sale_id DESC
            "#,
        )
        .bind(product_id.get())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::init_schema;

    // One connection only: every pooled connection to an in-memory database
    // is a separate database.
    async fn test_store() -> SqliteSalesStore {
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        init_schema(&pool).await.unwrap();
        SqliteSalesStore::new(pool)
    }

    #[tokio::test]
    async fn append_assigns_id_and_timestamp() {
        let store = test_store().await;
        let before = Utc::now();
        let id = store.append(ProductId::new(1), 3).await.unwrap();
        assert!(id.get() >= 1);

        let rows = store.fetch_all().await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].product_id, 1);
        assert_eq!(rows[0].quantity_sold, 3);
        assert!(rows[0].sold_at >= before);
    }

    #[tokio::test]
    async fn fetch_all_orders_most_recent_first() {
        let store = test_store().await;
        let first = store.append(ProductId::new(1), 1).await.unwrap();
        let second = store.append(ProductId::new(2), 2).await.unwrap();

        let rows = store.fetch_all().await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].sale_id, second.get());
        assert_eq!(rows[1].sale_id, first.get());
    }

    #[tokio::test]
    async fn fetch_by_product_filters_rows() {
        let store = test_store().await;
        store.append(ProductId::new(1), 1).await.unwrap();
        store.append(ProductId::new(2), 2).await.unwrap();
        store.append(ProductId::new(1), 3).await.unwrap();

        let rows = store.fetch_by_product(ProductId::new(1)).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.product_id == 1));
        assert_eq!(rows[0].quantity_sold, 3);
    }

    #[tokio::test]
    async fn fetch_by_product_unknown_is_empty() {
        let store = test_store().await;
        let rows = store.fetch_by_product(ProductId::new(9)).await.unwrap();
        assert!(rows.is_empty());
    }
}
