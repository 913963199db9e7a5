//! Schema bootstrap for the SQLite database.

use sqlx::SqlitePool;

use crate::error::StoreResult;

/// Create the tables if they do not exist. Idempotent; called once at
/// startup by the process entry point.
///
/// `sales_log.product_id` logically references `products.id`; there is no
/// enforced cascade, so historical sales survive product deletion.
pub async fn init_schema(pool: &SqlitePool) -> StoreResult<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS products (
            id             INTEGER PRIMARY KEY AUTOINCREMENT,
            name           TEXT NOT NULL,
            price          REAL NOT NULL,
            stock_quantity INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS sales_log (
            sale_id       INTEGER PRIMARY KEY AUTOINCREMENT,
            product_id    INTEGER NOT NULL,
            quantity_sold INTEGER NOT NULL,
            sold_at       TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
