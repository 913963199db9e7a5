//! Interactive menu for the smartstock inventory and sales tracker.

mod menu;

use std::path::PathBuf;

use anyhow::Context;
use sqlx::SqlitePool;
use sqlx::sqlite::SqliteConnectOptions;

use smartstock_manager::StoreManager;
use smartstock_store::{SqliteProductStore, SqliteSalesStore, init_schema};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    smartstock_observability::init();

    let db_path = db_path().context("failed to resolve database path")?;
    tracing::info!(path = %db_path.display(), "opening database");

    let options = SqliteConnectOptions::new()
        .filename(&db_path)
        .create_if_missing(true);
    let pool = SqlitePool::connect_with(options)
        .await
        .with_context(|| format!("failed to open SQLite database at {}", db_path.display()))?;

    init_schema(&pool)
        .await
        .context("failed to initialize schema")?;

    let manager = StoreManager::load(
        SqliteProductStore::new(pool.clone()),
        SqliteSalesStore::new(pool.clone()),
    )
    .await
    .context("failed to load the catalog")?;

    menu::run(manager).await
}

/// Resolve the path to the SQLite database:
/// `$SMARTSTOCK_DB` if set, otherwise `{app_data_dir}/smartstock/smartstock.db`.
fn db_path() -> anyhow::Result<PathBuf> {
    if let Ok(path) = std::env::var("SMARTSTOCK_DB") {
        return Ok(PathBuf::from(path));
    }

    let base = dirs::data_dir()
        .or_else(|| {
            dirs::home_dir().map(|mut h| {
                h.push(".local");
                h.push("share");
                h
            })
        })
        .context("failed to resolve OS app data directory")?;

    let mut dir = base;
    dir.push("smartstock");
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create data directory at {}", dir.display()))?;

    dir.push("smartstock.db");
    Ok(dir)
}
