//! Filter path persistence
//!
//! The active facet selection survives restarts. Entries are stored in
//! insertion order; `auto_id` provides the ordering.

use crate::filter::{Category, FilterEntry, FilterPath};
use crate::Result;
use async_trait::async_trait;
use sqlx::SqlitePool;
use tracing::{debug, warn};

/// Persistence contract for the active filter path
#[async_trait]
pub trait FilterPathStore: Send + Sync {
    /// Replace the persisted path with `path`
    async fn save(&self, path: &FilterPath) -> Result<()>;

    /// Read the persisted path (empty if nothing was saved)
    async fn load(&self) -> Result<FilterPath>;

    /// Remove every persisted entry
    async fn clear(&self) -> Result<()>;
}

/// [`FilterPathStore`] backed by the `filter_path` table
#[derive(Clone)]
pub struct SqliteFilterPathStore {
    pool: SqlitePool,
}

impl SqliteFilterPathStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FilterPathStore for SqliteFilterPathStore {
    async fn save(&self, path: &FilterPath) -> Result<()> {
        save_filter_path(&self.pool, path).await
    }

    async fn load(&self) -> Result<FilterPath> {
        load_filter_path(&self.pool).await
    }

    async fn clear(&self) -> Result<()> {
        clear_filter_path(&self.pool).await
    }
}

/// Replace the persisted filter path in one transaction
pub async fn save_filter_path(pool: &SqlitePool, path: &FilterPath) -> Result<()> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM filter_path")
        .execute(&mut *tx)
        .await?;

    for entry in path.entries() {
        sqlx::query(
            "INSERT INTO filter_path (category_id, entity_id, entity_name) VALUES (?, ?, ?)",
        )
        .bind(entry.category.code())
        .bind(entry.entity_id)
        .bind(&entry.entity_name)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    debug!("Saved filter path ({} entries)", path.len());
    Ok(())
}

/// Load the persisted filter path
///
/// Rows with an unknown category code are skipped. Duplicate categories
/// collapse to the last stored entry.
pub async fn load_filter_path(pool: &SqlitePool) -> Result<FilterPath> {
    let rows = sqlx::query_as::<_, (i64, i64, String)>(
        "SELECT category_id, entity_id, entity_name FROM filter_path ORDER BY auto_id",
    )
    .fetch_all(pool)
    .await?;

    let mut entries = Vec::with_capacity(rows.len());
    for (category_id, entity_id, entity_name) in rows {
        match Category::from_code(category_id) {
            Some(category) => entries.push(FilterEntry::new(category, entity_id, entity_name)),
            None => warn!(
                "Skipping filter path row with unknown category {} (entity {})",
                category_id, entity_id
            ),
        }
    }

    Ok(FilterPath::from_entries(entries))
}

/// Remove every persisted filter path entry
pub async fn clear_filter_path(pool: &SqlitePool) -> Result<()> {
    sqlx::query("DELETE FROM filter_path").execute(pool).await?;
    debug!("Cleared filter path");
    Ok(())
}
