//! Optional auxiliary tables for job/item tracking.
//!
//! Created with `CREATE TABLE IF NOT EXISTS`, so running it repeatedly is harmless. Nothing in
//! the query path reads these tables.

use sqlx::SqlitePool;
use tracing::info;

use crate::error::StorageError;
use crate::row_store::RowStore;

/// Names of the auxiliary tables, in creation order.
pub const AUX_TABLES: [&str; 2] = ["jobs", "items"];

const CREATE_JOBS: &str = r#"
CREATE TABLE IF NOT EXISTS jobs (
    id INTEGER PRIMARY KEY,
    url TEXT,
    page_html TEXT,
    requirements TEXT
)
"#;

const CREATE_ITEMS: &str = r#"
CREATE TABLE IF NOT EXISTS items (
    id INTEGER PRIMARY KEY,
    name VARCHAR(100),
    description TEXT,
    status VARCHAR(20)
)
"#;

/// Creates `jobs` and `items` when they do not exist yet.
pub async fn ensure_aux_schema(pool: &SqlitePool) -> Result<(), StorageError> {
    info!("Creating auxiliary tables if not exist");
    sqlx::query(CREATE_JOBS).execute(pool).await?;
    sqlx::query(CREATE_ITEMS).execute(pool).await?;
    info!(tables = ?AUX_TABLES, "Auxiliary tables ready");
    Ok(())
}

impl RowStore {
    /// See [`ensure_aux_schema`].
    pub async fn ensure_aux_schema(&self) -> Result<(), StorageError> {
        ensure_aux_schema(self.pool_manager().pool()).await
    }
}
