//! SQLite connection pool wrapper for the row store.

use sqlx::{sqlite::SqliteConnectOptions, SqlitePool};
use tracing::info;

/// Manages a single SQLite pool; creates the DB file if missing.
#[derive(Clone, Debug)]
pub struct SqlitePoolManager {
    pool: SqlitePool,
}

impl SqlitePoolManager {
    /// Creates a pool for the given database file path.
    pub async fn new(db_path: &str) -> Result<Self, sqlx::Error> {
        info!(db_path = %db_path, "Initializing SQLite pool");

        let options = SqliteConnectOptions::new()
            .create_if_missing(true)
            .filename(db_path);

        let pool = SqlitePool::connect_with(options).await?;

        Ok(Self { pool })
    }

    /// Returns the underlying pool for running queries.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
