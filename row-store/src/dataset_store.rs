use async_trait::async_trait;

use crate::error::StorageError;
use crate::models::{QueryResult, TableInfo};

/// Query seam over the loaded dataset table.
///
/// The dispatcher uses `count_rows` for the shortcut path and `schema_context` for agent prompts;
/// the SQL agent uses `execute`, which never modifies the database. Tests substitute in-memory fakes.
#[async_trait]
pub trait DatasetStore: Send + Sync {
    /// Name of the single dataset table.
    fn table_name(&self) -> &str;

    /// `SELECT COUNT(*)` against the dataset table.
    async fn count_rows(&self) -> Result<i64, StorageError>;

    /// Runs one read-only SQL statement and returns every row it produces; writes are rejected.
    async fn execute(&self, sql: &str) -> Result<QueryResult, StorageError>;

    /// `CREATE TABLE` statement plus a few sample rows, formatted for an LLM prompt.
    async fn schema_context(&self) -> Result<String, StorageError>;

    /// Row count and column list, for `/info`.
    async fn table_info(&self) -> Result<TableInfo, StorageError>;

    /// True when the dataset table can be read.
    async fn is_ready(&self) -> bool {
        self.count_rows().await.is_ok()
    }
}
