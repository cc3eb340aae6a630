//! Row store: the dataset table inside a SQLite file.
//!
//! Uses SqlitePoolManager and CsvDataset. Each load drops and recreates the table inside one
//! transaction, so reloading the same file leaves the row count unchanged.

use std::path::Path;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteArguments, SqliteRow};
use sqlx::{Column, Row, Sqlite, TypeInfo, ValueRef};
use tracing::{debug, info, instrument, warn};

use crate::csv_dataset::CsvDataset;
use crate::dataset_store::DatasetStore;
use crate::error::StorageError;
use crate::models::{ColumnInfo, QueryResult, SqlValue, TableInfo};
use crate::sqlite_pool::SqlitePoolManager;

/// Table name used when none is configured.
pub const DEFAULT_TABLE: &str = "df_total";

/// Sample rows included in the schema context.
const SAMPLE_ROWS: usize = 3;

/// Double-quotes an SQLite identifier, doubling embedded quotes.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[derive(Clone, Debug)]
pub struct RowStore {
    pool_manager: SqlitePoolManager,
    table: String,
}

impl RowStore {
    /// Opens (or creates) the SQLite file at `db_path`; the parent directory is created when missing.
    pub async fn open(db_path: &str, table: impl Into<String>) -> Result<Self, StorageError> {
        if let Some(parent) = Path::new(db_path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let pool_manager = SqlitePoolManager::new(db_path).await?;
        Ok(Self {
            pool_manager,
            table: table.into(),
        })
    }

    pub fn pool_manager(&self) -> &SqlitePoolManager {
        &self.pool_manager
    }

    /// Parses the CSV file and replaces the dataset table with its contents. Returns rows inserted.
    #[instrument(skip(self, csv_path), fields(table = %self.table))]
    pub async fn load_csv(&self, csv_path: impl AsRef<Path>) -> Result<u64, StorageError> {
        let csv_path = csv_path.as_ref();
        info!(csv_path = %csv_path.display(), "Loading CSV into row store");
        let dataset = CsvDataset::from_path(csv_path)?;
        self.load_dataset(&dataset).await
    }

    /// Drops the dataset table and recreates it from `dataset` in a single transaction.
    pub async fn load_dataset(&self, dataset: &CsvDataset) -> Result<u64, StorageError> {
        let table = quote_ident(&self.table);
        let column_defs: Vec<String> = dataset
            .columns()
            .iter()
            .zip(dataset.column_types())
            .map(|(name, ty)| format!("{} {}", quote_ident(name), ty.sql_name()))
            .collect();
        let placeholders = vec!["?"; dataset.columns().len()].join(", ");
        let insert_sql = format!("INSERT INTO {} VALUES ({})", table, placeholders);

        let mut tx = self.pool_manager.pool().begin().await?;

        sqlx::query(&format!("DROP TABLE IF EXISTS {}", table))
            .execute(&mut *tx)
            .await?;
        sqlx::query(&format!(
            "CREATE TABLE {} ({})",
            table,
            column_defs.join(", ")
        ))
        .execute(&mut *tx)
        .await?;

        let mut inserted = 0u64;
        for row in dataset.rows() {
            let mut query = sqlx::query(&insert_sql);
            for value in row {
                query = bind_value(query, value);
            }
            inserted += query.execute(&mut *tx).await?.rows_affected();
        }

        tx.commit().await?;

        info!(
            table = %self.table,
            rows = inserted,
            columns = dataset.columns().len(),
            "Row store loaded"
        );
        Ok(inserted)
    }
}

#[async_trait]
impl DatasetStore for RowStore {
    fn table_name(&self) -> &str {
        &self.table
    }

    async fn count_rows(&self) -> Result<i64, StorageError> {
        let count: (i64,) = sqlx::query_as(&format!(
            "SELECT COUNT(*) FROM {}",
            quote_ident(&self.table)
        ))
        .fetch_one(self.pool_manager.pool())
        .await?;
        Ok(count.0)
    }

    async fn execute(&self, sql: &str) -> Result<QueryResult, StorageError> {
        debug!(sql = %sql, "Executing SQL");
        let mut conn = self.pool_manager.pool().acquire().await?;
        sqlx::query("PRAGMA query_only = ON")
            .execute(&mut *conn)
            .await?;
        let rows = sqlx::query(sql).fetch_all(&mut *conn).await;
        if let Err(e) = sqlx::query("PRAGMA query_only = OFF")
            .execute(&mut *conn)
            .await
        {
            // Never hand a query-only connection back to the pool.
            warn!(error = %e, "Failed to reset query_only; closing connection");
            drop(conn.detach());
        }
        let result = rows_to_result(&rows?)?;
        debug!(rows = result.row_count(), "SQL executed");
        Ok(result)
    }

    async fn schema_context(&self) -> Result<String, StorageError> {
        let create_sql: Option<(String,)> =
            sqlx::query_as("SELECT sql FROM sqlite_master WHERE type = 'table' AND name = ?")
                .bind(&self.table)
                .fetch_optional(self.pool_manager.pool())
                .await?;
        let create_sql = create_sql
            .map(|r| r.0)
            .ok_or_else(|| StorageError::TableNotFound(self.table.clone()))?;

        let sample = self
            .execute(&format!(
                "SELECT * FROM {} LIMIT {}",
                quote_ident(&self.table),
                SAMPLE_ROWS
            ))
            .await?;

        Ok(format!(
            "{}\n\n/*\n{} rows from {} table:\n{}\n*/",
            create_sql,
            SAMPLE_ROWS,
            self.table,
            sample.to_text(SAMPLE_ROWS)
        ))
    }

    async fn table_info(&self) -> Result<TableInfo, StorageError> {
        let row_count = self.count_rows().await?;
        let rows = sqlx::query(&format!("PRAGMA table_info({})", quote_ident(&self.table)))
            .fetch_all(self.pool_manager.pool())
            .await?;

        let mut columns = Vec::with_capacity(rows.len());
        for row in &rows {
            let notnull: i64 = row.try_get("notnull")?;
            columns.push(ColumnInfo {
                name: row.try_get("name")?,
                declared_type: row.try_get("type")?,
                nullable: notnull == 0,
            });
        }

        Ok(TableInfo {
            table_name: self.table.clone(),
            row_count,
            columns,
        })
    }

    async fn is_ready(&self) -> bool {
        sqlx::query(&format!("SELECT 1 FROM {} LIMIT 1", quote_ident(&self.table)))
            .fetch_optional(self.pool_manager.pool())
            .await
            .is_ok()
    }
}

fn bind_value<'q>(
    query: sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>>,
    value: &SqlValue,
) -> sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>> {
    match value {
        SqlValue::Null => query.bind(None::<String>),
        SqlValue::Integer(i) => query.bind(*i),
        SqlValue::Real(r) => query.bind(*r),
        SqlValue::Text(s) => query.bind(s.clone()),
        SqlValue::Blob(b) => query.bind(b.clone()),
    }
}

fn rows_to_result(rows: &[SqliteRow]) -> Result<QueryResult, StorageError> {
    let columns = rows
        .first()
        .map(|row| row.columns().iter().map(|c| c.name().to_string()).collect())
        .unwrap_or_default();

    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        let mut values = Vec::with_capacity(row.len());
        for i in 0..row.len() {
            values.push(decode_value(row, i)?);
        }
        out.push(values);
    }

    Ok(QueryResult { columns, rows: out })
}

/// Decodes by the value's runtime storage class, not the column's declared type.
fn decode_value(row: &SqliteRow, index: usize) -> Result<SqlValue, StorageError> {
    let raw = row.try_get_raw(index)?;
    if raw.is_null() {
        return Ok(SqlValue::Null);
    }
    let type_name = raw.type_info().name().to_string();
    let value = match type_name.as_str() {
        "INTEGER" | "BOOLEAN" => SqlValue::Integer(row.try_get_unchecked::<i64, _>(index)?),
        "REAL" => SqlValue::Real(row.try_get_unchecked::<f64, _>(index)?),
        "BLOB" => SqlValue::Blob(row.try_get_unchecked::<Vec<u8>, _>(index)?),
        _ => SqlValue::Text(row.try_get_unchecked::<String, _>(index)?),
    };
    Ok(value)
}
