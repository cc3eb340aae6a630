//! Row store crate: the dataset table loaded from CSV and the query seam used by the bot.
//!
//! ## Modules
//!
//! - [`error`] – Storage error types
//! - [`models`] – SqlValue, QueryResult, TableInfo, ColumnInfo
//! - [`csv_dataset`] – CSV parsing with per-column type inference
//! - [`dataset_store`] – DatasetStore trait (count, execute, schema context)
//! - [`row_store`] – RowStore (SQLite)
//! - [`aux_schema`] – optional `jobs` / `items` tables
//! - [`sqlite_pool`] – SqlitePoolManager

mod aux_schema;
mod csv_dataset;
mod dataset_store;
mod error;
mod models;
mod row_store;
mod sqlite_pool;


pub use aux_schema::{ensure_aux_schema, AUX_TABLES};
pub use csv_dataset::{ColumnType, CsvDataset};
pub use dataset_store::DatasetStore;
pub use error::StorageError;
pub use models::{ColumnInfo, QueryResult, SqlValue, TableInfo};
pub use row_store::{quote_ident, RowStore, DEFAULT_TABLE};
pub use sqlite_pool::SqlitePoolManager;
