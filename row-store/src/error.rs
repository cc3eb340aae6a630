//! Storage error types.
//!
//! Returned by [`crate::RowStore`] and [`crate::DatasetStore`] implementations. Callers on the
//! shortcut path turn these into user-facing strings; they never escape the dispatcher.

use thiserror::Error;

/// Errors that can occur when loading or querying the row store.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error("Table not found: {0}")]
    TableNotFound(String),
}
