mod query_result;
mod table_info;

pub use query_result::{QueryResult, SqlValue};
pub use table_info::{ColumnInfo, TableInfo};
