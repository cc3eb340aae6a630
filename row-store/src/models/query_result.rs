//! Result of an ad-hoc SQL statement.
//!
//! Returned by [`crate::DatasetStore::execute`]; formatted as text for agent prompts.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single SQLite value, decoded by its storage class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Null => write!(f, "NULL"),
            SqlValue::Integer(i) => write!(f, "{}", i),
            SqlValue::Real(r) => write!(f, "{}", r),
            SqlValue::Text(s) => write!(f, "{}", s),
            SqlValue::Blob(b) => write!(f, "<{} bytes>", b.len()),
        }
    }
}

/// Column names and rows produced by one statement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<SqlValue>>,
}

impl QueryResult {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// First column of the first row, if any (e.g. the value of `SELECT COUNT(*)`).
    pub fn scalar(&self) -> Option<&SqlValue> {
        self.rows.first().and_then(|row| row.first())
    }

    /// Tab-separated header and at most `max_rows` rows; appends a line noting omitted rows.
    pub fn to_text(&self, max_rows: usize) -> String {
        let mut out = self.columns.join("\t");
        for row in self.rows.iter().take(max_rows) {
            out.push('\n');
            let line: Vec<String> = row.iter().map(|v| v.to_string()).collect();
            out.push_str(&line.join("\t"));
        }
        if self.rows.len() > max_rows {
            out.push_str(&format!("\n... ({} more rows)", self.rows.len() - max_rows));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> QueryResult {
        QueryResult {
            columns: vec!["sex".to_string(), "n".to_string()],
            rows: vec![
                vec![SqlValue::Text("male".to_string()), SqlValue::Integer(3)],
                vec![SqlValue::Text("female".to_string()), SqlValue::Integer(2)],
                vec![SqlValue::Null, SqlValue::Real(0.5)],
            ],
        }
    }

    #[test]
    fn test_scalar_returns_first_cell() {
        assert_eq!(sample().scalar(), Some(&SqlValue::Text("male".to_string())));
        assert_eq!(QueryResult::default().scalar(), None);
    }

    #[test]
    fn test_to_text_truncates() {
        let text = sample().to_text(2);
        assert_eq!(text, "sex\tn\nmale\t3\nfemale\t2\n... (1 more rows)");
    }

    #[test]
    fn test_to_text_renders_null_and_real() {
        let text = sample().to_text(10);
        assert!(text.ends_with("NULL\t0.5"));
        assert!(!text.contains("more rows"));
    }
}
