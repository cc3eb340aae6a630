//! CSV parsing for the dataset table.
//!
//! Every field is kept as text until the whole file is read, then each column gets one type:
//! INTEGER when every non-empty value parses as `i64`, REAL when every non-empty value parses as
//! `f64`, TEXT otherwise. Empty fields become NULL.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::StorageError;
use crate::models::SqlValue;

/// SQLite column type chosen for a CSV column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Real,
    Text,
}

impl ColumnType {
    pub fn sql_name(&self) -> &'static str {
        match self {
            ColumnType::Integer => "INTEGER",
            ColumnType::Real => "REAL",
            ColumnType::Text => "TEXT",
        }
    }

    fn infer<'a>(values: impl Iterator<Item = &'a str>) -> Self {
        let mut ty = ColumnType::Integer;
        for value in values.filter(|v| !v.is_empty()) {
            if ty == ColumnType::Integer && value.trim().parse::<i64>().is_err() {
                ty = ColumnType::Real;
            }
            if ty == ColumnType::Real && value.trim().parse::<f64>().is_err() {
                return ColumnType::Text;
            }
        }
        ty
    }

    fn convert(&self, raw: &str) -> SqlValue {
        if raw.is_empty() {
            return SqlValue::Null;
        }
        match self {
            ColumnType::Integer => raw
                .trim()
                .parse()
                .map(SqlValue::Integer)
                .unwrap_or_else(|_| SqlValue::Text(raw.to_string())),
            ColumnType::Real => raw
                .trim()
                .parse()
                .map(SqlValue::Real)
                .unwrap_or_else(|_| SqlValue::Text(raw.to_string())),
            ColumnType::Text => SqlValue::Text(raw.to_string()),
        }
    }
}

/// A parsed CSV file: unique column names, inferred column types and typed rows.
#[derive(Debug, Clone)]
pub struct CsvDataset {
    columns: Vec<String>,
    column_types: Vec<ColumnType>,
    rows: Vec<Vec<SqlValue>>,
}

impl CsvDataset {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, StorageError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(false)
            .from_reader(reader);

        let headers = reader.headers()?.clone();
        if headers.is_empty() {
            return Err(StorageError::InvalidData("CSV has no header row".to_string()));
        }
        let columns = unique_column_names(headers.iter());

        let mut raw_rows: Vec<Vec<String>> = Vec::new();
        for record in reader.records() {
            let record = record?;
            raw_rows.push(record.iter().map(|f| f.to_string()).collect());
        }

        let column_types: Vec<ColumnType> = (0..columns.len())
            .map(|i| ColumnType::infer(raw_rows.iter().map(|row| row[i].as_str())))
            .collect();

        let rows = raw_rows
            .iter()
            .map(|row| {
                row.iter()
                    .zip(&column_types)
                    .map(|(raw, ty)| ty.convert(raw))
                    .collect()
            })
            .collect();

        Ok(Self {
            columns,
            column_types,
            rows,
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn column_types(&self) -> &[ColumnType] {
        &self.column_types
    }

    pub fn rows(&self) -> &[Vec<SqlValue>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Blank headers become `Unnamed: {index}`; repeated names get a `.1`, `.2`, ... suffix.
fn unique_column_names<'a>(headers: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    headers
        .enumerate()
        .map(|(i, h)| {
            let base = if h.trim().is_empty() {
                format!("Unnamed: {}", i)
            } else {
                h.to_string()
            };
            let count = seen.entry(base.clone()).or_insert(0);
            let name = if *count == 0 {
                base
            } else {
                format!("{}.{}", base, count)
            };
            *count += 1;
            name
        })
        .collect()
}
