//! COMOS table rows as handed over by the tabular reader.
//!
//! Rows keep their column order; the engine only reads the key columns below
//! and writes the three output columns.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

pub const COL_BLOCK_TYPE: &str = "Block type";
pub const COL_BLOCK: &str = "Block";
pub const COL_IO_NAME: &str = "I/O name";
pub const COL_VALUE: &str = "Value";
pub const COL_SIGNAL: &str = "Signal";
pub const COL_TEXT0: &str = "Text 0";

/// One cell. `Number(NaN)` is the "not a number" sentinel and serializes as `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Empty,
    Integer(i64),
    Number(f64),
    Text(String),
}

impl CellValue {
    pub fn is_nan(&self) -> bool {
        matches!(self, CellValue::Number(v) if v.is_nan())
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Integer(v) => write!(f, "{v}"),
            CellValue::Number(v) if v.is_nan() => f.write_str("nan"),
            CellValue::Number(v) => write!(f, "{v}"),
            CellValue::Text(v) => f.write_str(v),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Integer(value)
    }
}

/// Ordered column -> cell map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableRow {
    cells: IndexMap<String, CellValue>,
}

impl TableRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder used by readers and tests.
    pub fn with(mut self, column: &str, value: impl Into<CellValue>) -> Self {
        self.set(column, value);
        self
    }

    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.cells.get(column)
    }

    /// Cell rendered as text; empty when the column is missing.
    pub fn text(&self, column: &str) -> String {
        self.get(column).map(|v| v.to_string()).unwrap_or_default()
    }

    /// Overwrites in place, or appends the column at the end.
    pub fn set(&mut self, column: &str, value: impl Into<CellValue>) {
        self.cells.insert(column.to_string(), value.into());
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Strips padding around column names, keeping order. Later duplicates win.
    pub fn trim_columns(self) -> Self {
        if self.cells.keys().all(|k| k.trim() == k) {
            return self;
        }
        let cells = self
            .cells
            .into_iter()
            .map(|(k, v)| (k.trim().to_string(), v))
            .collect();
        Self { cells }
    }
}

impl FromIterator<(String, CellValue)> for TableRow {
    fn from_iter<T: IntoIterator<Item = (String, CellValue)>>(iter: T) -> Self {
        Self {
            cells: iter.into_iter().collect(),
        }
    }
}
