//! Flat tabular results
//!
//! Rows are built from JSON objects. Columns keep the order in which they were
//! first seen, and a row that lacks a column holds `null` for it.

use serde::Serialize;
use serde_json::{Map, Value};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::ClientResult;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from records, one row per record
    pub fn from_records(records: Vec<Map<String, Value>>) -> Self {
        let mut table = Table::new();
        for record in records {
            table.push_record(record);
        }
        table
    }

    /// Append a record, widening the table when it introduces new columns
    pub fn push_record(&mut self, record: Map<String, Value>) {
        for key in record.keys() {
            if !self.columns.iter().any(|c| c == key) {
                self.columns.push(key.clone());
                for row in &mut self.rows {
                    row.push(Value::Null);
                }
            }
        }

        let row = self
            .columns
            .iter()
            .map(|c| record.get(c).cloned().unwrap_or(Value::Null))
            .collect();
        self.rows.push(row);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// All values of one column, top to bottom
    pub fn column(&self, name: &str) -> Option<Vec<&Value>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|r| &r[idx]).collect())
    }

    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column_index(column)?;
        self.rows.get(row).map(|r| &r[idx])
    }

    /// Apply `f` to every cell of `column`; rows stay in place
    pub fn map_column<F>(&mut self, column: &str, mut f: F) -> ClientResult<()>
    where
        F: FnMut(&Value) -> ClientResult<Value>,
    {
        if let Some(idx) = self.column_index(column) {
            for row in &mut self.rows {
                row[idx] = f(&row[idx])?;
            }
        }
        Ok(())
    }

    /// Write the table as CSV with a header row
    pub fn write_csv<W: Write>(&self, writer: W) -> ClientResult<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(&self.columns)?;
        for row in &self.rows {
            wtr.write_record(row.iter().map(cell_to_string))?;
        }
        wtr.flush()?;
        Ok(())
    }

    /// Save the table to a CSV file
    pub fn save_to_csv(&self, path: impl AsRef<Path>) -> ClientResult<PathBuf> {
        let path = path.as_ref().to_path_buf();
        let file = std::fs::File::create(&path)?;
        self.write_csv(file)?;
        info!("Saved {} rows to {}", self.len(), path.display());
        Ok(path)
    }
}

fn cell_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
